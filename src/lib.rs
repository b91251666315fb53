//! # mtrext: run `mtr` as a child process and read its report as data.
//!
//! The crate does no probing of its own. It builds the mtr command line,
//! supervises the process on tokio, buffers stdout and stderr, and parses
//! the report-mode text into per-hop loss, latency and jitter records.
//!
//! ## Pipeline
//!
//! - **Target**: a validated IPv4/IPv6 address
//! - **Invocation**: options to argument vector
//! - **Supervisor**: spawn, buffer, time, classify the exit
//! - **Report**: tolerant line parser for legacy and AS-number layouts
//!
//! ## Example
//!
//! ```rust,no_run
//! use mtrext::{Mtr, MtrError, MtrOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = MtrOptions {
//!         packet_len: Some(1400),
//!         ..MtrOptions::default()
//!     };
//!     let mtr = Mtr::from_addr("8.8.8.8", options)?;
//!
//!     match mtr.traceroute().await {
//!         Ok(report) => {
//!             println!("{:?} via {} hops", report.host, report.hops().len());
//!             for hop in report.hops() {
//!                 println!("{:>3} {:<40} {}% {} ms", hop.hop, hop.host, hop.loss, hop.avg);
//!             }
//!         }
//!         Err(MtrError::Failed(envelope)) => {
//!             eprintln!("mtr failed ({:?}): {}", envelope.code, envelope.results.raw);
//!         }
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod invocation;
pub mod output;
pub mod report;
pub mod supervisor;
pub mod target;

/// Command line interface for mtrext
pub use cli::Cli;
pub use error::MtrError;
/// Argument construction
pub use invocation::{MtrOptions, build_args};
/// Report parsing
pub use report::{HopRecord, ParsedResult, ReportFormat};
/// Process supervision
pub use supervisor::{Mtr, MtrReport, RawEnvelope, RawOutput, RunStatus, run_process};
pub use target::{AddressFamily, Target};
