use crate::error::MtrError;
use crate::invocation::{MtrOptions, build_args};
use crate::report::{self, HopRecord, ParsedResult};
use crate::target::Target;
use chrono::{DateTime, FixedOffset};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Outcome tag of a finished mtr process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Captured text of a run: stdout on success, stderr on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutput {
    pub raw: String,
}

/// Everything known about one finished process, before any parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEnvelope {
    /// Arguments the process was started with
    pub args: Vec<String>,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub status: RunStatus,
    /// Wall time from spawn request to exit
    pub timetaken: Duration,
    pub results: RawOutput,
}

/// Parsed result of a successful mtr run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtrReport {
    pub args: Vec<String>,
    pub code: i32,
    pub status: RunStatus,
    pub timetaken: Duration,
    pub results: ParsedResult,
    /// Label from the report's `HOST:` line
    pub host: Option<String>,
    /// Value of the report's `Start:` line
    pub datetime: Option<String>,
}

impl MtrReport {
    /// Builds a report from a successful envelope. Metadata lines are only
    /// read for extended reports.
    pub fn from_envelope(envelope: RawEnvelope, extended_report: bool) -> Self {
        let raw = envelope.results.raw;
        let (host, datetime) = if extended_report {
            (report::extract_host(&raw), report::extract_datetime(&raw))
        } else {
            (None, None)
        };

        MtrReport {
            args: envelope.args,
            code: envelope.code.unwrap_or_default(),
            status: envelope.status,
            timetaken: envelope.timetaken,
            results: report::parse(&raw),
            host,
            datetime,
        }
    }

    pub fn hops(&self) -> &[HopRecord] {
        &self.results.hops
    }

    /// Last row of the report, normally the destination.
    pub fn final_hop(&self) -> Option<&HopRecord> {
        self.results.hops.last()
    }

    /// `datetime` as a timestamp, when mtr printed it in ISO-8601 form.
    pub fn started_at(&self) -> Option<DateTime<FixedOffset>> {
        let text = self.datetime.as_deref()?;
        DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z")
            .or_else(|_| DateTime::parse_from_rfc3339(text))
            .ok()
    }
}

/// Runs `program` with `args` and buffers both output streams.
///
/// Stdout, stderr and the exit wait are driven concurrently on the calling
/// task so neither pipe can fill up and stall the child. Chunks are appended
/// in arrival order and decoded once the stream closes.
///
/// A non-zero exit is not an error here; it yields an envelope with
/// [`RunStatus::Failed`] and stderr as the raw text. Only a failed spawn or a
/// broken pipe is reported as `Err`.
pub async fn run_process(program: &str, args: &[String]) -> Result<RawEnvelope, MtrError> {
    let started = Instant::now();
    debug!("Spawning {} {:?}", program, args);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| MtrError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
    let stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

    let (stdout, stderr, exit_status) = tokio::try_join!(
        collect_stream(stdout_pipe, "stdout"),
        collect_stream(stderr_pipe, "stderr"),
        child.wait()
    )?;

    let timetaken = started.elapsed();
    let code = exit_status.code();

    let (status, raw) = if exit_status.success() {
        if !stderr.trim().is_empty() {
            debug!("{} wrote to stderr: {}", program, stderr.trim());
        }
        (RunStatus::Success, stdout)
    } else {
        (RunStatus::Failed, stderr)
    };

    Ok(RawEnvelope {
        args: args.to_vec(),
        code,
        status,
        timetaken,
        results: RawOutput { raw },
    })
}

async fn collect_stream<R>(mut reader: R, name: &str) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let count = reader.read(&mut chunk).await?;
        if count == 0 {
            break;
        }
        trace!("Read {} bytes from {}", count, name);
        buffer.extend_from_slice(&chunk[..count]);
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Runs mtr against a single target
///
/// Each call to [`Mtr::run`] spawns its own process and keeps its own timer,
/// so one `Mtr` can be run repeatedly or concurrently.
///
/// # Example
///
/// ```no_run
/// use mtrext::{Mtr, MtrOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), mtrext::MtrError> {
///     let mtr = Mtr::from_addr("1.1.1.1", MtrOptions::default())?;
///     let report = mtr.run().await?;
///     for hop in report.hops() {
///         println!("{} {} {}%", hop.hop, hop.host, hop.loss);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Mtr {
    target: Target,
    options: MtrOptions,
}

impl Mtr {
    pub fn new(target: Target, options: MtrOptions) -> Self {
        Self { target, options }
    }

    /// Validates `addr` before anything is spawned.
    pub fn from_addr(addr: &str, options: MtrOptions) -> Result<Self, MtrError> {
        Ok(Self::new(Target::parse(addr)?, options))
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn options(&self) -> &MtrOptions {
        &self.options
    }

    /// Arguments the next run will pass to mtr.
    pub fn args(&self) -> Vec<String> {
        build_args(&self.target, &self.options)
    }

    /// Runs mtr to completion and parses its report.
    ///
    /// There is no timeout: a hung mtr hangs this future. Wrap it in
    /// `tokio::time::timeout` to bound it; dropping the future kills the child.
    pub async fn run(&self) -> Result<MtrReport, MtrError> {
        let args = self.args();
        info!("Running {} against {}", self.options.program, self.target);

        let envelope = run_process(&self.options.program, &args).await?;

        match envelope.status {
            RunStatus::Success => {
                let report = MtrReport::from_envelope(envelope, self.options.extended_report);
                info!(
                    "{} finished in {:?} with {} hops",
                    self.options.program,
                    report.timetaken,
                    report.results.hops.len()
                );
                Ok(report)
            }
            RunStatus::Failed => {
                warn!(
                    "{} against {} failed with code {:?} after {:?}",
                    self.options.program, self.target, envelope.code, envelope.timetaken
                );
                Err(MtrError::Failed(Box::new(envelope)))
            }
        }
    }

    /// Schedules a run on the tokio runtime and returns at once.
    ///
    /// The process is started by the spawned task, not inline, so nothing is
    /// available until the returned future resolves. Must be called from
    /// within a runtime.
    pub fn traceroute(
        &self,
    ) -> impl Future<Output = Result<MtrReport, MtrError>> + Send + use<> {
        let mtr = self.clone();
        let handle = tokio::spawn(async move { mtr.run().await });

        async move {
            handle
                .await
                .map_err(|e| MtrError::Join(e.to_string()))
                .and_then(|result| result)
        }
    }
}
