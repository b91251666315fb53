use crate::invocation::{DEFAULT_PACKET_LEN, MtrOptions};
use crate::target::Target;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "mtrext",
    version = "0.1.0",
    about = "Run mtr in report mode and print a per-hop loss, latency and jitter table",
    next_line_help = true,
    after_help = "EXAMPLES:
    mtrext 1.1.1.1
    mtrext 2606:4700:4700::1111 --psize 1400
    mtrext 8.8.8.8 --resolve-dns --json
    mtrext 10.0.0.1 --legacy -o report.txt"
)]
pub struct Cli {
    #[arg(
        help = "Target IPv4 or IPv6 address",
        help_heading = "TARGET SPECIFICATION"
    )]
    pub target: String,

    #[arg(
        long,
        default_value_t = DEFAULT_PACKET_LEN,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Probe packet size in bytes",
        help_heading = "PROBE OPTIONS"
    )]
    pub psize: u32,

    #[arg(
        long,
        help = "Let mtr pick its own packet size",
        conflicts_with = "psize",
        help_heading = "PROBE OPTIONS"
    )]
    pub no_psize: bool,

    #[arg(
        long,
        help = "Reverse-resolve hop addresses",
        help_heading = "PROBE OPTIONS"
    )]
    pub resolve_dns: bool,

    #[arg(
        long,
        help = "Plain report without AS numbers or HOST/Start metadata",
        help_heading = "REPORT OPTIONS"
    )]
    pub legacy: bool,

    #[arg(
        long,
        help = "Allow mtr to truncate long hostnames",
        help_heading = "REPORT OPTIONS"
    )]
    pub no_wide: bool,

    #[arg(
        long,
        default_value = "mtr",
        help = "mtr executable, looked up through PATH",
        help_heading = "MISC OPTIONS"
    )]
    pub program: String,

    #[arg(
        short,
        long,
        help = "Print the report as JSON",
        help_heading = "OUTPUT OPTIONS"
    )]
    pub json: bool,

    #[arg(
        long,
        help = "Print mtr's report text unchanged",
        conflicts_with = "json",
        help_heading = "OUTPUT OPTIONS"
    )]
    pub raw: bool,

    #[arg(
        short,
        long,
        help = "Output file path (.json or .txt)",
        help_heading = "OUTPUT OPTIONS"
    )]
    pub output: Option<String>,

    #[arg(
        short = 'v',
        long,
        help = "Verbose logging",
        help_heading = "OUTPUT OPTIONS"
    )]
    pub verbose: bool,
}

impl Cli {
    pub fn to_target(&self) -> Result<Target, anyhow::Error> {
        Target::parse(&self.target).map_err(|e| anyhow::anyhow!("{}", e))
    }

    pub fn to_options(&self) -> MtrOptions {
        MtrOptions {
            packet_len: if self.no_psize {
                None
            } else {
                Some(self.psize)
            },
            resolve_dns: self.resolve_dns,
            extended_report: !self.legacy,
            wide: !self.no_wide,
            program: self.program.clone(),
        }
    }
}
