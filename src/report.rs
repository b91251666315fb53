//! Parser for mtr's `--report` text output.
//!
//! A report is a few lines of chrome (`Start:` timestamp, `HOST:` header with
//! column titles) followed by one row per hop. Two row layouts are understood:
//!
//! ```text
//! Legacy:    "  1.|-- 10.0.0.1      0.0%  5  0  5  1.2  1.0  1.1  1.5  0.1  0.1  0.2  0.3"
//! Extended:  "  2. AS15169  dns.google (8.8.8.8)  0.0%  5  0  5  1.2  ...  0.3"
//! ```
//!
//! Both end in the same twelve whitespace-separated columns, in the order
//! requested with `-o LSDR NBAW JMXI`: loss (the `%` suffix is optional),
//! sent, dropped, received, last, best, average, worst, jitter, jitter mean,
//! jitter max, interarrival jitter. Columns are `[A-Za-z0-9.]+` so
//! placeholders like `nan` are kept verbatim. The hop index is digits
//! followed by a dot. Legacy rows follow the dot with `|--` and a single host
//! token; extended rows carry an `AS<digits or ?>` token and a host field
//! that may contain spaces and parentheses (`name (ip)` when `-b` is used).
//!
//! Lines matching neither layout are skipped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

const STATS_COLUMNS: &str = r"(?P<loss>[a-z\d.]+)%?\s+(?P<snt>[a-z\d.]+)\s+(?P<drop>[a-z\d.]+)\s+(?P<rcv>[a-z\d.]+)\s+(?P<last>[a-z\d.]+)\s+(?P<best>[a-z\d.]+)\s+(?P<avg>[a-z\d.]+)\s+(?P<wrst>[a-z\d.]+)\s+(?P<jttr>[a-z\d.]+)\s+(?P<javg>[a-z\d.]+)\s+(?P<jmax>[a-z\d.]+)\s+(?P<jint>[a-z\d.]+)\s*$";

static LEGACY_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?P<hop>\d+)\.\|--\s+(?P<host>\S+)\s+{STATS_COLUMNS}"
    ))
    .expect("legacy row pattern is valid")
});

static EXTENDED_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?P<hop>\d+)\.(?:\|--)?\s+(?P<asn>AS[\d?]+)\s+(?P<host>[a-z\d.:_\-?()\s]+?)\s+{STATS_COLUMNS}"
    ))
    .expect("extended row pattern is valid")
});

static HOST_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^HOST:\s+(?P<value>\S+)").expect("host pattern is valid"));

static START_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Start:\s+(?P<value>\S+)\s*$").expect("start pattern is valid"));

/// Row layout of an mtr report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `N.|-- host` rows, no AS column
    Legacy,
    /// `N. ASnnn host` rows, produced with `-z`
    Extended,
}

impl ReportFormat {
    /// Formats in the order they are tried against a line.
    pub const ALL: [ReportFormat; 2] = [ReportFormat::Extended, ReportFormat::Legacy];

    fn pattern(self) -> &'static Regex {
        match self {
            ReportFormat::Legacy => &LEGACY_ROW,
            ReportFormat::Extended => &EXTENDED_ROW,
        }
    }

    /// Matches a single report line against this layout.
    pub fn parse_line(self, line: &str) -> Option<HopRecord> {
        self.pattern()
            .captures(line.trim_end_matches('\r'))
            .map(|caps| HopRecord::from_captures(&caps))
    }
}

/// One row of the report
///
/// Every column is kept as the text mtr printed. The typed accessors parse
/// on demand and return `None` for placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopRecord {
    /// Hop index, without the trailing dot
    pub hop: String,
    /// AS number token (`AS15169`, `AS???`), extended reports only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub asn: Option<String>,
    /// Address, hostname, `name (ip)` pair or `???`
    pub host: String,
    /// Loss ratio in percent
    pub loss: String,
    /// Sent packets
    pub snt: String,
    /// Dropped packets
    pub drop: String,
    /// Received packets
    pub rcv: String,
    /// Newest RTT (ms)
    pub last: String,
    /// Best RTT (ms)
    pub best: String,
    /// Average RTT (ms)
    pub avg: String,
    /// Worst RTT (ms)
    pub wrst: String,
    /// Current jitter
    pub jttr: String,
    /// Jitter mean
    pub javg: String,
    /// Worst jitter
    pub jmax: String,
    /// Interarrival jitter
    pub jint: String,
}

impl HopRecord {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let field = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };

        HopRecord {
            hop: field("hop"),
            asn: caps.name("asn").map(|m| m.as_str().to_string()),
            host: field("host"),
            loss: field("loss"),
            snt: field("snt"),
            drop: field("drop"),
            rcv: field("rcv"),
            last: field("last"),
            best: field("best"),
            avg: field("avg"),
            wrst: field("wrst"),
            jttr: field("jttr"),
            javg: field("javg"),
            jmax: field("jmax"),
            jint: field("jint"),
        }
    }

    /// Layout this row was read from.
    pub fn format(&self) -> ReportFormat {
        if self.asn.is_some() {
            ReportFormat::Extended
        } else {
            ReportFormat::Legacy
        }
    }

    pub fn hop_index(&self) -> Option<u32> {
        self.hop.parse().ok()
    }

    /// AS number without the `AS` prefix; `None` for `AS???`.
    pub fn as_number(&self) -> Option<u32> {
        self.asn
            .as_deref()
            .and_then(|asn| asn.get(2..))
            .and_then(|digits| digits.parse().ok())
    }

    /// True when no probe to this hop got an answer address (`???`).
    pub fn is_unresolved(&self) -> bool {
        self.host.starts_with("???")
    }

    pub fn loss_pct(&self) -> Option<f64> {
        number(&self.loss)
    }

    pub fn sent(&self) -> Option<u32> {
        self.snt.parse().ok()
    }

    pub fn dropped(&self) -> Option<u32> {
        self.drop.parse().ok()
    }

    pub fn received(&self) -> Option<u32> {
        self.rcv.parse().ok()
    }

    pub fn last_ms(&self) -> Option<f64> {
        number(&self.last)
    }

    pub fn best_ms(&self) -> Option<f64> {
        number(&self.best)
    }

    pub fn avg_ms(&self) -> Option<f64> {
        number(&self.avg)
    }

    pub fn worst_ms(&self) -> Option<f64> {
        number(&self.wrst)
    }

    pub fn jitter_ms(&self) -> Option<f64> {
        number(&self.jttr)
    }

    pub fn jitter_avg_ms(&self) -> Option<f64> {
        number(&self.javg)
    }

    pub fn jitter_max_ms(&self) -> Option<f64> {
        number(&self.jmax)
    }

    pub fn jitter_interarrival_ms(&self) -> Option<f64> {
        number(&self.jint)
    }
}

fn number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Raw report text and the hops read from it, in report order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub raw: String,
    pub hops: Vec<HopRecord>,
}

/// Parses a report, accepting rows in either layout.
///
/// Hops are returned in the order their lines appear; they are never sorted
/// by index. Banner, header and blank lines are dropped.
pub fn parse(raw: &str) -> ParsedResult {
    collect_hops(raw, &ReportFormat::ALL)
}

/// Parses a report, accepting only rows of the given layout.
pub fn parse_with(format: ReportFormat, raw: &str) -> ParsedResult {
    collect_hops(raw, &[format])
}

fn collect_hops(raw: &str, formats: &[ReportFormat]) -> ParsedResult {
    let hops = raw
        .split('\n')
        .filter_map(|line| formats.iter().find_map(|format| format.parse_line(line)))
        .collect();

    ParsedResult {
        raw: raw.to_string(),
        hops,
    }
}

/// Scans every line and returns the `value` capture (or first group) of the
/// last line that matches. Later occurrences replace earlier ones.
pub fn extract_value(pattern: &Regex, raw: &str) -> Option<String> {
    raw.split('\n')
        .filter_map(|line| {
            let caps = pattern.captures(line.trim_end_matches('\r'))?;
            caps.name("value")
                .or_else(|| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .last()
}

/// Host label from the `HOST:` header line.
pub fn extract_host(raw: &str) -> Option<String> {
    extract_value(&HOST_LINE, raw)
}

/// Value of the `Start:` line, as printed by mtr.
pub fn extract_datetime(raw: &str) -> Option<String> {
    extract_value(&START_LINE, raw)
}
