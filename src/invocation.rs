use crate::target::Target;
use serde::{Deserialize, Serialize};

/// Column selection passed to `-o`: loss, sent, dropped, received, last,
/// best, average, worst, jitter, jitter mean, jitter max, interarrival jitter.
pub const FIELD_ORDER: &str = "LSDR NBAW JMXI";

/// Packet size used when the caller does not pick one.
pub const DEFAULT_PACKET_LEN: u32 = 60;

/// Options controlling how mtr is invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MtrOptions {
    /// Probe packet size in bytes, IP and ICMP headers included. Zero means the default.
    pub packet_len: Option<u32>,
    /// Whether mtr should reverse-resolve hop addresses
    pub resolve_dns: bool,
    /// Whether to request AS numbers and hostname/IP pairs
    pub extended_report: bool,
    /// Whether to keep mtr from truncating hostnames
    pub wide: bool,
    /// Executable to run, looked up through PATH
    pub program: String,
}

impl Default for MtrOptions {
    fn default() -> Self {
        Self {
            packet_len: Some(DEFAULT_PACKET_LEN),
            // Numeric output unless asked otherwise
            resolve_dns: false,
            extended_report: true,
            wide: true,
            program: "mtr".to_string(),
        }
    }
}

/// Builds the argument vector for one mtr run.
///
/// The target is always the last token. Packet size goes out as two tokens
/// (`--psize`, value) so no shell splitting is ever involved.
pub fn build_args(target: &Target, options: &MtrOptions) -> Vec<String> {
    let mut args = vec![target.family().flag().to_string()];

    if !options.resolve_dns {
        args.push("--no-dns".to_string());
    }

    args.push("-o".to_string());
    args.push(FIELD_ORDER.to_string());

    // Report mode: run once and print, no curses display
    args.push("-r".to_string());

    if options.extended_report {
        args.push("-z".to_string());
        args.push("-b".to_string());
    }

    if options.wide {
        args.push("-w".to_string());
    }

    if let Some(len) = options.packet_len {
        let len = if len == 0 { DEFAULT_PACKET_LEN } else { len };
        args.push("--psize".to_string());
        args.push(len.to_string());
    }

    args.push(target.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(addr: &str, options: &MtrOptions) -> Vec<String> {
        build_args(&Target::parse(addr).unwrap(), options)
    }

    #[test]
    fn default_ipv4_invocation() {
        let args = args_for("10.0.0.1", &MtrOptions::default());
        assert_eq!(
            args,
            vec![
                "-4", "--no-dns", "-o", FIELD_ORDER, "-r", "-z", "-b", "-w", "--psize", "60",
                "10.0.0.1"
            ]
        );
    }

    #[test]
    fn address_family_flag_is_exclusive() {
        let v4 = args_for("8.8.8.8", &MtrOptions::default());
        assert!(v4.contains(&"-4".to_string()));
        assert!(!v4.contains(&"-6".to_string()));

        let v6 = args_for("2001:4860:4860::8888", &MtrOptions::default());
        assert!(v6.contains(&"-6".to_string()));
        assert!(!v6.contains(&"-4".to_string()));
        assert_eq!(v6.last().unwrap(), "2001:4860:4860::8888");
    }

    #[test]
    fn dns_flag_follows_resolve_option() {
        let options = MtrOptions {
            resolve_dns: true,
            ..MtrOptions::default()
        };
        assert!(!args_for("1.1.1.1", &options).contains(&"--no-dns".to_string()));
        assert!(args_for("1.1.1.1", &MtrOptions::default()).contains(&"--no-dns".to_string()));
    }

    #[test]
    fn legacy_mode_drops_as_and_wide_flags() {
        let options = MtrOptions {
            extended_report: false,
            wide: false,
            packet_len: None,
            ..MtrOptions::default()
        };
        assert_eq!(
            args_for("1.1.1.1", &options),
            vec!["-4", "--no-dns", "-o", FIELD_ORDER, "-r", "1.1.1.1"]
        );
    }

    #[test]
    fn packet_size_is_two_tokens() {
        let options = MtrOptions {
            packet_len: Some(1400),
            ..MtrOptions::default()
        };
        let args = args_for("1.1.1.1", &options);
        let pos = args.iter().position(|a| a == "--psize").unwrap();
        assert_eq!(args[pos + 1], "1400");
        assert_eq!(args.len(), pos + 3);
    }

    #[test]
    fn zero_packet_size_falls_back_to_default() {
        let options = MtrOptions {
            packet_len: Some(0),
            ..MtrOptions::default()
        };
        let args = args_for("10.0.0.1", &options);
        let pos = args.iter().position(|a| a == "--psize").unwrap();
        assert_eq!(args[pos + 1], DEFAULT_PACKET_LEN.to_string());
        assert!(!args.contains(&"0".to_string()));
    }
}
