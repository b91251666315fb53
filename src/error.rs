use crate::supervisor::RawEnvelope;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MtrError {
    #[error("Target is not a valid IPv4 or IPv6 address: {0}")]
    InvalidTarget(String),
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("mtr exited with {}: {}", exit_label(.0.code), .0.results.raw.trim())]
    Failed(Box<RawEnvelope>),
    #[error("I/O error while supervising mtr: {0}")]
    Io(#[from] std::io::Error),
    #[error("mtr task did not complete: {0}")]
    Join(String),
}

impl MtrError {
    /// Envelope of a run that exited unsuccessfully, if this error came from one.
    pub fn envelope(&self) -> Option<&RawEnvelope> {
        match self {
            MtrError::Failed(envelope) => Some(envelope),
            _ => None,
        }
    }
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
