use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PingParseError {
    /// A statistics header was found but no packet counts follow it.
    #[error("empty ping statistics for {destination}")]
    EmptyPingStatistics { destination: String },
}

pub type PingParseResult<T> = Result<T, PingParseError>;
