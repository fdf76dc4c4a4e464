use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{field} must be > 0 (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be within [0, 1] (got {value})")]
    FractionOutOfRange { field: &'static str, value: f64 },
    #[error("{field} low bound must not exceed high bound (got {low} > {high})")]
    InvertedRange {
        field: &'static str,
        low: f64,
        high: f64,
    },
    #[error("time_to_first_call must not exceed call_interval (got {first} > {interval})")]
    FirstCallAfterInterval { first: f64, interval: f64 },
    #[error("invalid {distribution} distribution: {reason}")]
    InvalidDistribution {
        distribution: &'static str,
        reason: String,
    },
    #[error("simulation invariant violated: {0}")]
    InvariantViolation(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Output(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
