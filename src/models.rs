use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything one run needs besides the random stream. Missing fields in a
/// config file fall back to the defaults below.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub mean_interarrival: f64,
    pub desk_service_low: f64,
    pub desk_service_high: f64,
    pub uncovered_fraction: f64,
    pub notice_duration: f64,
    pub payment_low: f64,
    pub payment_high: f64,
    pub call_interval: f64,
    pub call_duration_low: f64,
    pub call_duration_high: f64,
    pub initial_desk_backlog: usize,
    pub initial_payment_backlog: usize,
    pub time_to_first_call: f64,
    pub horizon: f64,
    pub seed: u64,
    pub call_policy: CallPolicy,
    pub coverage_timing: CoverageTiming,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mean_interarrival: 3.0,
            desk_service_low: 1.0,
            desk_service_high: 3.0,
            uncovered_fraction: 0.45,
            notice_duration: 0.1667,
            payment_low: 0.8,
            payment_high: 2.4,
            call_interval: 3.0,
            call_duration_low: 0.5,
            call_duration_high: 1.5,
            initial_desk_backlog: 4,
            initial_payment_backlog: 2,
            time_to_first_call: 2.0,
            horizon: 480.0,
            seed: 0,
            call_policy: CallPolicy::default(),
            coverage_timing: CoverageTiming::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CallPolicy {
    #[default]
    HoldOnLine,
    RejectWhenDeskBusy,
}

impl fmt::Display for CallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallPolicy::HoldOnLine => "hold-on-line",
            CallPolicy::RejectWhenDeskBusy => "reject-when-desk-busy",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageTiming {
    #[default]
    Arrival,
    ServiceStart,
}

impl fmt::Display for CoverageTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CoverageTiming::Arrival => "arrival",
            CoverageTiming::ServiceStart => "service-start",
        };
        write!(f, "{}", label)
    }
}
