use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::models::{CallPolicy, CoverageTiming};

#[derive(Parser, Debug)]
#[command(
    name = "clinic-sim",
    about = "Discrete-event simulation of a clinic front desk, payment window and phone line",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation and print the trace (the default).
    Run(RunArgs),
    /// Print the resolved configuration without running.
    ShowConfig(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long, help = "TOML or JSON config file; flags override its values")]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
    #[arg(long, help = "Mean time between patient arrivals")]
    pub mean_interarrival: Option<f64>,
    #[arg(long)]
    pub desk_service_low: Option<f64>,
    #[arg(long)]
    pub desk_service_high: Option<f64>,
    #[arg(long, help = "Probability that a patient has no coverage")]
    pub uncovered_fraction: Option<f64>,
    #[arg(long)]
    pub notice_duration: Option<f64>,
    #[arg(long)]
    pub payment_low: Option<f64>,
    #[arg(long)]
    pub payment_high: Option<f64>,
    #[arg(long, help = "Fixed time between phone calls")]
    pub call_interval: Option<f64>,
    #[arg(long)]
    pub call_duration_low: Option<f64>,
    #[arg(long)]
    pub call_duration_high: Option<f64>,
    #[arg(long)]
    pub initial_desk_backlog: Option<usize>,
    #[arg(long)]
    pub initial_payment_backlog: Option<usize>,
    #[arg(long)]
    pub time_to_first_call: Option<f64>,
    #[arg(long, help = "Simulated time at which the run stops")]
    pub horizon: Option<f64>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum)]
    pub call_policy: Option<CallPolicyArg>,
    #[arg(long, value_enum)]
    pub coverage_timing: Option<CoverageTimingArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    #[default]
    Human,
    Summary,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CallPolicyArg {
    HoldOnLine,
    RejectWhenDeskBusy,
}

impl From<CallPolicyArg> for CallPolicy {
    fn from(value: CallPolicyArg) -> Self {
        match value {
            CallPolicyArg::HoldOnLine => CallPolicy::HoldOnLine,
            CallPolicyArg::RejectWhenDeskBusy => CallPolicy::RejectWhenDeskBusy,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CoverageTimingArg {
    Arrival,
    ServiceStart,
}

impl From<CoverageTimingArg> for CoverageTiming {
    fn from(value: CoverageTimingArg) -> Self {
        match value {
            CoverageTimingArg::Arrival => CoverageTiming::Arrival,
            CoverageTimingArg::ServiceStart => CoverageTiming::ServiceStart,
        }
    }
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|e| Error::Cli(e.to_string()))
}
