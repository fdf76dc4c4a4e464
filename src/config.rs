use std::fs;
use std::path::Path;

use crate::cli::{FormatArg, RunArgs};
use crate::error::{Error, Result};
use crate::models::SimConfig;

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

pub fn build_config(args: RunArgs) -> Result<(SimConfig, FormatArg)> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    macro_rules! override_fields {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = args.$field {
                    config.$field = value;
                }
            )*
        };
    }
    override_fields!(
        mean_interarrival,
        desk_service_low,
        desk_service_high,
        uncovered_fraction,
        notice_duration,
        payment_low,
        payment_high,
        call_interval,
        call_duration_low,
        call_duration_high,
        initial_desk_backlog,
        initial_payment_backlog,
        time_to_first_call,
        horizon,
        seed,
    );
    if let Some(policy) = args.call_policy {
        config.call_policy = policy.into();
    }
    if let Some(timing) = args.coverage_timing {
        config.coverage_timing = timing.into();
    }

    validate_config(&config)?;
    Ok((config, args.format))
}

pub fn validate_config(config: &SimConfig) -> Result<()> {
    positive("mean_interarrival", config.mean_interarrival)?;
    bounds(
        "desk_service",
        "desk_service_low",
        config.desk_service_low,
        config.desk_service_high,
    )?;
    if !(0.0..=1.0).contains(&config.uncovered_fraction) {
        return Err(Error::FractionOutOfRange {
            field: "uncovered_fraction",
            value: config.uncovered_fraction,
        });
    }
    positive("notice_duration", config.notice_duration)?;
    bounds("payment", "payment_low", config.payment_low, config.payment_high)?;
    positive("call_interval", config.call_interval)?;
    bounds(
        "call_duration",
        "call_duration_low",
        config.call_duration_low,
        config.call_duration_high,
    )?;
    non_negative("time_to_first_call", config.time_to_first_call)?;
    if config.time_to_first_call > config.call_interval {
        return Err(Error::FirstCallAfterInterval {
            first: config.time_to_first_call,
            interval: config.call_interval,
        });
    }
    non_negative("horizon", config.horizon)?;
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Negative { field, value })
    }
}

fn bounds(field: &'static str, low_field: &'static str, low: f64, high: f64) -> Result<()> {
    positive(low_field, low)?;
    if !high.is_finite() || low > high {
        return Err(Error::InvertedRange { field, low, high });
    }
    Ok(())
}
