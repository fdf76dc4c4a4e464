use serde::Serialize;
use std::fmt::Write;

use crate::entities::EntityId;
use crate::error::{Error, Result};
use crate::models::SimConfig;
use crate::state::SimulationResult;
use crate::trace::{DrawKind, EntityKind, EntitySnapshot, TraceRow};

pub trait Formatter {
    fn write(&self, result: &SimulationResult) -> Result<String>;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, result: &SimulationResult) -> Result<String> {
        let mut out = String::new();
        write_metadata(&mut out, result);
        out.push_str("Trace:\n");
        for row in &result.trace {
            write_row(&mut out, row);
        }
        write_summary(&mut out, result);
        Ok(out)
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, result: &SimulationResult) -> Result<String> {
        let mut out = String::new();
        write_metadata(&mut out, result);
        write_summary(&mut out, result);
        Ok(out)
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, result: &SimulationResult) -> Result<String> {
        to_json(result)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|err| Error::Output(format!("failed to serialize JSON: {}", err)))?;
    json.push('\n');
    Ok(json)
}

pub fn format_config(config: &SimConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Patients: mean interarrival {}", config.mean_interarrival);
    let _ = writeln!(
        out,
        "Desk service: {}..{} (notice {})",
        config.desk_service_low, config.desk_service_high, config.notice_duration
    );
    let _ = writeln!(out, "Uncovered fraction: {}", config.uncovered_fraction);
    let _ = writeln!(out, "Payment: {}..{}", config.payment_low, config.payment_high);
    let _ = writeln!(
        out,
        "Calls: every {} (first at {}), duration {}..{}",
        config.call_interval,
        config.time_to_first_call,
        config.call_duration_low,
        config.call_duration_high
    );
    let _ = writeln!(
        out,
        "Backlog: desk {}, payment {}",
        config.initial_desk_backlog, config.initial_payment_backlog
    );
    let _ = writeln!(out, "Horizon: {}", config.horizon);
    let _ = writeln!(out, "Seed: {}", config.seed);
    let _ = writeln!(out, "Call policy: {}", config.call_policy);
    let _ = writeln!(out, "Coverage timing: {}", config.coverage_timing);
    out
}

fn write_metadata(out: &mut String, result: &SimulationResult) {
    let meta = &result.metadata;
    out.push_str("Metadata:\n");
    let _ = writeln!(out, "seed: {}", meta.seed);
    let _ = writeln!(out, "horizon: {}", meta.horizon);
    let _ = writeln!(out, "call_policy: {}", meta.call_policy);
    let _ = writeln!(out, "coverage_timing: {}", meta.coverage_timing);
    let _ = writeln!(out, "events: {}", meta.events_processed);
    let _ = writeln!(out, "final_clock: {:.3}", meta.final_clock);
}

fn write_summary(out: &mut String, result: &SimulationResult) {
    out.push_str("Summary:\n");
    let _ = writeln!(out, "lost_calls: {}", result.lost_calls);
    let _ = writeln!(out, "average_wait: {:.3}", result.average_wait);
    let _ = writeln!(
        out,
        "waits: {} (total {:.3})",
        result.statistics.wait_count, result.statistics.cumulative_wait
    );
}

fn write_row(out: &mut String, row: &TraceRow) {
    let _ = write!(out, "[{:>9.3}] {}", row.clock, row.event);
    for station in &row.stations {
        let state = if station.busy { "busy" } else { "free" };
        let _ = write!(out, " | {}: {}", station.station, state);
        if let Some(occupant) = station.occupant {
            let _ = write!(out, " {}", occupant);
        }
        if !station.queue.is_empty() {
            let _ = write!(out, " [{}]", join_ids(&station.queue));
        }
    }
    let _ = write!(
        out,
        " | lost={} waits={} total_wait={:.3}",
        row.stats.lost_calls, row.stats.wait_count, row.stats.cumulative_wait
    );
    for draw in &row.draws {
        let _ = write!(
            out,
            " | {} rnd={:.4} -> {:.3}",
            draw_label(draw.kind),
            draw.rnd,
            draw.value
        );
    }
    out.push('\n');

    let slots: Vec<String> = row
        .entities
        .iter()
        .map(|slot| slot_label(slot.column, &slot.entity))
        .collect();
    if !slots.is_empty() {
        let _ = writeln!(out, "            {}", slots.join("  "));
    }
}

fn slot_label(column: usize, entity: &EntitySnapshot) -> String {
    let prefix = match entity.kind {
        EntityKind::Patient => 'P',
        EntityKind::Call => 'C',
    };
    let status = entity.status.label();
    match entity.wait_start {
        Some(since) => format!(
            "#{} {}{} {} since {:.3}",
            column + 1,
            prefix,
            entity.id,
            status,
            since
        ),
        None => format!("#{} {}{} {}", column + 1, prefix, entity.id, status),
    }
}

fn draw_label(kind: DrawKind) -> &'static str {
    match kind {
        DrawKind::InterArrival => "inter-arrival",
        DrawKind::Coverage => "coverage",
        DrawKind::DeskService => "desk-service",
        DrawKind::Payment => "payment",
        DrawKind::CallDuration => "call-duration",
    }
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
