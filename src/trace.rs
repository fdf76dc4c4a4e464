//! State-vector trace.
//!
//! One [`TraceRow`] is captured after initialization and after every handled
//! event. Entities are laid out on a [`SlotGrid`] so a given identity keeps
//! the same column for as long as it stays in the system.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{CallStatus, Entity, EntityId, PatientStatus};
use crate::events::PendingEvents;
use crate::random::Variate;
use crate::state::EngineState;
use crate::stations::StationKind;
use crate::stats::Statistics;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawKind {
    InterArrival,
    Coverage,
    DeskService,
    Payment,
    CallDuration,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Draw {
    pub kind: DrawKind,
    pub rnd: f64,
    pub value: f64,
}

impl Draw {
    pub fn new(kind: DrawKind, variate: Variate) -> Self {
        Self {
            kind,
            rnd: variate.rnd,
            value: variate.value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub station: StationKind,
    pub busy: bool,
    pub occupant: Option<EntityId>,
    pub queue: Vec<EntityId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Patient,
    Call,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityStatus {
    Patient(PatientStatus),
    Call(CallStatus),
}

impl EntityStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntityStatus::Patient(status) => status.label(),
            EntityStatus::Call(status) => status.label(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub status: EntityStatus,
    pub arrived_at: f64,
    pub wait_start: Option<f64>,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Patient(patient) => EntitySnapshot {
                id: patient.id,
                kind: EntityKind::Patient,
                status: EntityStatus::Patient(patient.status),
                arrived_at: patient.arrived_at,
                wait_start: match patient.status {
                    PatientStatus::WaitingAtDesk if !patient.returning => patient.wait_start,
                    _ => None,
                },
            },
            Entity::Call(call) => EntitySnapshot {
                id: call.id,
                kind: EntityKind::Call,
                status: EntityStatus::Call(call.status),
                arrived_at: call.arrived_at,
                wait_start: None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlottedEntity {
    pub column: usize,
    pub entity: EntitySnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceRow {
    pub event: &'static str,
    pub clock: f64,
    pub draws: Vec<Draw>,
    pub pending: PendingEvents,
    pub stations: Vec<StationSnapshot>,
    pub stats: Statistics,
    pub columns: usize,
    pub entities: Vec<SlottedEntity>,
}

/// Column assignment for entities. Columns are handed out in first-seen
/// order and never given to a second identity.
#[derive(Clone, Debug, Default)]
pub struct SlotGrid {
    columns: BTreeMap<EntityId, usize>,
    width: usize,
}

impl SlotGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn place(&mut self, present: Vec<EntitySnapshot>) -> Vec<SlottedEntity> {
        let ids: BTreeSet<EntityId> = present.iter().map(|snapshot| snapshot.id).collect();
        self.columns.retain(|id, _| ids.contains(id));

        let mut row: Vec<SlottedEntity> = present
            .into_iter()
            .map(|entity| {
                let column = match self.columns.get(&entity.id) {
                    Some(column) => *column,
                    None => {
                        let column = self.width;
                        self.width += 1;
                        self.columns.insert(entity.id, column);
                        column
                    }
                };
                SlottedEntity { column, entity }
            })
            .collect();
        row.sort_by_key(|slot| slot.column);
        row
    }
}

#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    rows: Vec<TraceRow>,
    grid: SlotGrid,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &'static str, state: &EngineState, draws: Vec<Draw>) {
        let present = state.entities.iter().map(EntitySnapshot::from).collect();
        let entities = self.grid.place(present);
        self.rows.push(TraceRow {
            event,
            clock: state.clock,
            draws,
            pending: state.pending.clone(),
            stations: station_snapshots(state),
            stats: state.stats.clone(),
            columns: self.grid.width(),
            entities,
        });
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<TraceRow> {
        self.rows
    }
}

fn station_snapshots(state: &EngineState) -> Vec<StationSnapshot> {
    vec![
        StationSnapshot {
            station: StationKind::Desk,
            busy: state.desk.is_busy(),
            occupant: state.desk.occupant.map(|job| job.entity()),
            queue: state.desk.queued(),
        },
        StationSnapshot {
            station: StationKind::Payment,
            busy: state.payment.is_busy(),
            occupant: state.payment.occupant,
            queue: state.payment.queue.iter().copied().collect(),
        },
        // An answered call is reported once, as the desk occupant.
        StationSnapshot {
            station: StationKind::PhoneLine,
            busy: state.line.is_busy(),
            occupant: None,
            queue: state.line.held_call().into_iter().collect(),
        },
    ]
}
