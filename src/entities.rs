use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Coverage {
    Unknown,
    Covered,
    Uncovered,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientStatus {
    WaitingAtDesk,
    AtDesk,
    WaitingAtPayment,
    Paying,
    Finished,
}

impl PatientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PatientStatus::WaitingAtDesk => "waiting-at-desk",
            PatientStatus::AtDesk => "at-desk",
            PatientStatus::WaitingAtPayment => "waiting-at-payment",
            PatientStatus::Paying => "paying",
            PatientStatus::Finished => "finished",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    WaitingForLine,
    BeingHandled,
    Finished,
}

impl CallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::WaitingForLine => "waiting-for-line",
            CallStatus::BeingHandled => "being-handled",
            CallStatus::Finished => "finished",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Patient {
    pub id: EntityId,
    pub coverage: Coverage,
    pub arrived_at: f64,
    pub wait_start: Option<f64>,
    pub returning: bool,
    pub status: PatientStatus,
}

impl Patient {
    pub fn needs_notice(&self) -> bool {
        !self.returning && self.coverage == Coverage::Uncovered
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub id: EntityId,
    pub arrived_at: f64,
    pub status: CallStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Patient(Patient),
    Call(Call),
}

/// Owns every entity currently inside the facility, keyed by identity.
///
/// Identities come from one counter shared by patients and calls and are
/// never reused, including those of calls lost on arrival.
#[derive(Clone, Debug, Default)]
pub struct EntityArena {
    next_id: u64,
    records: BTreeMap<EntityId, Entity>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn admit_patient(&mut self, coverage: Coverage, now: f64) -> EntityId {
        let id = self.allocate_id();
        self.records.insert(
            id,
            Entity::Patient(Patient {
                id,
                coverage,
                arrived_at: now,
                wait_start: Some(now),
                returning: false,
                status: PatientStatus::WaitingAtDesk,
            }),
        );
        id
    }

    pub fn admit_call(&mut self, now: f64) -> EntityId {
        let id = self.allocate_id();
        self.records.insert(
            id,
            Entity::Call(Call {
                id,
                arrived_at: now,
                status: CallStatus::WaitingForLine,
            }),
        );
        id
    }

    pub fn patient_mut(&mut self, id: EntityId) -> Result<&mut Patient> {
        match self.records.get_mut(&id) {
            Some(Entity::Patient(patient)) => Ok(patient),
            Some(Entity::Call(_)) => Err(Error::InvariantViolation(format!(
                "entity {} is a call, expected a patient",
                id
            ))),
            None => Err(missing(id)),
        }
    }

    pub fn call_mut(&mut self, id: EntityId) -> Result<&mut Call> {
        match self.records.get_mut(&id) {
            Some(Entity::Call(call)) => Ok(call),
            Some(Entity::Patient(_)) => Err(Error::InvariantViolation(format!(
                "entity {} is a patient, expected a call",
                id
            ))),
            None => Err(missing(id)),
        }
    }

    pub fn retire(&mut self, id: EntityId) -> Result<Entity> {
        let mut entity = self.records.remove(&id).ok_or_else(|| missing(id))?;
        match &mut entity {
            Entity::Patient(patient) => patient.status = PatientStatus::Finished,
            Entity::Call(call) => call.status = CallStatus::Finished,
        }
        Ok(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.records.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn missing(id: EntityId) -> Error {
    Error::InvariantViolation(format!("entity {} is not in the system", id))
}
