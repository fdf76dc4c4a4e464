use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::entities::EntityId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StationKind {
    Desk,
    Payment,
    PhoneLine,
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StationKind::Desk => "desk",
            StationKind::Payment => "payment",
            StationKind::PhoneLine => "line",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeskJob {
    Patient(EntityId),
    Call(EntityId),
}

impl DeskJob {
    pub fn entity(&self) -> EntityId {
        match self {
            DeskJob::Patient(id) | DeskJob::Call(id) => *id,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NextPatient {
    Returning(EntityId),
    New(EntityId),
}

/// Front desk: one employee and two FIFO classes, patients coming back from
/// payment ahead of new arrivals.
#[derive(Clone, Debug, Default)]
pub struct Desk {
    pub occupant: Option<DeskJob>,
    pub returning: VecDeque<EntityId>,
    pub waiting: VecDeque<EntityId>,
}

impl Desk {
    pub fn is_busy(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn next_patient(&mut self) -> Option<NextPatient> {
        if let Some(id) = self.returning.pop_front() {
            return Some(NextPatient::Returning(id));
        }
        self.waiting.pop_front().map(NextPatient::New)
    }

    pub fn queued(&self) -> Vec<EntityId> {
        self.returning
            .iter()
            .chain(self.waiting.iter())
            .copied()
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PaymentWindow {
    pub occupant: Option<EntityId>,
    pub queue: VecDeque<EntityId>,
}

impl PaymentWindow {
    pub fn is_busy(&self) -> bool {
        self.occupant.is_some()
    }
}

/// The single phone line. A call on the line is either held until the desk
/// employee picks it up or answered, in which case the desk occupant is the
/// same call.
#[derive(Clone, Debug, Default)]
pub struct PhoneLine {
    pub call: Option<EntityId>,
    pub answered: bool,
}

impl PhoneLine {
    pub fn is_busy(&self) -> bool {
        self.call.is_some()
    }

    pub fn held_call(&self) -> Option<EntityId> {
        match self.call {
            Some(id) if !self.answered => Some(id),
            _ => None,
        }
    }

    pub fn hold(&mut self, id: EntityId) {
        self.call = Some(id);
        self.answered = false;
    }

    pub fn answer(&mut self, id: EntityId) {
        self.call = Some(id);
        self.answered = true;
    }

    pub fn release(&mut self) -> Option<EntityId> {
        self.answered = false;
        self.call.take()
    }
}
