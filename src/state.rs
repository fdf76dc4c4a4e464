use serde::Serialize;

use crate::entities::{Entity, EntityArena};
use crate::error::{Error, Result};
use crate::events::PendingEvents;
use crate::models::{CallPolicy, CoverageTiming};
use crate::stations::{Desk, DeskJob, PaymentWindow, PhoneLine};
use crate::stats::Statistics;
use crate::trace::TraceRow;

#[derive(Clone, Debug, Default)]
pub struct EngineState {
    pub clock: f64,
    pub pending: PendingEvents,
    pub entities: EntityArena,
    pub desk: Desk,
    pub payment: PaymentWindow,
    pub line: PhoneLine,
    pub stats: Statistics,
}

impl EngineState {
    pub fn check_invariants(&self) -> Result<()> {
        let expected = match self.desk.occupant {
            None => [false, false, false],
            Some(DeskJob::Call(_)) => [false, false, true],
            Some(DeskJob::Patient(id)) => {
                let notice = match self.entities.get(id) {
                    Some(Entity::Patient(patient)) => patient.needs_notice(),
                    _ => {
                        return Err(violation(format!(
                            "desk occupant {} is not a patient",
                            id
                        )))
                    }
                };
                [!notice, notice, false]
            }
        };
        let actual = [
            self.pending.desk_service_completion.is_some(),
            self.pending.notice_completion.is_some(),
            self.pending.call_completion.is_some(),
        ];
        if expected != actual {
            return Err(violation(format!(
                "desk occupant {:?} does not match scheduled completions {:?}",
                self.desk.occupant, actual
            )));
        }

        if self.payment.is_busy() != self.pending.payment_completion.is_some() {
            return Err(violation(format!(
                "payment busy = {} but completion scheduled = {}",
                self.payment.is_busy(),
                self.pending.payment_completion.is_some()
            )));
        }

        let answered_call = match self.desk.occupant {
            Some(DeskJob::Call(id)) => Some(id),
            _ => None,
        };
        let line_answered = if self.line.answered { self.line.call } else { None };
        if answered_call != line_answered {
            return Err(violation(format!(
                "desk call {:?} does not match answered line call {:?}",
                answered_call, line_answered
            )));
        }

        let placed = self.desk.returning.len()
            + self.desk.waiting.len()
            + self.payment.queue.len()
            + usize::from(self.payment.is_busy())
            + usize::from(self.desk.is_busy())
            + usize::from(self.line.held_call().is_some());
        if placed != self.entities.len() {
            return Err(violation(format!(
                "{} entities placed at stations but {} in the system",
                placed,
                self.entities.len()
            )));
        }

        Ok(())
    }
}

fn violation(message: String) -> Error {
    Error::InvariantViolation(message)
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetadata {
    pub seed: u64,
    pub horizon: f64,
    pub call_policy: CallPolicy,
    pub coverage_timing: CoverageTiming,
    pub events_processed: usize,
    pub final_clock: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationResult {
    pub metadata: RunMetadata,
    pub trace: Vec<TraceRow>,
    pub statistics: Statistics,
    pub lost_calls: u64,
    pub average_wait: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Coverage;
    use crate::events::EventKind;

    #[test]
    fn empty_state_is_consistent() {
        assert!(EngineState::default().check_invariants().is_ok());
    }

    #[test]
    fn busy_desk_without_completion_is_rejected() {
        let mut state = EngineState::default();
        let id = state.entities.admit_patient(Coverage::Covered, 0.0);
        state.desk.occupant = Some(DeskJob::Patient(id));
        let err = state.check_invariants().unwrap_err();
        assert!(err.to_string().contains("does not match scheduled completions"));

        state.pending.schedule(EventKind::DeskServiceCompletion, 2.0);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn untracked_entity_is_rejected() {
        let mut state = EngineState::default();
        state.entities.admit_patient(Coverage::Covered, 0.0);
        assert!(state.check_invariants().is_err());
    }
}
