use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::validate_config;
use crate::entities::{CallStatus, Coverage, EntityId, PatientStatus};
use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::models::{CallPolicy, CoverageTiming, SimConfig};
use crate::random::{exponential, uniform, unit};
use crate::state::{EngineState, RunMetadata, SimulationResult};
use crate::stations::{DeskJob, NextPatient};
use crate::trace::{Draw, DrawKind, TraceRecorder, TraceRow};

pub const INITIALIZATION: &str = "initialization";

pub struct SimulationEngine<'a> {
    pub config: SimConfig,
    pub state: EngineState,
    rng: &'a mut dyn RngCore,
    recorder: TraceRecorder,
    draws: Vec<Draw>,
    events_processed: usize,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(config: SimConfig, rng: &'a mut dyn RngCore) -> Self {
        Self {
            config,
            state: EngineState::default(),
            rng,
            recorder: TraceRecorder::new(),
            draws: Vec::new(),
            events_processed: 0,
        }
    }

    pub fn run(mut self) -> Result<SimulationResult> {
        validate_config(&self.config)?;
        info!(
            "starting run: horizon={} seed={} call_policy={} coverage_timing={}",
            self.config.horizon,
            self.config.seed,
            self.config.call_policy,
            self.config.coverage_timing
        );

        self.initialize()?;

        while self.state.clock < self.config.horizon {
            let Some(next) = self.state.pending.next() else {
                break;
            };
            if next.time > self.config.horizon {
                break;
            }
            self.step(next.kind, next.time)?;
        }

        let statistics = self.state.stats.clone();
        let average_wait = statistics.average_wait();
        info!(
            "finished run: events={} clock={:.3} lost_calls={} average_wait={:.3}",
            self.events_processed, self.state.clock, statistics.lost_calls, average_wait
        );

        Ok(SimulationResult {
            metadata: RunMetadata {
                seed: self.config.seed,
                horizon: self.config.horizon,
                call_policy: self.config.call_policy,
                coverage_timing: self.config.coverage_timing,
                events_processed: self.events_processed,
                final_clock: self.state.clock,
            },
            trace: self.recorder.into_rows(),
            lost_calls: statistics.lost_calls,
            average_wait,
            statistics,
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.state = EngineState::default();
        self.recorder = TraceRecorder::new();
        self.draws.clear();
        self.events_processed = 0;

        self.schedule_patient_arrival()?;
        self.state
            .pending
            .schedule(EventKind::CallArrival, self.config.time_to_first_call);

        for _ in 0..self.config.initial_desk_backlog {
            let coverage = self.arrival_coverage();
            let id = self.state.entities.admit_patient(coverage, 0.0);
            self.state.desk.waiting.push_back(id);
        }
        for _ in 0..self.config.initial_payment_backlog {
            let id = self.state.entities.admit_patient(Coverage::Uncovered, 0.0);
            let patient = self.state.entities.patient_mut(id)?;
            patient.wait_start = None;
            patient.status = PatientStatus::WaitingAtPayment;
            self.state.payment.queue.push_back(id);
        }

        self.dispatch_desk()?;
        self.dispatch_payment()?;
        self.state.check_invariants()?;
        self.record(INITIALIZATION);
        Ok(())
    }

    pub fn step(&mut self, kind: EventKind, time: f64) -> Result<()> {
        if time < self.state.clock {
            return Err(Error::InvariantViolation(format!(
                "{} at {} is earlier than clock {}",
                kind, time, self.state.clock
            )));
        }
        self.state.clock = time;
        self.handle(kind)?;
        self.state.check_invariants()?;
        self.events_processed += 1;
        debug!(
            "[{:.3}] {} desk_queue={} payment_queue={} lost_calls={} waits={}",
            self.state.clock,
            kind,
            self.state.desk.returning.len() + self.state.desk.waiting.len(),
            self.state.payment.queue.len(),
            self.state.stats.lost_calls,
            self.state.stats.wait_count
        );
        self.record(kind.label());
        Ok(())
    }

    pub fn handle(&mut self, kind: EventKind) -> Result<()> {
        if self.state.pending.clear(kind).is_none() {
            return Err(Error::InvariantViolation(format!(
                "{} fired without being scheduled",
                kind
            )));
        }
        match kind {
            EventKind::PatientArrival => self.on_patient_arrival(),
            EventKind::CallArrival => self.on_call_arrival(),
            EventKind::DeskServiceCompletion => self.on_desk_service_completion(),
            EventKind::NoticeCompletion => self.on_notice_completion(),
            EventKind::PaymentCompletion => self.on_payment_completion(),
            EventKind::CallCompletion => self.on_call_completion(),
        }
    }

    pub fn rows(&self) -> &[TraceRow] {
        self.recorder.rows()
    }

    fn on_patient_arrival(&mut self) -> Result<()> {
        self.schedule_patient_arrival()?;
        let coverage = self.arrival_coverage();
        let id = self.state.entities.admit_patient(coverage, self.state.clock);
        self.state.desk.waiting.push_back(id);
        self.dispatch_desk()
    }

    fn on_call_arrival(&mut self) -> Result<()> {
        let now = self.state.clock;
        self.state
            .pending
            .schedule(EventKind::CallArrival, now + self.config.call_interval);

        let admitted = !self.state.line.is_busy()
            && match self.config.call_policy {
                CallPolicy::HoldOnLine => true,
                CallPolicy::RejectWhenDeskBusy => !self.state.desk.is_busy(),
            };
        if !admitted {
            let id = self.state.entities.allocate_id();
            self.state.stats.record_lost_call();
            debug!("[{:.3}] call {} lost", now, id);
            return Ok(());
        }

        let id = self.state.entities.admit_call(now);
        self.state.line.hold(id);
        self.dispatch_desk()
    }

    fn on_desk_service_completion(&mut self) -> Result<()> {
        let id = self.release_desk_patient()?;
        let patient = self.state.entities.patient_mut(id)?;
        if patient.needs_notice() {
            return Err(Error::InvariantViolation(format!(
                "patient {} finished desk service before paying",
                id
            )));
        }
        self.state.entities.retire(id)?;
        trace!("[{:.3}] patient {} leaves", self.state.clock, id);
        self.dispatch_desk()
    }

    fn on_notice_completion(&mut self) -> Result<()> {
        let id = self.release_desk_patient()?;
        let patient = self.state.entities.patient_mut(id)?;
        patient.status = PatientStatus::WaitingAtPayment;
        patient.wait_start = None;
        self.state.payment.queue.push_back(id);
        self.dispatch_desk()?;
        self.dispatch_payment()
    }

    fn on_payment_completion(&mut self) -> Result<()> {
        let id = self.state.payment.occupant.take().ok_or_else(|| {
            Error::InvariantViolation("payment completed with no one paying".to_string())
        })?;
        let patient = self.state.entities.patient_mut(id)?;
        patient.returning = true;
        patient.status = PatientStatus::WaitingAtDesk;
        self.state.desk.returning.push_back(id);
        self.dispatch_desk()?;
        self.dispatch_payment()
    }

    fn on_call_completion(&mut self) -> Result<()> {
        let id = match self.state.desk.occupant.take() {
            Some(DeskJob::Call(id)) => id,
            other => {
                return Err(Error::InvariantViolation(format!(
                    "call completed while desk held {:?}",
                    other
                )))
            }
        };
        if self.state.line.release() != Some(id) {
            return Err(Error::InvariantViolation(format!(
                "call {} was not on the line",
                id
            )));
        }
        self.state.entities.retire(id)?;
        self.dispatch_desk()
    }

    fn dispatch_desk(&mut self) -> Result<()> {
        if self.state.desk.is_busy() {
            return Ok(());
        }
        let now = self.state.clock;

        if let Some(id) = self.state.line.held_call() {
            let duration = uniform(
                &mut *self.rng,
                self.config.call_duration_low,
                self.config.call_duration_high,
            )?;
            self.draws.push(Draw::new(DrawKind::CallDuration, duration));
            self.state.line.answer(id);
            self.state.entities.call_mut(id)?.status = CallStatus::BeingHandled;
            self.state.desk.occupant = Some(DeskJob::Call(id));
            self.state
                .pending
                .schedule(EventKind::CallCompletion, now + duration.value);
            trace!("[{:.3}] desk answers call {}", now, id);
            return Ok(());
        }

        let Some(next) = self.state.desk.next_patient() else {
            return Ok(());
        };
        let id = match next {
            NextPatient::Returning(id) => id,
            NextPatient::New(id) => {
                let wait_start = self.state.entities.patient_mut(id)?.wait_start;
                let wait_start = wait_start.ok_or_else(|| {
                    Error::InvariantViolation(format!("patient {} queued without wait start", id))
                })?;
                if now < wait_start {
                    return Err(Error::InvariantViolation(format!(
                        "patient {} started service at {} before its wait began at {}",
                        id, now, wait_start
                    )));
                }
                self.state.stats.record_wait(now - wait_start);
                id
            }
        };

        if self.state.entities.patient_mut(id)?.coverage == Coverage::Unknown {
            let coverage = self.draw_coverage();
            self.state.entities.patient_mut(id)?.coverage = coverage;
        }

        let patient = self.state.entities.patient_mut(id)?;
        patient.status = PatientStatus::AtDesk;
        patient.wait_start = None;
        let needs_notice = patient.needs_notice();
        self.state.desk.occupant = Some(DeskJob::Patient(id));

        if needs_notice {
            self.state
                .pending
                .schedule(EventKind::NoticeCompletion, now + self.config.notice_duration);
        } else {
            let service = uniform(
                &mut *self.rng,
                self.config.desk_service_low,
                self.config.desk_service_high,
            )?;
            self.draws.push(Draw::new(DrawKind::DeskService, service));
            self.state
                .pending
                .schedule(EventKind::DeskServiceCompletion, now + service.value);
        }
        trace!(
            "[{:.3}] desk starts patient {} (notice only: {})",
            now,
            id,
            needs_notice
        );
        Ok(())
    }

    fn dispatch_payment(&mut self) -> Result<()> {
        if self.state.payment.is_busy() {
            return Ok(());
        }
        let Some(id) = self.state.payment.queue.pop_front() else {
            return Ok(());
        };
        let now = self.state.clock;
        let payment = uniform(
            &mut *self.rng,
            self.config.payment_low,
            self.config.payment_high,
        )?;
        self.draws.push(Draw::new(DrawKind::Payment, payment));
        self.state.entities.patient_mut(id)?.status = PatientStatus::Paying;
        self.state.payment.occupant = Some(id);
        self.state
            .pending
            .schedule(EventKind::PaymentCompletion, now + payment.value);
        trace!("[{:.3}] payment window takes patient {}", now, id);
        Ok(())
    }

    fn release_desk_patient(&mut self) -> Result<EntityId> {
        match self.state.desk.occupant.take() {
            Some(DeskJob::Patient(id)) => Ok(id),
            other => Err(Error::InvariantViolation(format!(
                "desk patient service completed while desk held {:?}",
                other
            ))),
        }
    }

    fn schedule_patient_arrival(&mut self) -> Result<()> {
        let gap = exponential(&mut *self.rng, self.config.mean_interarrival)?;
        self.draws.push(Draw::new(DrawKind::InterArrival, gap));
        self.state
            .pending
            .schedule(EventKind::PatientArrival, self.state.clock + gap.value);
        Ok(())
    }

    fn arrival_coverage(&mut self) -> Coverage {
        match self.config.coverage_timing {
            CoverageTiming::Arrival => self.draw_coverage(),
            CoverageTiming::ServiceStart => Coverage::Unknown,
        }
    }

    fn draw_coverage(&mut self) -> Coverage {
        let draw = unit(&mut *self.rng);
        self.draws.push(Draw::new(DrawKind::Coverage, draw));
        if draw.rnd < self.config.uncovered_fraction {
            Coverage::Uncovered
        } else {
            Coverage::Covered
        }
    }

    fn record(&mut self, event: &'static str) {
        let draws = std::mem::take(&mut self.draws);
        self.recorder.record(event, &self.state, draws);
    }
}

pub fn run_simulation(config: &SimConfig) -> Result<SimulationResult> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    run_simulation_with_rng(config, &mut rng)
}

pub fn run_simulation_with_rng(
    config: &SimConfig,
    rng: &mut dyn RngCore,
) -> Result<SimulationResult> {
    SimulationEngine::new(config.clone(), rng).run()
}
