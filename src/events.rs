use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    PatientArrival,
    CallArrival,
    DeskServiceCompletion,
    NoticeCompletion,
    PaymentCompletion,
    CallCompletion,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::PatientArrival,
        EventKind::CallArrival,
        EventKind::DeskServiceCompletion,
        EventKind::NoticeCompletion,
        EventKind::PaymentCompletion,
        EventKind::CallCompletion,
    ];

    /// Same-time events fire in ascending priority. Completions release
    /// servers before arrivals try to claim them.
    fn priority(&self) -> u8 {
        match self {
            EventKind::CallCompletion => 0,
            EventKind::DeskServiceCompletion => 1,
            EventKind::NoticeCompletion => 2,
            EventKind::PaymentCompletion => 3,
            EventKind::CallArrival => 4,
            EventKind::PatientArrival => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::PatientArrival => "patient-arrival",
            EventKind::CallArrival => "call-arrival",
            EventKind::DeskServiceCompletion => "desk-service-completion",
            EventKind::NoticeCompletion => "notice-completion",
            EventKind::PaymentCompletion => "payment-completion",
            EventKind::CallCompletion => "call-completion",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub time: f64,
    pub kind: EventKind,
}

impl ScheduledEvent {
    pub fn new(time: f64, kind: EventKind) -> Self {
        Self { time, kind }
    }
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.kind.priority().cmp(&other.kind.priority()))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PendingEvents {
    pub patient_arrival: Option<f64>,
    pub call_arrival: Option<f64>,
    pub desk_service_completion: Option<f64>,
    pub notice_completion: Option<f64>,
    pub payment_completion: Option<f64>,
    pub call_completion: Option<f64>,
}

impl PendingEvents {
    pub fn get(&self, kind: EventKind) -> Option<f64> {
        match kind {
            EventKind::PatientArrival => self.patient_arrival,
            EventKind::CallArrival => self.call_arrival,
            EventKind::DeskServiceCompletion => self.desk_service_completion,
            EventKind::NoticeCompletion => self.notice_completion,
            EventKind::PaymentCompletion => self.payment_completion,
            EventKind::CallCompletion => self.call_completion,
        }
    }

    fn slot_mut(&mut self, kind: EventKind) -> &mut Option<f64> {
        match kind {
            EventKind::PatientArrival => &mut self.patient_arrival,
            EventKind::CallArrival => &mut self.call_arrival,
            EventKind::DeskServiceCompletion => &mut self.desk_service_completion,
            EventKind::NoticeCompletion => &mut self.notice_completion,
            EventKind::PaymentCompletion => &mut self.payment_completion,
            EventKind::CallCompletion => &mut self.call_completion,
        }
    }

    pub fn schedule(&mut self, kind: EventKind, time: f64) {
        *self.slot_mut(kind) = Some(time);
    }

    pub fn clear(&mut self, kind: EventKind) -> Option<f64> {
        self.slot_mut(kind).take()
    }

    pub fn next(&self) -> Option<ScheduledEvent> {
        EventKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).map(|time| ScheduledEvent::new(time, *kind)))
            .min()
    }
}
