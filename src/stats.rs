use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub lost_calls: u64,
    pub cumulative_wait: f64,
    pub wait_count: u64,
}

impl Statistics {
    pub fn record_lost_call(&mut self) {
        self.lost_calls += 1;
    }

    pub fn record_wait(&mut self, elapsed: f64) {
        self.cumulative_wait += elapsed;
        self.wait_count += 1;
    }

    pub fn average_wait(&self) -> f64 {
        if self.wait_count == 0 {
            0.0
        } else {
            self.cumulative_wait / self.wait_count as f64
        }
    }
}
