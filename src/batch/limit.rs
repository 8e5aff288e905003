//! Per-call admission limit

/// Cumulative weight and record count of one `increment` call, checked
/// against two independent ceilings.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLimit {
    weight_limit: f64,
    record_limit: u64,
    weight: f64,
    records: u64,
}

impl BatchLimit {
    pub fn new(weight_limit: f64, record_limit: u64) -> Self {
        Self {
            weight_limit,
            record_limit,
            weight: 0.0,
            records: 0,
        }
    }

    pub fn add(&mut self, weight: f64, records: u64) {
        self.weight += weight;
        self.records = self.records.saturating_add(records);
    }

    /// Both totals are still below their ceilings
    pub fn is_under(&self) -> bool {
        self.weight < self.weight_limit && self.records < self.record_limit
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn records(&self) -> u64 {
        self.records
    }
}
