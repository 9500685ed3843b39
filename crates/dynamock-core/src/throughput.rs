//! Provisioned-throughput bookkeeping.
//!
//! Capacities are recorded, never enforced. What is tracked is when the
//! capacities last went up or down and how many decreasing updates happened
//! on the current UTC day.

use chrono::{DateTime, NaiveDate, Utc};

use dynamock_model::types::{ProvisionedThroughput, ProvisionedThroughputDescription};

/// Throughput state of one table.
#[derive(Debug, Clone)]
pub struct ThroughputTracker {
    read_capacity_units: i64,
    write_capacity_units: i64,
    last_increase_at: DateTime<Utc>,
    last_decrease_at: DateTime<Utc>,
    decreases_today: i64,
    decrease_day: Option<NaiveDate>,
}

impl ThroughputTracker {
    /// Start tracking with the capacities given at table creation.
    #[must_use]
    pub fn new(initial: &ProvisionedThroughput, now: DateTime<Utc>) -> Self {
        Self {
            read_capacity_units: initial.read_capacity_units,
            write_capacity_units: initial.write_capacity_units,
            last_increase_at: now,
            last_decrease_at: now,
            decreases_today: 0,
            decrease_day: None,
        }
    }

    /// Apply new capacities.
    ///
    /// Each capacity is compared on its own: a strictly greater value is an
    /// increase, anything else (equal included) is a decrease. The call counts
    /// once toward today's decreases when either capacity decreased. Returns
    /// whether it did.
    pub fn update(&mut self, next: &ProvisionedThroughput, now: DateTime<Utc>) -> bool {
        let mut decreased = false;
        for (current, wanted) in [
            (self.read_capacity_units, next.read_capacity_units),
            (self.write_capacity_units, next.write_capacity_units),
        ] {
            if wanted > current {
                self.last_increase_at = now;
            } else {
                self.last_decrease_at = now;
                decreased = true;
            }
        }

        let today = now.date_naive();
        if self.decrease_day != Some(today) {
            self.decrease_day = Some(today);
            self.decreases_today = 0;
        }
        if decreased {
            self.decreases_today += 1;
        }

        self.read_capacity_units = next.read_capacity_units;
        self.write_capacity_units = next.write_capacity_units;
        decreased
    }

    /// Number of decreasing updates recorded for the current day.
    #[must_use]
    pub fn decreases_today(&self) -> i64 {
        self.decreases_today
    }

    /// Wire description of the tracked state.
    #[must_use]
    pub fn description(&self) -> ProvisionedThroughputDescription {
        ProvisionedThroughputDescription {
            read_capacity_units: self.read_capacity_units,
            write_capacity_units: self.write_capacity_units,
            number_of_decreases_today: Some(self.decreases_today),
            last_increase_date_time: Some(epoch_seconds(self.last_increase_at)),
            last_decrease_date_time: Some(epoch_seconds(self.last_decrease_at)),
        }
    }
}

/// Epoch seconds as the fractional number DynamoDB puts on the wire.
#[allow(clippy::cast_precision_loss)] // Acceptable: DynamoDB returns epoch seconds as f64
pub(crate) fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}
