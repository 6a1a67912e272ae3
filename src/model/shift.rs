use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ShiftStatus {
    Active,
    Inactive,
}

/// A work shift as stored in the shift catalog.
///
/// `start_time`/`end_time` are wall-clock values without a date. An `end_time`
/// earlier than `start_time` marks a shift that runs past midnight.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDefinition {
    pub shift_id: u64,
    pub shift_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Minutes after `start_time` during which arrival still counts as on time.
    pub max_arrival_delay: i32,
    pub latest_leave: Option<NaiveTime>,
    /// Reported with the shift; overtime is not computed here.
    pub ot_start_hours: Option<f64>,
    pub status: ShiftStatus,
}

impl ShiftDefinition {
    pub fn is_active(&self) -> bool {
        self.status == ShiftStatus::Active
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// Negative delays in catalog data are treated as zero.
    pub fn max_arrival_delay_minutes(&self) -> i64 {
        i64::from(self.max_arrival_delay.max(0))
    }

    pub fn start_minutes(&self) -> i64 {
        minutes_from_midnight(self.start_time)
    }

    pub fn end_minutes(&self) -> i64 {
        minutes_from_midnight(self.end_time)
    }

    pub fn summary(&self) -> ShiftSummary {
        ShiftSummary {
            shift_id: self.shift_id,
            shift_type: self.shift_type.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            max_delay_minutes: self.max_arrival_delay,
            latest_leave: self.latest_leave,
            ot_start_hours: self.ot_start_hours,
        }
    }
}

/// Whole minutes since midnight; seconds are dropped.
pub fn minutes_from_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShiftSummary {
    #[schema(example = 1)]
    pub shift_id: u64,
    #[schema(example = "Morning")]
    pub shift_type: String,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = 15)]
    pub max_delay_minutes: i32,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub latest_leave: Option<NaiveTime>,
    #[schema(example = 8.0)]
    pub ot_start_hours: Option<f64>,
}
