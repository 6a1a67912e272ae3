use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::shift::ShiftSummary;

/// Final classification of an attendance event.
///
/// Severity order is `Absent > Late > HalfDay > Present`; an early departure
/// only ever turns `Present` into `HalfDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub fingerprint_id: String,
    pub in_time: NaiveDateTime,
    pub out_time: Option<NaiveDateTime>,
    pub in_user: bool,
    pub out_user: bool,
    pub in_approval: bool,
    pub out_approval: bool,
    pub shift: String,
    pub attendance_status: AttendanceStatus,
    pub edit_in_time: Option<NaiveDateTime>,
    pub edit_out_time: Option<NaiveDateTime>,
}

/// A fully classified record, ready to be written in one INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRecord {
    pub employee_id: u64,
    pub fingerprint_id: String,
    pub in_time: NaiveDateTime,
    pub out_time: Option<NaiveDateTime>,
    pub in_user: bool,
    pub out_user: bool,
    pub in_approval: bool,
    pub out_approval: bool,
    pub shift: String,
    pub attendance_status: AttendanceStatus,
}

/// Columns touched by a status update. `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendancePatch {
    pub in_time: Option<NaiveDateTime>,
    pub out_time: Option<NaiveDateTime>,
    pub out_user: Option<bool>,
    pub out_approval: Option<bool>,
    pub attendance_status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimingAnalysis {
    #[schema(example = "09:00:00", value_type = String)]
    pub expected_arrival: NaiveTime,
    #[schema(example = "09:15:00", value_type = String)]
    pub allowed_arrival: NaiveTime,
    #[schema(example = "09:10:00", value_type = String)]
    pub actual_arrival: NaiveTime,
    #[schema(example = 10)]
    pub delay_minutes: i64,
    #[schema(example = "Arrived within the grace window of the shift start")]
    pub shift_selection_reason: String,
    #[schema(example = "Arrived within the allowed delay of 15 minutes")]
    pub status_reason: String,
}

/// Result of creating an attendance record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceOutcome {
    #[schema(example = 1)]
    pub id: u64,
    pub attendance_status: AttendanceStatus,
    pub selected_shift: ShiftSummary,
    /// Every shift considered by automatic matching; absent for manual-shift mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_employee_shifts: Option<Vec<ShiftSummary>>,
    pub timing_analysis: TimingAnalysis,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusUpdateOutcome {
    pub attendance_status: AttendanceStatus,
    pub affected: bool,
}
