use chrono::NaiveDateTime;

use crate::engine::AttendancePolicy;
use crate::engine::classifier::apply_early_departure;
use crate::model::attendance::{AttendancePatch, AttendanceRecord, AttendanceStatus};
use crate::model::shift::ShiftDefinition;

/// A correction to an existing record: checkout, corrected arrival, or a status override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub in_time: Option<NaiveDateTime>,
    pub out_time: Option<NaiveDateTime>,
    pub attendance_status: Option<AttendanceStatus>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Only a checkout without an explicit status re-derives anything, and that
    /// needs the employee's first active shift.
    pub fn needs_shift(&self) -> bool {
        self.attendance_status.is_none() && self.out_time.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// The caller supplied the status; it is stored as given.
    Override,
    /// Checkout re-ran the early-departure rule.
    CheckoutRecompute,
    /// Nothing in the update can change the status.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDecision {
    pub status: AttendanceStatus,
    pub source: StatusSource,
}

/// Decides the status after `update` is applied to `record`.
///
/// Arrival-based classification is settled at creation; a checkout can only move
/// `Present` to `HalfDay`. Without a shift to compare against the status is kept.
pub fn decide_status(
    record: &AttendanceRecord,
    update: &StatusUpdate,
    first_shift: Option<&ShiftDefinition>,
    policy: &AttendancePolicy,
) -> StatusDecision {
    if let Some(status) = update.attendance_status {
        return StatusDecision {
            status,
            source: StatusSource::Override,
        };
    }

    match (update.out_time, first_shift) {
        (Some(out_time), Some(shift)) => {
            let arrival = update.in_time.unwrap_or(record.in_time);
            StatusDecision {
                status: apply_early_departure(
                    record.attendance_status,
                    shift,
                    arrival,
                    out_time,
                    policy,
                ),
                source: StatusSource::CheckoutRecompute,
            }
        }
        _ => StatusDecision {
            status: record.attendance_status,
            source: StatusSource::Unchanged,
        },
    }
}

/// Columns to write for `update`. A checkout also marks the out capture and
/// approval flags; the status column is written when overridden or changed.
pub fn build_patch(
    record: &AttendanceRecord,
    update: &StatusUpdate,
    decision: StatusDecision,
) -> AttendancePatch {
    let checked_out = update.out_time.is_some();
    let write_status = decision.source == StatusSource::Override
        || decision.status != record.attendance_status;

    AttendancePatch {
        in_time: update.in_time,
        out_time: update.out_time,
        out_user: checked_out.then_some(true),
        out_approval: checked_out.then_some(true),
        attendance_status: write_status.then_some(decision.status),
    }
}
