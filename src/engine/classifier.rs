use chrono::{Duration, NaiveDateTime};

use crate::engine::matcher::MatchRule;
use crate::engine::window::{ShiftInstance, expected_departure};
use crate::engine::AttendancePolicy;
use crate::model::attendance::{AttendanceStatus, TimingAnalysis};
use crate::model::shift::ShiftDefinition;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: AttendanceStatus,
    pub timing: TimingAnalysis,
}

/// Classifies an arrival (and optional departure) against `shift`.
///
/// Arrival at or before `start + max_arrival_delay` is `Present`; up to
/// `outer_grace` minutes beyond that is `Late`; anything later is `Absent`.
/// A departure more than `early_departure_minutes` before the shift end turns
/// `Present` into `HalfDay` and never touches `Late` or `Absent`.
pub fn classify(
    shift: &ShiftDefinition,
    rule: MatchRule,
    arrival: NaiveDateTime,
    departure: Option<NaiveDateTime>,
    policy: &AttendancePolicy,
) -> Classification {
    let max_delay = shift.max_arrival_delay_minutes();
    let expected_arrival = ShiftInstance::containing_arrival(shift, arrival).start;
    let allowed_arrival = expected_arrival + Duration::minutes(max_delay);
    let delay_minutes = (arrival - expected_arrival).num_minutes();

    let (mut status, mut status_reason) = if arrival <= allowed_arrival {
        (
            AttendanceStatus::Present,
            format!("Arrived within the allowed delay of {max_delay} minutes"),
        )
    } else if delay_minutes > policy.absence_threshold(max_delay) {
        (
            AttendanceStatus::Absent,
            format!(
                "Arrived {delay_minutes} minutes late, beyond the {} minute limit",
                policy.absence_threshold(max_delay)
            ),
        )
    } else {
        (
            AttendanceStatus::Late,
            format!("Arrived {delay_minutes} minutes late, allowed delay is {max_delay} minutes"),
        )
    };

    if let Some(departure) = departure {
        if let Some(early) = early_departure(shift, arrival, departure, policy) {
            if status == AttendanceStatus::Present {
                status = AttendanceStatus::HalfDay;
                status_reason = format!("Left {early} minutes before the end of the shift");
            }
        }
    }

    Classification {
        status,
        timing: TimingAnalysis {
            expected_arrival: expected_arrival.time(),
            allowed_arrival: allowed_arrival.time(),
            actual_arrival: arrival.time(),
            delay_minutes: delay_minutes.max(0),
            shift_selection_reason: rule.reason().to_string(),
            status_reason,
        },
    }
}

/// Minutes left early, when the departure is earlier than the early-leave threshold.
pub fn early_departure(
    shift: &ShiftDefinition,
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
    policy: &AttendancePolicy,
) -> Option<i64> {
    let expected = expected_departure(shift, arrival, departure);
    let threshold = expected - Duration::minutes(policy.early_departure_minutes);

    (departure < threshold).then(|| (expected - departure).num_minutes())
}

/// Applies the early-departure rule to an already settled status.
pub fn apply_early_departure(
    current: AttendanceStatus,
    shift: &ShiftDefinition,
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
    policy: &AttendancePolicy,
) -> AttendanceStatus {
    match current {
        AttendanceStatus::Present
            if early_departure(shift, arrival, departure, policy).is_some() =>
        {
            AttendanceStatus::HalfDay
        }
        other => other,
    }
}
