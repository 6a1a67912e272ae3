use chrono::NaiveDateTime;

use crate::engine::{AttendancePolicy, window::minutes_after_start};
use crate::error::AttendanceError;
use crate::model::shift::{ShiftDefinition, minutes_from_midnight};

/// Which rule picked the shift an attendance event is classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Arrival is at or after the shift start and inside its outer grace window.
    WithinGraceWindow,
    /// No shift fit by timing; the nearest start by clock was taken.
    ClosestStart,
    /// The caller named the shift.
    Manual,
}

impl MatchRule {
    pub fn reason(self) -> &'static str {
        match self {
            MatchRule::WithinGraceWindow => "Arrived within the grace window of the shift start",
            MatchRule::ClosestStart => "No shift fits the arrival; closest start time used",
            MatchRule::Manual => "Manually specified shift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftMatch<'a> {
    pub shift: &'a ShiftDefinition,
    pub rule: MatchRule,
}

/// Picks the shift an arrival belongs to.
///
/// First pass: among shifts whose start is at most `max_arrival_delay + outer_grace`
/// minutes before the arrival (and not after it), the latest start wins.
/// Second pass, when nothing fits: the start closest to the arrival in either direction.
/// Ties keep the earlier entry, so `shifts` should be ordered by start time.
/// Inactive shifts are ignored.
pub fn match_shift<'a>(
    shifts: &'a [ShiftDefinition],
    arrival: NaiveDateTime,
    policy: &AttendancePolicy,
) -> Result<ShiftMatch<'a>, AttendanceError> {
    let arrival_minutes = minutes_from_midnight(arrival.time());
    let active = || shifts.iter().filter(|shift| shift.is_active());

    let within_window = active()
        .filter_map(|shift| {
            let diff = minutes_after_start(shift, arrival.time());
            let ceiling = policy.absence_threshold(shift.max_arrival_delay_minutes());
            (0..=ceiling).contains(&diff).then_some((shift, diff))
        })
        .min_by_key(|&(_, diff)| diff);

    if let Some((shift, _)) = within_window {
        return Ok(ShiftMatch {
            shift,
            rule: MatchRule::WithinGraceWindow,
        });
    }

    active()
        .min_by_key(|shift| (arrival_minutes - shift.start_minutes()).abs())
        .map(|shift| ShiftMatch {
            shift,
            rule: MatchRule::ClosestStart,
        })
        .ok_or(AttendanceError::NoShiftAssigned)
}
