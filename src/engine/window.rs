use chrono::{Days, NaiveDateTime, NaiveTime};

use crate::model::shift::{ShiftDefinition, minutes_from_midnight};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// One concrete occurrence of a shift on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftInstance {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShiftInstance {
    /// Day shifts are laid over the arrival's own date. An overnight shift reached
    /// after midnight belongs to the occurrence that started the day before.
    pub fn containing_arrival(shift: &ShiftDefinition, arrival: NaiveDateTime) -> Self {
        let mut day = arrival.date();
        if in_overnight_tail(shift, arrival.time()) {
            day = day.checked_sub_days(Days::new(1)).unwrap_or(day);
        }

        let end_day = if shift.crosses_midnight() {
            day.checked_add_days(Days::new(1)).unwrap_or(day)
        } else {
            day
        };

        Self {
            start: day.and_time(shift.start_time),
            end: end_day.and_time(shift.end_time),
        }
    }
}

/// True when `time` lies between midnight and the end of an overnight shift.
/// Compared in whole minutes, like every other arrival offset.
pub fn in_overnight_tail(shift: &ShiftDefinition, time: NaiveTime) -> bool {
    shift.crosses_midnight() && minutes_from_midnight(time) < shift.end_minutes()
}

/// When the employee was due to leave, for a checkout at `departure`.
///
/// Day shifts use the departure's own date; overnight shifts use the end of the
/// occurrence opened by `arrival`.
pub fn expected_departure(
    shift: &ShiftDefinition,
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
) -> NaiveDateTime {
    if shift.crosses_midnight() {
        ShiftInstance::containing_arrival(shift, arrival).end
    } else {
        departure.date().and_time(shift.end_time)
    }
}

/// Signed whole minutes from shift start to `arrival`.
pub fn minutes_after_start(shift: &ShiftDefinition, arrival: NaiveTime) -> i64 {
    let diff = minutes_from_midnight(arrival) - shift.start_minutes();
    if in_overnight_tail(shift, arrival) {
        diff + MINUTES_PER_DAY
    } else {
        diff
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::shift::ShiftStatus;
    use chrono::NaiveDate;

    pub(crate) fn shift(id: u64, start: (u32, u32), end: (u32, u32), delay: i32) -> ShiftDefinition {
        ShiftDefinition {
            shift_id: id,
            shift_type: format!("Shift {id}"),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            max_arrival_delay: delay,
            latest_leave: None,
            ot_start_hours: None,
            status: ShiftStatus::Active,
        }
    }

    pub(crate) fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn day_shift_is_laid_over_arrival_date() {
        let s = shift(1, (9, 0), (17, 0), 15);
        let instance = ShiftInstance::containing_arrival(&s, at(10, 9, 40));

        assert_eq!(instance.start, at(10, 9, 0));
        assert_eq!(instance.end, at(10, 17, 0));
    }

    #[test]
    fn overnight_arrival_before_midnight_opens_todays_instance() {
        let s = shift(1, (22, 0), (6, 0), 15);
        let instance = ShiftInstance::containing_arrival(&s, at(10, 22, 5));

        assert_eq!(instance.start, at(10, 22, 0));
        assert_eq!(instance.end, at(11, 6, 0));
    }

    #[test]
    fn overnight_arrival_after_midnight_belongs_to_previous_instance() {
        let s = shift(1, (22, 0), (6, 0), 15);
        let instance = ShiftInstance::containing_arrival(&s, at(11, 0, 30));

        assert_eq!(instance.start, at(10, 22, 0));
        assert_eq!(instance.end, at(11, 6, 0));
    }

    #[test]
    fn expected_departure_for_day_shift_uses_departure_date() {
        let s = shift(1, (9, 0), (17, 0), 15);
        assert_eq!(expected_departure(&s, at(10, 9, 0), at(11, 8, 0)), at(11, 17, 0));
    }

    #[test]
    fn minutes_after_start_wraps_only_in_overnight_tail() {
        let night = shift(1, (22, 0), (6, 0), 15);
        let day = shift(2, (9, 0), (17, 0), 15);

        assert_eq!(minutes_after_start(&night, time(0, 30, 0)), 150);
        assert_eq!(minutes_after_start(&night, time(21, 0, 0)), -60);
        assert_eq!(minutes_after_start(&day, time(8, 0, 0)), -60);
    }

    fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, second).unwrap()
    }

    #[test]
    fn seconds_in_end_time_do_not_split_matcher_and_classifier() {
        let mut night = shift(1, (22, 0), (6, 0), 15);
        night.end_time = time(6, 0, 30);
        let arrival = at(11, 6, 0) + chrono::Duration::seconds(10);

        // 06:00:10 is the same minute as the 06:00:30 end, so it is past the tail.
        assert!(!in_overnight_tail(&night, arrival.time()));
        assert_eq!(minutes_after_start(&night, arrival.time()), -16 * 60);
        assert_eq!(
            ShiftInstance::containing_arrival(&night, arrival).start,
            at(11, 22, 0)
        );
    }
}
