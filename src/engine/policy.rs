/// Tolerances shared by the matcher, the classifier and the checkout rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePolicy {
    /// Minutes beyond a shift's own arrival delay after which arrival counts as `Absent`
    /// and the shift stops being a timing candidate.
    pub outer_grace_minutes: i64,
    /// Leaving more than this many minutes before shift end turns `Present` into `HalfDay`.
    pub early_departure_minutes: i64,
}

impl AttendancePolicy {
    pub const DEFAULT_OUTER_GRACE_MINUTES: i64 = 240;
    pub const DEFAULT_EARLY_DEPARTURE_MINUTES: i64 = 60;

    /// Latest tolerated delay for `shift_delay` before arrival becomes `Absent`.
    pub fn absence_threshold(&self, shift_delay: i64) -> i64 {
        shift_delay + self.outer_grace_minutes
    }
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            outer_grace_minutes: Self::DEFAULT_OUTER_GRACE_MINUTES,
            early_departure_minutes: Self::DEFAULT_EARLY_DEPARTURE_MINUTES,
        }
    }
}
