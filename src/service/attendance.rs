use std::sync::Arc;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::engine::AttendancePolicy;
use crate::engine::classifier::classify;
use crate::engine::lifecycle::{StatusUpdate, build_patch, decide_status};
use crate::engine::matcher::{MatchRule, match_shift};
use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceOutcome, NewAttendanceRecord, StatusUpdateOutcome};
use crate::model::shift::ShiftDefinition;
use crate::store::{AttendanceStore, ShiftCatalog};
use crate::utils::timestamp::Timestamp;

/// Who captured the in/out punches and whether each side is approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFlags {
    pub in_user: bool,
    pub out_user: bool,
    pub in_approval: bool,
    pub out_approval: bool,
}

impl Default for CaptureFlags {
    fn default() -> Self {
        Self {
            in_user: true,
            out_user: false,
            in_approval: true,
            out_approval: false,
        }
    }
}

/// A validated clock-in event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordAttendance {
    pub employee_id: u64,
    pub fingerprint_id: String,
    pub in_time: NaiveDateTime,
    pub out_time: Option<NaiveDateTime>,
    /// Stored instead of the matched shift's label when present.
    pub shift_label: Option<String>,
    pub flags: CaptureFlags,
}

#[derive(Clone)]
pub struct AttendanceService {
    catalog: Arc<dyn ShiftCatalog>,
    store: Arc<dyn AttendanceStore>,
    policy: AttendancePolicy,
    utc_offset: FixedOffset,
}

impl AttendanceService {
    pub fn new(
        catalog: Arc<dyn ShiftCatalog>,
        store: Arc<dyn AttendanceStore>,
        policy: AttendancePolicy,
    ) -> Self {
        Self {
            catalog,
            store,
            policy,
            utc_offset: Utc.fix(),
        }
    }

    /// Company clock that zoned timestamps are read on; UTC unless set.
    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn wall_clock(&self, timestamp: Timestamp) -> NaiveDateTime {
        timestamp.wall_clock(self.utc_offset)
    }

    /// Records an attendance event, choosing the shift from the arrival time.
    #[instrument(skip(self, command), fields(employee_id = command.employee_id))]
    pub async fn record_attendance(
        &self,
        command: RecordAttendance,
    ) -> Result<AttendanceOutcome, AttendanceError> {
        let shifts = self
            .catalog
            .list_active_assignments(command.employee_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load shift assignments");
                AttendanceError::from(e)
            })?;

        let matched = match_shift(&shifts, command.in_time, &self.policy).inspect_err(|_| {
            warn!("Employee has no active shift assignment");
        })?;
        debug!(
            shift_id = matched.shift.shift_id,
            rule = ?matched.rule,
            candidates = shifts.len(),
            "Shift matched"
        );

        let mut outcome = self.persist(command, matched.shift, matched.rule).await?;
        outcome.all_employee_shifts = Some(shifts.iter().map(ShiftDefinition::summary).collect());

        Ok(outcome)
    }

    /// Records an attendance event against a shift named by the caller.
    #[instrument(skip(self, command), fields(employee_id = command.employee_id))]
    pub async fn record_attendance_with_shift(
        &self,
        command: RecordAttendance,
        shift_id: u64,
    ) -> Result<AttendanceOutcome, AttendanceError> {
        let shift = self
            .catalog
            .get_assignment(command.employee_id, shift_id)
            .await
            .map_err(|e| {
                error!(error = %e, shift_id, "Failed to load shift assignment");
                AttendanceError::from(e)
            })?
            .filter(ShiftDefinition::is_active)
            .ok_or_else(|| {
                warn!(shift_id, "Shift not assigned to employee or inactive");
                AttendanceError::ShiftNotAssignedOrInactive
            })?;

        self.persist(command, &shift, MatchRule::Manual).await
    }

    async fn persist(
        &self,
        command: RecordAttendance,
        shift: &ShiftDefinition,
        rule: MatchRule,
    ) -> Result<AttendanceOutcome, AttendanceError> {
        let classification = classify(shift, rule, command.in_time, command.out_time, &self.policy);
        let status = classification.status;

        let record = NewAttendanceRecord {
            employee_id: command.employee_id,
            fingerprint_id: command.fingerprint_id,
            in_time: command.in_time,
            out_time: command.out_time,
            in_user: command.flags.in_user,
            out_user: command.flags.out_user,
            in_approval: command.flags.in_approval,
            out_approval: command.flags.out_approval,
            shift: command
                .shift_label
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| shift.shift_type.clone()),
            attendance_status: status,
        };

        let id = self.store.insert(record).await.map_err(|e| {
            error!(error = %e, "Failed to insert attendance record");
            AttendanceError::from(e)
        })?;

        info!(record_id = id, shift_id = shift.shift_id, %status, "Attendance recorded");

        Ok(AttendanceOutcome {
            id,
            attendance_status: status,
            selected_shift: shift.summary(),
            all_employee_shifts: None,
            timing_analysis: classification.timing,
        })
    }

    /// Applies a checkout, arrival correction or status override to a record.
    #[instrument(skip(self, update))]
    pub async fn update_status(
        &self,
        record_id: u64,
        update: StatusUpdate,
    ) -> Result<StatusUpdateOutcome, AttendanceError> {
        if update.is_empty() {
            warn!("Status update carries nothing to apply");
            return Err(AttendanceError::MissingRequiredField(
                "out_time, in_time or attendance_status",
            ));
        }

        let record = self
            .store
            .find(record_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load attendance record");
                AttendanceError::from(e)
            })?
            .ok_or_else(|| {
                warn!("Attendance record not found");
                AttendanceError::RecordNotFound
            })?;

        let shifts = if update.needs_shift() {
            self.catalog
                .list_active_assignments(record.employee_id)
                .await
                .map_err(|e| {
                    error!(
                        error = %e,
                        employee_id = record.employee_id,
                        "Failed to load shift assignments"
                    );
                    AttendanceError::from(e)
                })?
        } else {
            Vec::new()
        };

        let decision = decide_status(&record, &update, shifts.first(), &self.policy);
        let patch = build_patch(&record, &update, decision);

        let affected = self.store.update(record_id, patch).await.map_err(|e| {
            error!(error = %e, "Failed to update attendance record");
            AttendanceError::from(e)
        })?;

        info!(
            status = %decision.status,
            source = ?decision.source,
            affected,
            "Attendance status updated"
        );

        Ok(StatusUpdateOutcome {
            attendance_status: decision.status,
            affected: affected > 0,
        })
    }

    /// Stores supervisor-corrected times next to the originals; status is untouched.
    #[instrument(skip(self))]
    pub async fn update_edit_times(
        &self,
        record_id: u64,
        edit_in_time: Option<NaiveDateTime>,
        edit_out_time: Option<NaiveDateTime>,
    ) -> Result<(), AttendanceError> {
        if edit_in_time.is_none() && edit_out_time.is_none() {
            warn!("Edit times update carries neither time");
            return Err(AttendanceError::MissingRequiredField(
                "edit_in_time or edit_out_time",
            ));
        }

        let affected = self
            .store
            .update_edit_times(record_id, edit_in_time, edit_out_time)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to store edit times");
                AttendanceError::from(e)
            })?;

        if affected == 0 {
            warn!("Attendance record not found");
            return Err(AttendanceError::RecordNotFound);
        }

        info!("Edit times updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_approval(
        &self,
        record_id: u64,
        in_approval: bool,
        out_approval: bool,
    ) -> Result<(), AttendanceError> {
        let affected = self
            .store
            .update_approval(record_id, in_approval, out_approval)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to update approval flags");
                AttendanceError::from(e)
            })?;

        if affected == 0 {
            warn!("Attendance record not found");
            return Err(AttendanceError::RecordNotFound);
        }

        info!("Approval flags updated");
        Ok(())
    }
}
