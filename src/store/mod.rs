//! Collaborators the attendance engine reads from and writes to.

pub mod mysql;

use async_trait::async_trait;
use chrono::NaiveDateTime;
#[cfg(test)]
use mockall::automock;

use crate::model::attendance::{AttendancePatch, AttendanceRecord, NewAttendanceRecord};
use crate::model::shift::ShiftDefinition;

pub use mysql::{MySqlAttendanceStore, MySqlShiftCatalog};

/// Read-only view of the shifts each employee is assigned to.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ShiftCatalog: Send + Sync {
    /// Active shifts assigned to the employee, ordered by start time.
    async fn list_active_assignments(
        &self,
        employee_id: u64,
    ) -> Result<Vec<ShiftDefinition>, sqlx::Error>;

    /// The shift, when the employee holds an active assignment to it.
    async fn get_assignment(
        &self,
        employee_id: u64,
        shift_id: u64,
    ) -> Result<Option<ShiftDefinition>, sqlx::Error>;
}

/// Attendance record persistence. Every write is a single statement.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Inserts a classified record and returns its id.
    async fn insert(&self, record: NewAttendanceRecord) -> Result<u64, sqlx::Error>;

    async fn find(&self, id: u64) -> Result<Option<AttendanceRecord>, sqlx::Error>;

    /// Returns the number of rows affected.
    async fn update(&self, id: u64, patch: AttendancePatch) -> Result<u64, sqlx::Error>;

    /// Writes only the supplied correction columns; returns rows affected.
    async fn update_edit_times(
        &self,
        id: u64,
        edit_in_time: Option<NaiveDateTime>,
        edit_out_time: Option<NaiveDateTime>,
    ) -> Result<u64, sqlx::Error>;

    async fn update_approval(
        &self,
        id: u64,
        in_approval: bool,
        out_approval: bool,
    ) -> Result<u64, sqlx::Error>;
}
