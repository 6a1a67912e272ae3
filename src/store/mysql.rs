use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlPool, Row};
use tracing::debug;

use crate::model::attendance::{AttendancePatch, AttendanceRecord, NewAttendanceRecord};
use crate::model::shift::ShiftDefinition;
use crate::store::{AttendanceStore, ShiftCatalog};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

const ATTENDANCE_TABLE: &str = "hr_attendance";

const ACTIVE_ASSIGNMENTS_SQL: &str = r#"
    SELECT
        s.id AS shift_id,
        s.ShiftType,
        s.StartTime,
        s.EndTime,
        s.MaxArrivalDelay,
        s.LatestLeave,
        s.OTStartHours,
        s.Status AS shift_status
    FROM hr_employeeShift es
    INNER JOIN hr_shift s ON es.shift_id = s.id
    WHERE es.employee_id = ? AND s.Status = 'active'
    ORDER BY s.StartTime ASC
"#;

const ASSIGNMENT_SQL: &str = r#"
    SELECT
        s.id AS shift_id,
        s.ShiftType,
        s.StartTime,
        s.EndTime,
        s.MaxArrivalDelay,
        s.LatestLeave,
        s.OTStartHours,
        s.Status AS shift_status
    FROM hr_employeeShift es
    INNER JOIN hr_shift s ON es.shift_id = s.id
    WHERE es.employee_id = ? AND s.id = ? AND s.Status = 'active'
    LIMIT 1
"#;

const INSERT_ATTENDANCE_SQL: &str = r#"
    INSERT INTO hr_attendance (
        EmpID, FingerprintID, InTime, OutTime, InUser, OutUser,
        InApproval, OutApproval, Shift, attendance_status
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const FIND_ATTENDANCE_SQL: &str = r#"
    SELECT
        ID, EmpID, FingerprintID, InTime, OutTime, InUser, OutUser,
        InApproval, OutApproval, Shift, attendance_status, EditInTime, EditOutTime
    FROM hr_attendance
    WHERE ID = ?
"#;

const UPDATE_APPROVAL_SQL: &str = r#"
    UPDATE hr_attendance
    SET InApproval = ?, OutApproval = ?
    WHERE ID = ?
"#;

fn decode_error(column: &str, source: strum::ParseError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, MySqlRow> for ShiftDefinition {
    fn from_row(row: &'r MySqlRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("shift_status")?;

        Ok(Self {
            shift_id: row.try_get("shift_id")?,
            shift_type: row.try_get("ShiftType")?,
            start_time: row.try_get("StartTime")?,
            end_time: row.try_get("EndTime")?,
            max_arrival_delay: row
                .try_get::<Option<i32>, _>("MaxArrivalDelay")?
                .unwrap_or(0),
            latest_leave: row.try_get("LatestLeave")?,
            ot_start_hours: row.try_get("OTStartHours")?,
            status: status
                .to_lowercase()
                .parse()
                .map_err(|e| decode_error("shift_status", e))?,
        })
    }
}

impl<'r> FromRow<'r, MySqlRow> for AttendanceRecord {
    fn from_row(row: &'r MySqlRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("attendance_status")?;

        Ok(Self {
            id: row.try_get("ID")?,
            employee_id: row.try_get("EmpID")?,
            fingerprint_id: row.try_get("FingerprintID")?,
            in_time: row.try_get("InTime")?,
            out_time: row.try_get("OutTime")?,
            in_user: row.try_get("InUser")?,
            out_user: row.try_get("OutUser")?,
            in_approval: row.try_get("InApproval")?,
            out_approval: row.try_get("OutApproval")?,
            shift: row.try_get("Shift")?,
            attendance_status: status
                .parse()
                .map_err(|e| decode_error("attendance_status", e))?,
            edit_in_time: row.try_get("EditInTime")?,
            edit_out_time: row.try_get("EditOutTime")?,
        })
    }
}

/// Shift catalog backed by `hr_shift` and `hr_employeeShift`.
#[derive(Debug, Clone)]
pub struct MySqlShiftCatalog {
    pool: MySqlPool,
}

impl MySqlShiftCatalog {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftCatalog for MySqlShiftCatalog {
    async fn list_active_assignments(
        &self,
        employee_id: u64,
    ) -> Result<Vec<ShiftDefinition>, sqlx::Error> {
        sqlx::query_as::<_, ShiftDefinition>(ACTIVE_ASSIGNMENTS_SQL)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_assignment(
        &self,
        employee_id: u64,
        shift_id: u64,
    ) -> Result<Option<ShiftDefinition>, sqlx::Error> {
        sqlx::query_as::<_, ShiftDefinition>(ASSIGNMENT_SQL)
            .bind(employee_id)
            .bind(shift_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn insert(&self, record: NewAttendanceRecord) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(INSERT_ATTENDANCE_SQL)
            .bind(record.employee_id)
            .bind(record.fingerprint_id)
            .bind(record.in_time)
            .bind(record.out_time)
            .bind(record.in_user)
            .bind(record.out_user)
            .bind(record.in_approval)
            .bind(record.out_approval)
            .bind(record.shift)
            .bind(record.attendance_status.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_id())
    }

    async fn find(&self, id: u64) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(FIND_ATTENDANCE_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update(&self, id: u64, patch: AttendancePatch) -> Result<u64, sqlx::Error> {
        let mut columns = Vec::new();

        if let Some(out_time) = patch.out_time {
            columns.push(("OutTime", SqlValue::DateTime(out_time)));
        }
        if let Some(out_user) = patch.out_user {
            columns.push(("OutUser", SqlValue::Bool(out_user)));
        }
        if let Some(out_approval) = patch.out_approval {
            columns.push(("OutApproval", SqlValue::Bool(out_approval)));
        }
        if let Some(in_time) = patch.in_time {
            columns.push(("InTime", SqlValue::DateTime(in_time)));
        }
        if let Some(status) = patch.attendance_status {
            columns.push(("attendance_status", SqlValue::String(status.to_string())));
        }

        match build_update_sql(ATTENDANCE_TABLE, columns, "ID", id) {
            Some(update) => {
                debug!(sql = %update.sql, record_id = id, "Updating attendance record");
                execute_update(&self.pool, update).await
            }
            None => Ok(0),
        }
    }

    async fn update_edit_times(
        &self,
        id: u64,
        edit_in_time: Option<NaiveDateTime>,
        edit_out_time: Option<NaiveDateTime>,
    ) -> Result<u64, sqlx::Error> {
        let mut columns = Vec::new();

        if let Some(edit_in_time) = edit_in_time {
            columns.push(("EditInTime", SqlValue::DateTime(edit_in_time)));
        }
        if let Some(edit_out_time) = edit_out_time {
            columns.push(("EditOutTime", SqlValue::DateTime(edit_out_time)));
        }

        match build_update_sql(ATTENDANCE_TABLE, columns, "ID", id) {
            Some(update) => execute_update(&self.pool, update).await,
            None => Ok(0),
        }
    }

    async fn update_approval(
        &self,
        id: u64,
        in_approval: bool,
        out_approval: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(UPDATE_APPROVAL_SQL)
            .bind(in_approval)
            .bind(out_approval)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
