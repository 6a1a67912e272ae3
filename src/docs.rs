use crate::api::attendance::{
    ApprovalRequest, AttendanceRequest, EditTimesRequest, StatusUpdateRequest,
};
use crate::model::attendance::{
    AttendanceOutcome, AttendanceStatus, StatusUpdateOutcome, TimingAnalysis,
};
use crate::model::shift::ShiftSummary;
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance shift matching and status classification

Records clock-in/clock-out events against an employee's assigned shifts.

### 🔹 Key Features
- **Shift matching**
  - Picks the shift an arrival belongs to, or uses an explicitly chosen one
- **Status classification**
  - Present, Late, Absent or Half Day from arrival delay and early departure
- **Corrections**
  - Checkout, status overrides, supervisor edit times and approvals

### 📦 Response Format
- JSON-based RESTful responses
- Every recorded event returns its timing analysis

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::add_attendance,
        crate::api::attendance::add_attendance_with_shift,
        crate::api::attendance::update_status,
        crate::api::attendance::update_edit_times,
        crate::api::attendance::update_approval
    ),
    components(
        schemas(
            AttendanceRequest,
            StatusUpdateRequest,
            EditTimesRequest,
            ApprovalRequest,
            AttendanceOutcome,
            AttendanceStatus,
            StatusUpdateOutcome,
            TimingAnalysis,
            ShiftSummary
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance recording and correction APIs"),
    )
)]
pub struct ApiDoc;
