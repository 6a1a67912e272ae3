use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::engine::lifecycle::StatusUpdate;
use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceOutcome, AttendanceStatus, StatusUpdateOutcome};
use crate::service::attendance::{AttendanceService, CaptureFlags, RecordAttendance};
use crate::utils::timestamp::{self, Timestamp};

/// Clock-in payload. Required fields are checked before any shift lookup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    #[schema(example = 7)]
    pub employee_id: Option<u64>,

    #[schema(example = "FP-0007")]
    pub fingerprint_id: Option<String>,

    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    #[schema(example = "2025-03-10T09:10:00+06:00", value_type = Option<String>, format = "date-time")]
    pub in_time: Option<Timestamp>,

    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    #[schema(example = "2025-03-10T17:05:00+06:00", value_type = Option<String>, format = "date-time")]
    pub out_time: Option<Timestamp>,

    /// Required for `/attendance/with-shift`, ignored otherwise.
    #[schema(example = 2)]
    pub shift_id: Option<u64>,

    /// Label stored instead of the matched shift's type
    #[schema(example = "Morning")]
    pub shift: Option<String>,

    pub in_user: Option<bool>,
    pub out_user: Option<bool>,
    pub in_approval: Option<bool>,
    pub out_approval: Option<bool>,
}

impl AttendanceRequest {
    fn into_command(self, service: &AttendanceService) -> Result<RecordAttendance, AttendanceError> {
        let employee_id = self
            .employee_id
            .filter(|id| *id != 0)
            .ok_or(AttendanceError::MissingRequiredField("employee_id"))?;
        let fingerprint_id = self
            .fingerprint_id
            .filter(|fp| !fp.trim().is_empty())
            .ok_or(AttendanceError::MissingRequiredField("fingerprint_id"))?;
        let in_time = self
            .in_time
            .map(|ts| service.wall_clock(ts))
            .ok_or(AttendanceError::MissingRequiredField("in_time"))?;

        let defaults = CaptureFlags::default();

        Ok(RecordAttendance {
            employee_id,
            fingerprint_id,
            in_time,
            out_time: self.out_time.map(|ts| service.wall_clock(ts)),
            shift_label: self.shift,
            flags: CaptureFlags {
                in_user: self.in_user.unwrap_or(defaults.in_user),
                out_user: self.out_user.unwrap_or(defaults.out_user),
                in_approval: self.in_approval.unwrap_or(defaults.in_approval),
                out_approval: self.out_approval.unwrap_or(defaults.out_approval),
            },
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    #[schema(example = "2025-03-10T15:30:00+06:00", value_type = Option<String>, format = "date-time")]
    pub out_time: Option<Timestamp>,

    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub in_time: Option<Timestamp>,

    /// When present it is stored as given and nothing is recomputed
    pub attendance_status: Option<AttendanceStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditTimesRequest {
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    #[schema(example = "2025-03-10T09:00:00+06:00", value_type = Option<String>, format = "date-time")]
    pub edit_in_time: Option<Timestamp>,

    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    #[schema(example = "2025-03-10T17:00:00+06:00", value_type = Option<String>, format = "date-time")]
    pub edit_out_time: Option<Timestamp>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalRequest {
    #[schema(example = true)]
    pub in_approval: bool,
    #[schema(example = false)]
    pub out_approval: bool,
}

/// Record attendance, matching the shift from the arrival time
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceOutcome),
        (status = 400, description = "Missing field or no shift assigned", body = Object, example = json!({
            "message": "Employee shift information not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn add_attendance(
    service: web::Data<AttendanceService>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    let command = payload
        .into_inner()
        .into_command(&service)
        .inspect_err(|e| warn!(error = %e, "Rejected attendance request"))?;
    let outcome = service.record_attendance(command).await?;

    Ok(HttpResponse::Created().json(outcome))
}

/// Record attendance against an explicitly chosen shift
#[utoipa::path(
    post,
    path = "/api/attendance/with-shift",
    request_body = AttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded with the specified shift", body = AttendanceOutcome),
        (status = 400, description = "Missing field, or shift not assigned / inactive", body = Object, example = json!({
            "message": "Employee is not assigned to the specified shift or shift is inactive"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn add_attendance_with_shift(
    service: web::Data<AttendanceService>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    let request = payload.into_inner();
    let parsed = match request.shift_id.filter(|id| *id != 0) {
        Some(shift_id) => request
            .into_command(&service)
            .map(|command| (shift_id, command)),
        None => Err(AttendanceError::MissingRequiredField("shift_id")),
    };
    let (shift_id, command) =
        parsed.inspect_err(|e| warn!(error = %e, "Rejected attendance request"))?;

    let outcome = service.record_attendance_with_shift(command, shift_id).await?;

    Ok(HttpResponse::Created().json(outcome))
}

/// Check out or correct an attendance record
#[utoipa::path(
    put,
    path = "/api/attendance/{attendance_id}/status",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Attendance record updated", body = StatusUpdateOutcome),
        (status = 400, description = "Nothing to update"),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_status(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    payload: web::Json<StatusUpdateRequest>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();
    let request = payload.into_inner();

    let outcome = service
        .update_status(
            record_id,
            StatusUpdate {
                in_time: request.in_time.map(|ts| service.wall_clock(ts)),
                out_time: request.out_time.map(|ts| service.wall_clock(ts)),
                attendance_status: request.attendance_status,
            },
        )
        .await?;

    if !outcome.affected {
        warn!(record_id, "Status update matched no rows");
        return Err(AttendanceError::RecordNotFound.into());
    }

    Ok(HttpResponse::Ok().json(outcome))
}

/// Store supervisor-corrected in/out times
#[utoipa::path(
    put,
    path = "/api/attendance/{attendance_id}/edit-times",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    request_body = EditTimesRequest,
    responses(
        (status = 200, description = "Edit times updated", body = Object, example = json!({
            "message": "Edit times updated successfully"
        })),
        (status = 400, description = "Neither edit time supplied"),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_edit_times(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    payload: web::Json<EditTimesRequest>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    service
        .update_edit_times(
            record_id,
            payload.edit_in_time.map(|ts| service.wall_clock(ts)),
            payload.edit_out_time.map(|ts| service.wall_clock(ts)),
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Edit times updated successfully"
    })))
}

/// Approve or reject the in/out punches of a record
#[utoipa::path(
    put,
    path = "/api/attendance/{attendance_id}/approval",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Approval status updated", body = Object, example = json!({
            "message": "Approval status updated successfully"
        })),
        (status = 404, description = "Attendance record not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_approval(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    payload: web::Json<ApprovalRequest>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    service
        .update_approval(record_id, payload.in_approval, payload.out_approval)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Approval status updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use chrono::FixedOffset;
    use mockall::predicate::eq;
    use serde_json::{Value, json};

    use crate::engine::AttendancePolicy;
    use crate::engine::window::tests::{at, shift};
    use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::routes::attendance_routes;
    use crate::service::attendance::AttendanceService;
    use crate::store::{MockAttendanceStore, MockShiftCatalog};

    fn service(catalog: MockShiftCatalog, store: MockAttendanceStore) -> web::Data<AttendanceService> {
        web::Data::new(AttendanceService::new(
            Arc::new(catalog),
            Arc::new(store),
            AttendancePolicy::default(),
        )
        .with_utc_offset(FixedOffset::east_opt(6 * 3600).unwrap()))
    }

    #[actix_web::test]
    async fn post_attendance_returns_created_with_timing() {
        let mut catalog = MockShiftCatalog::new();
        catalog
            .expect_list_active_assignments()
            .returning(|_| Ok(vec![shift(1, (9, 0), (17, 0), 15)]));
        let mut store = MockAttendanceStore::new();
        store.expect_insert().returning(|_| Ok(12));

        let app = test::init_service(
            App::new()
                .app_data(service(catalog, store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance")
            .set_json(json!({
                "employee_id": 7,
                "fingerprint_id": "FP-7",
                "in_time": "2025-03-10T09:40:00+06:00"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 12);
        assert_eq!(body["attendance_status"], "Late");
        assert_eq!(body["timing_analysis"]["delay_minutes"], 40);
        assert_eq!(body["timing_analysis"]["expected_arrival"], "09:00:00");
    }

    #[actix_web::test]
    async fn post_attendance_without_in_time_is_bad_request() {
        let mut catalog = MockShiftCatalog::new();
        catalog.expect_list_active_assignments().never();

        let app = test::init_service(
            App::new()
                .app_data(service(catalog, MockAttendanceStore::new()))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance")
            .set_json(json!({ "employee_id": 7, "fingerprint_id": "FP-7" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "in_time is required");
    }

    #[actix_web::test]
    async fn with_shift_requires_shift_id() {
        let app = test::init_service(
            App::new()
                .app_data(service(MockShiftCatalog::new(), MockAttendanceStore::new()))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/with-shift")
            .set_json(json!({
                "employee_id": 7,
                "fingerprint_id": "FP-7",
                "in_time": "2025-03-10 09:00:00"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn with_unassigned_shift_is_bad_request() {
        let mut catalog = MockShiftCatalog::new();
        catalog.expect_get_assignment().returning(|_, _| Ok(None));

        let app = test::init_service(
            App::new()
                .app_data(service(catalog, MockAttendanceStore::new()))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/with-shift")
            .set_json(json!({
                "employee_id": 7,
                "fingerprint_id": "FP-7",
                "in_time": "2025-03-10 09:00:00",
                "shift_id": 5
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn status_update_with_no_rows_affected_is_not_found() {
        let mut store = MockAttendanceStore::new();
        store.expect_find().returning(|_| {
            Ok(Some(AttendanceRecord {
                id: 3,
                employee_id: 7,
                fingerprint_id: "FP-7".to_string(),
                in_time: at(10, 9, 0),
                out_time: None,
                in_user: true,
                out_user: false,
                in_approval: true,
                out_approval: false,
                shift: "Shift 1".to_string(),
                attendance_status: AttendanceStatus::Present,
                edit_in_time: None,
                edit_out_time: None,
            }))
        });
        store.expect_update().returning(|_, _| Ok(0));

        let app = test::init_service(
            App::new()
                .app_data(service(MockShiftCatalog::new(), store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/attendance/3/status")
            .set_json(json!({ "attendance_status": "Half Day" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn edit_times_returns_ok() {
        let mut store = MockAttendanceStore::new();
        store.expect_update_edit_times().returning(|_, _, _| Ok(1));

        let app = test::init_service(
            App::new()
                .app_data(service(MockShiftCatalog::new(), store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/attendance/3/edit-times")
            .set_json(json!({ "edit_out_time": "2025-03-10T17:00:00" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn utc_and_company_offsets_classify_alike() {
        let mut catalog = MockShiftCatalog::new();
        catalog
            .expect_list_active_assignments()
            .returning(|_| Ok(vec![shift(1, (9, 0), (17, 0), 15)]));
        let mut store = MockAttendanceStore::new();
        store
            .expect_insert()
            .withf(|record| record.in_time == at(10, 9, 40))
            .times(2)
            .returning(|_| Ok(12));

        let app = test::init_service(
            App::new()
                .app_data(service(catalog, store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        for in_time in ["2025-03-10T03:40:00Z", "2025-03-10T09:40:00+06:00"] {
            let req = test::TestRequest::post()
                .uri("/attendance")
                .set_json(json!({
                    "employee_id": 7,
                    "fingerprint_id": "FP-7",
                    "in_time": in_time
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["attendance_status"], "Late", "{in_time}");
            assert_eq!(body["timing_analysis"]["actual_arrival"], "09:40:00", "{in_time}");
        }
    }

    #[actix_web::test]
    async fn with_shift_records_against_the_named_shift() {
        let mut catalog = MockShiftCatalog::new();
        catalog.expect_list_active_assignments().never();
        catalog
            .expect_get_assignment()
            .with(eq(7), eq(3))
            .returning(|_, _| Ok(Some(shift(3, (14, 0), (22, 0), 10))));
        let mut store = MockAttendanceStore::new();
        store
            .expect_insert()
            .withf(|record| record.shift == "Shift 3" && record.in_time == at(10, 14, 5))
            .returning(|_| Ok(21));

        let app = test::init_service(
            App::new()
                .app_data(service(catalog, store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/with-shift")
            .set_json(json!({
                "employee_id": 7,
                "fingerprint_id": "FP-7",
                "in_time": "2025-03-10 14:05:00",
                "shift_id": 3
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], 21);
        assert_eq!(body["attendance_status"], "Present");
        assert_eq!(body["selected_shift"]["shift_id"], 3);
        assert_eq!(
            body["timing_analysis"]["shift_selection_reason"],
            "Manually specified shift"
        );
        assert!(body.get("all_employee_shifts").is_none());
    }

    #[actix_web::test]
    async fn approval_returns_ok() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_update_approval()
            .with(eq(3), eq(true), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(1));

        let app = test::init_service(
            App::new()
                .app_data(service(MockShiftCatalog::new(), store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/attendance/3/approval")
            .set_json(json!({ "in_approval": true, "out_approval": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Approval status updated successfully");
    }

    #[actix_web::test]
    async fn approval_for_unknown_record_is_not_found() {
        let mut store = MockAttendanceStore::new();
        store.expect_update_approval().returning(|_, _, _| Ok(0));

        let app = test::init_service(
            App::new()
                .app_data(service(MockShiftCatalog::new(), store))
                .service(web::scope("/attendance").configure(attendance_routes)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/attendance/404/approval")
            .set_json(json!({ "in_approval": false, "out_approval": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
