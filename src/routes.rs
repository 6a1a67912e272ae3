use crate::{api::attendance, config::Config};
use actix_governor::{Governor, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::web;
use tracing::warn;

/// Attendance endpoints, relative to the `/attendance` scope.
pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // /attendance
        .service(web::resource("").route(web::post().to(attendance::add_attendance)))
        // /attendance/with-shift
        .service(
            web::resource("/with-shift")
                .route(web::post().to(attendance::add_attendance_with_shift)),
        )
        // /attendance/{id}/status
        .service(
            web::resource("/{id}/status").route(web::put().to(attendance::update_status)),
        )
        // /attendance/{id}/edit-times
        .service(
            web::resource("/{id}/edit-times")
                .route(web::put().to(attendance::update_edit_times)),
        )
        // /attendance/{id}/approval
        .service(
            web::resource("/{id}/approval").route(web::put().to(attendance::update_approval)),
        );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let requests_per_min = config.rate_protected_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let limiter = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish();

    let scope = web::scope(&config.api_prefix);

    match limiter {
        Some(limiter) => {
            cfg.service(
                scope
                    .wrap(Governor::new(&limiter)) // rate limiting
                    .service(web::scope("/attendance").configure(attendance_routes)),
            );
        }
        None => {
            warn!(requests_per_min, "Invalid rate limit, serving without limiter");
            cfg.service(scope.service(web::scope("/attendance").configure(attendance_routes)));
        }
    }
}
