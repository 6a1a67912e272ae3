//! Shift matching, status classification and the correction rules that decide
//! when a stored status is re-derived. Everything here is pure and synchronous;
//! fetching shifts and persisting records is left to `crate::service`.

pub mod classifier;
pub mod lifecycle;
pub mod matcher;
pub mod policy;
pub mod window;

pub use policy::AttendancePolicy;
