//! Patient, doctor and nurse dashboards.
//!
//! A dashboard query joins a patient's record against its medications and
//! diseases, so the row source yields one row per
//! (patient × medication × disease). The aggregator folds that stream back
//! into one [`DashboardView`](crate::models::DashboardView) per patient:
//!
//! - medication and disease names are deduplicated, first-seen order;
//! - scalar attributes come from the first row of each patient;
//! - patients are listed in the order they first appear in the stream.
//!
//! The dashboard views use inner joins. A patient without any medication,
//! disease or vital-sign record is absent from the row stream and is
//! therefore omitted from every dashboard.

mod aggregate;
mod error;
mod service;
mod source;

pub use aggregate::*;
pub use error::*;
pub use service::*;
pub use source::*;

// ── Tests ──────────────────────────────────────────────────────────────────
