//! Dashboard endpoints.
//!
//! - `GET /api/dashboard/patient?patient_id=`: one collapsed patient view
//! - `GET /api/dashboard/doctor?doctor_id=`: the doctor's patients
//! - `GET /api/dashboard/nurse?nurse_id=`: the nurse's patients, annotated with the nurse

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard::{SubjectId, SubjectKind};
use crate::models::{DashboardView, PatientList};

#[derive(Deserialize)]
pub struct PatientParams {
    pub patient_id: Option<String>,
}

#[derive(Deserialize)]
pub struct DoctorParams {
    pub doctor_id: Option<String>,
}

#[derive(Deserialize)]
pub struct NurseParams {
    pub nurse_id: Option<String>,
}

/// Identifiers arrive as raw strings so a bad value gets our own error body.
fn required_id(kind: SubjectKind, raw: Option<String>) -> Result<SubjectId, ApiError> {
    let raw = raw
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParameter(kind.id_param()))?;
    Ok(SubjectId::parse(kind, &raw)?)
}

/// `GET /api/dashboard/patient`
pub async fn patient(
    State(ctx): State<ApiContext>,
    params: Result<Query<PatientParams>, QueryRejection>,
) -> Result<Json<DashboardView>, ApiError> {
    let Query(params) = params?;
    let patient_id = required_id(SubjectKind::Patient, params.patient_id)?;
    let view = ctx
        .with_dashboards(move |service| service.patient_dashboard(patient_id))
        .await?;
    Ok(Json(view))
}

/// `GET /api/dashboard/doctor`
pub async fn doctor(
    State(ctx): State<ApiContext>,
    params: Result<Query<DoctorParams>, QueryRejection>,
) -> Result<Json<PatientList>, ApiError> {
    let Query(params) = params?;
    let doctor_id = required_id(SubjectKind::Doctor, params.doctor_id)?;
    let patients = ctx
        .with_dashboards(move |service| service.doctor_dashboard(doctor_id))
        .await?;
    Ok(Json(PatientList { patients }))
}

/// `GET /api/dashboard/nurse`
pub async fn nurse(
    State(ctx): State<ApiContext>,
    params: Result<Query<NurseParams>, QueryRejection>,
) -> Result<Json<PatientList>, ApiError> {
    let Query(params) = params?;
    let nurse_id = required_id(SubjectKind::Nurse, params.nurse_id)?;
    let patients = ctx
        .with_dashboards(move |service| service.nurse_dashboard(nurse_id))
        .await?;
    Ok(Json(PatientList { patients }))
}
