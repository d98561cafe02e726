//! Dashboard records: the flat rows produced by the dashboard views and the
//! nested per-patient views handed to the response serializer.

use chrono::NaiveDate;
use serde::Serialize;

use super::vital_sign::VitalSnapshot;

/// Nurse fields carried by nurse-dashboard rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NurseAnnotation {
    pub nurse_id: i64,
    pub nurse_first_name: String,
    pub nurse_last_name: String,
}

/// Scalar attributes of a dashboard subject. Identical across every row
/// of the same subject when the upstream join is consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAttributes {
    #[serde(flatten)]
    pub nurse: Option<NurseAnnotation>,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub sex: String,
    pub blood_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub dob: NaiveDate,
    pub assigned_doctor_id: i64,
    #[serde(flatten)]
    pub vitals: VitalSnapshot,
}

/// One denormalized row of a dashboard join: a subject with at most one
/// medication name and one disease name.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDashboardRow {
    pub subject_id: i64,
    pub attributes: SubjectAttributes,
    pub medication_name: Option<String>,
    pub disease_name: Option<String>,
}

/// `{ "name": ... }` entry of the nested medication and disease lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedEntry {
    pub name: String,
}

impl NamedEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Collapsed dashboard record: one per patient, with deduplicated
/// medication and disease lists in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub patient_id: i64,
    #[serde(flatten)]
    pub attributes: SubjectAttributes,
    pub medications: Vec<NamedEntry>,
    pub diseases: Vec<NamedEntry>,
}

impl DashboardView {
    pub fn medication_names(&self) -> Vec<&str> {
        self.medications.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn disease_names(&self) -> Vec<&str> {
        self.diseases.iter().map(|d| d.name.as_str()).collect()
    }
}

/// Body of the doctor and nurse dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct PatientList {
    pub patients: Vec<DashboardView>,
}
