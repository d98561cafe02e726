//! Row Source: runs the dashboard join for one query mode and streams
//! the flat rows to a sink in the order the storage engine yields them.

use std::fmt;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::{FlatDashboardRow, NurseAnnotation, SubjectAttributes, VitalSnapshot};

use super::error::DashboardError;

/// Columns shared by both dashboard views.
macro_rules! patient_columns {
    () => {
        "patient_id, first_name, last_name, age, sex, blood_type, phone_number, address, dob,
         assigned_doctor_id, body_temperature, pulse_rate, respiration_rate,
         systolic_pressure, diastolic_pressure, medication_name, disease_name"
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Patient,
    Doctor,
    Nurse,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::Patient => "patient",
            SubjectKind::Doctor => "doctor",
            SubjectKind::Nurse => "nurse",
        }
    }

    /// Name of the request parameter carrying this subject's identifier.
    pub fn id_param(self) -> &'static str {
        match self {
            SubjectKind::Patient => "patient_id",
            SubjectKind::Doctor => "doctor_id",
            SubjectKind::Nurse => "nurse_id",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, strictly positive subject identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId(i64);

impl SubjectId {
    pub fn new(kind: SubjectKind, raw: i64) -> Result<Self, DashboardError> {
        if raw <= 0 {
            return Err(DashboardError::InvalidIdentifier {
                field: kind.id_param(),
                value: raw.to_string(),
            });
        }
        Ok(Self(raw))
    }

    /// Parse an identifier as received from a caller (query string, CLI).
    pub fn parse(kind: SubjectKind, raw: &str) -> Result<Self, DashboardError> {
        let value = raw
            .parse::<i64>()
            .map_err(|_| DashboardError::InvalidIdentifier {
                field: kind.id_param(),
                value: raw.to_string(),
            })?;
        Self::new(kind, value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query mode understood by a [`RowSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardQuery {
    ByPatient(SubjectId),
    ByDoctor(SubjectId),
    ByNurse(SubjectId),
    /// Identifier-less patient dashboard: at most one row, no filter.
    LegacyPatient,
}

impl DashboardQuery {
    pub fn subject_kind(&self) -> SubjectKind {
        match self {
            DashboardQuery::ByPatient(_) | DashboardQuery::LegacyPatient => SubjectKind::Patient,
            DashboardQuery::ByDoctor(_) => SubjectKind::Doctor,
            DashboardQuery::ByNurse(_) => SubjectKind::Nurse,
        }
    }

    pub fn subject_id(&self) -> Option<SubjectId> {
        match self {
            DashboardQuery::ByPatient(id)
            | DashboardQuery::ByDoctor(id)
            | DashboardQuery::ByNurse(id) => Some(*id),
            DashboardQuery::LegacyPatient => None,
        }
    }

    fn includes_nurse(&self) -> bool {
        matches!(self, DashboardQuery::ByNurse(_))
    }

    fn sql(&self) -> &'static str {
        match self {
            DashboardQuery::ByPatient(_) => concat!(
                "SELECT ", patient_columns!(), " FROM patient_dashboard_view
                 WHERE patient_id = ?1
                 ORDER BY patient_id, medication_name, disease_name"
            ),
            DashboardQuery::ByDoctor(_) => concat!(
                "SELECT ", patient_columns!(), " FROM patient_dashboard_view
                 WHERE assigned_doctor_id = ?1
                 ORDER BY patient_id, medication_name, disease_name"
            ),
            DashboardQuery::ByNurse(_) => concat!(
                "SELECT nurse_id, nurse_first_name, nurse_last_name, ", patient_columns!(),
                " FROM nurse_dashboard_view
                 WHERE nurse_id = ?1
                 ORDER BY patient_id, medication_name, disease_name"
            ),
            DashboardQuery::LegacyPatient => concat!(
                "SELECT ", patient_columns!(), " FROM patient_dashboard_view
                 ORDER BY patient_id, medication_name, disease_name
                 LIMIT 1"
            ),
        }
    }
}

impl fmt::Display for DashboardQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject_id() {
            Some(id) => write!(f, "{} {id}", self.subject_kind()),
            None => f.write_str("legacy patient"),
        }
    }
}

/// Produces the flat dashboard rows for a query.
///
/// Rows are handed to `sink` one at a time; the source makes no promise
/// that rows of the same subject are contiguous. Storage failures are
/// returned unchanged and never retried.
pub trait RowSource {
    fn for_each_row(
        &self,
        query: &DashboardQuery,
        sink: &mut dyn FnMut(FlatDashboardRow),
    ) -> Result<(), DatabaseError>;
}

impl<T: RowSource + ?Sized> RowSource for &T {
    fn for_each_row(
        &self,
        query: &DashboardQuery,
        sink: &mut dyn FnMut(FlatDashboardRow),
    ) -> Result<(), DatabaseError> {
        (**self).for_each_row(query, sink)
    }
}

/// Row source backed by the SQLite dashboard views.
pub struct SqliteRowSource<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRowSource<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl RowSource for SqliteRowSource<'_> {
    fn for_each_row(
        &self,
        query: &DashboardQuery,
        sink: &mut dyn FnMut(FlatDashboardRow),
    ) -> Result<(), DatabaseError> {
        let mut stmt = self.conn.prepare(query.sql())?;
        let mut rows = match query.subject_id() {
            Some(id) => stmt.query(params![id.get()])?,
            None => stmt.query([])?,
        };

        let with_nurse = query.includes_nurse();
        while let Some(row) = rows.next()? {
            sink(flat_row_from_sqlite(row, with_nurse)?);
        }
        Ok(())
    }
}

fn flat_row_from_sqlite(row: &Row<'_>, with_nurse: bool) -> rusqlite::Result<FlatDashboardRow> {
    let nurse = if with_nurse {
        Some(NurseAnnotation {
            nurse_id: row.get("nurse_id")?,
            nurse_first_name: row.get("nurse_first_name")?,
            nurse_last_name: row.get("nurse_last_name")?,
        })
    } else {
        None
    };

    Ok(FlatDashboardRow {
        subject_id: row.get("patient_id")?,
        attributes: SubjectAttributes {
            nurse,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            age: row.get("age")?,
            sex: row.get("sex")?,
            blood_type: row.get("blood_type")?,
            phone_number: row.get("phone_number")?,
            address: row.get("address")?,
            dob: row.get::<_, NaiveDate>("dob")?,
            assigned_doctor_id: row.get("assigned_doctor_id")?,
            vitals: VitalSnapshot {
                body_temperature: row.get("body_temperature")?,
                pulse_rate: row.get("pulse_rate")?,
                respiration_rate: row.get("respiration_rate")?,
                systolic_pressure: row.get("systolic_pressure")?,
                diastolic_pressure: row.get("diastolic_pressure")?,
            },
        },
        medication_name: row.get("medication_name")?,
        disease_name: row.get("disease_name")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_rejects_zero_and_negative() {
        assert!(SubjectId::new(SubjectKind::Patient, 1).is_ok());
        for raw in [0, -4] {
            let err = SubjectId::new(SubjectKind::Doctor, raw).unwrap_err();
            match err {
                DashboardError::InvalidIdentifier { field, .. } => assert_eq!(field, "doctor_id"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn subject_id_parse_rejects_non_numeric() {
        assert_eq!(SubjectId::parse(SubjectKind::Nurse, "42").unwrap().get(), 42);
        for raw in ["", "abc", "4.5", "-1", "0", " 42", "42 "] {
            let err = SubjectId::parse(SubjectKind::Nurse, raw).unwrap_err();
            assert_eq!(err.code(), "INVALID_IDENTIFIER", "input {raw:?}");
        }
    }

    #[test]
    fn query_kind_and_display() {
        let id = SubjectId::new(SubjectKind::Doctor, 5).unwrap();
        let query = DashboardQuery::ByDoctor(id);
        assert_eq!(query.subject_kind(), SubjectKind::Doctor);
        assert_eq!(query.to_string(), "doctor 5");
        assert_eq!(DashboardQuery::LegacyPatient.subject_id(), None);
        assert_eq!(DashboardQuery::LegacyPatient.to_string(), "legacy patient");
    }

    #[test]
    fn only_nurse_query_selects_nurse_columns() {
        let id = SubjectId::new(SubjectKind::Nurse, 1).unwrap();
        assert!(DashboardQuery::ByNurse(id).sql().contains("nurse_first_name"));
        assert!(!DashboardQuery::ByPatient(id).sql().contains("nurse_"));
        let legacy = DashboardQuery::LegacyPatient.sql();
        assert!(legacy.contains("ORDER BY patient_id, medication_name, disease_name"));
        assert!(legacy.ends_with("LIMIT 1"));
    }
}
