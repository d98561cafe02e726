use crate::models::DashboardView;

use super::aggregate::{AggregatedDashboards, DashboardAggregator};
use super::error::DashboardError;
use super::source::{DashboardQuery, RowSource, SubjectId};

/// Entry point for the three dashboards.
///
/// Holds only the row source; every call builds its own aggregation
/// state, so one service can serve concurrent requests.
pub struct DashboardService<S> {
    source: S,
}

impl<S: RowSource> DashboardService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Dashboard of one patient.
    pub fn patient_dashboard(&self, patient_id: SubjectId) -> Result<DashboardView, DashboardError> {
        let query = DashboardQuery::ByPatient(patient_id);
        self.single(&query)?.ok_or(DashboardError::NotFound {
            subject: query.subject_kind(),
            id: patient_id.get(),
        })
    }

    /// Patients assigned to a doctor, in first-seen order. Empty when the
    /// doctor has no patient with a complete record.
    pub fn doctor_dashboard(&self, doctor_id: SubjectId) -> Result<Vec<DashboardView>, DashboardError> {
        Ok(self.collect(&DashboardQuery::ByDoctor(doctor_id))?.into_list())
    }

    /// Patients under a nurse's care, each annotated with the nurse's name.
    pub fn nurse_dashboard(&self, nurse_id: SubjectId) -> Result<Vec<DashboardView>, DashboardError> {
        Ok(self.collect(&DashboardQuery::ByNurse(nurse_id))?.into_list())
    }

    /// Identifier-less patient dashboard: whichever patient the view yields first.
    pub fn legacy_patient_dashboard(&self) -> Result<Option<DashboardView>, DashboardError> {
        self.single(&DashboardQuery::LegacyPatient)
    }

    fn single(&self, query: &DashboardQuery) -> Result<Option<DashboardView>, DashboardError> {
        self.collect(query)?
            .into_single()
            .map_err(|ambiguous| DashboardError::AmbiguousResult {
                subject: query.subject_kind(),
                id: query.subject_id().map(SubjectId::get).unwrap_or_default(),
                subject_ids: ambiguous.subject_ids,
            })
    }

    fn collect(&self, query: &DashboardQuery) -> Result<AggregatedDashboards, DashboardError> {
        let mut aggregator = DashboardAggregator::new();
        self.source.for_each_row(query, &mut |row| aggregator.push(row))?;

        let rows = aggregator.rows_seen();
        let aggregated = aggregator.finish();
        tracing::debug!(%query, rows, subjects = aggregated.len(), "Dashboard rows aggregated");
        Ok(aggregated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::source::SubjectKind;
    use crate::db::DatabaseError;
    use crate::models::{FlatDashboardRow, SubjectAttributes, VitalSnapshot};
    use chrono::NaiveDate;
    use std::cell::RefCell;

    /// Row source replaying a fixed row list and recording the queries it saw.
    struct FixedRows {
        rows: Vec<FlatDashboardRow>,
        queries: RefCell<Vec<DashboardQuery>>,
    }

    impl FixedRows {
        fn new(rows: Vec<FlatDashboardRow>) -> Self {
            Self { rows, queries: RefCell::new(Vec::new()) }
        }
    }

    impl RowSource for FixedRows {
        fn for_each_row(
            &self,
            query: &DashboardQuery,
            sink: &mut dyn FnMut(FlatDashboardRow),
        ) -> Result<(), DatabaseError> {
            self.queries.borrow_mut().push(*query);
            self.rows.iter().cloned().for_each(sink);
            Ok(())
        }
    }

    struct FailingSource;

    impl RowSource for FailingSource {
        fn for_each_row(
            &self,
            _query: &DashboardQuery,
            _sink: &mut dyn FnMut(FlatDashboardRow),
        ) -> Result<(), DatabaseError> {
            Err(DatabaseError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    fn row(id: i64, med: &str, disease: &str) -> FlatDashboardRow {
        FlatDashboardRow {
            subject_id: id,
            attributes: SubjectAttributes {
                nurse: None,
                first_name: format!("P{id}"),
                last_name: "Row".into(),
                age: 30,
                sex: "F".into(),
                blood_type: "B".into(),
                phone_number: None,
                address: None,
                dob: NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
                assigned_doctor_id: 2,
                vitals: VitalSnapshot {
                    body_temperature: 36.9,
                    pulse_rate: 66,
                    respiration_rate: 12,
                    systolic_pressure: 110,
                    diastolic_pressure: 70,
                },
            },
            medication_name: Some(med.into()),
            disease_name: Some(disease.into()),
        }
    }

    fn id(kind: SubjectKind, raw: i64) -> SubjectId {
        SubjectId::new(kind, raw).unwrap()
    }

    #[test]
    fn patient_dashboard_returns_collapsed_view() {
        let service = DashboardService::new(FixedRows::new(vec![
            row(1, "Aspirin", "Hypertension"),
            row(1, "Aspirin", "Flu"),
            row(1, "Tylenol", "Hypertension"),
            row(1, "Tylenol", "Flu"),
        ]));
        let view = service.patient_dashboard(id(SubjectKind::Patient, 1)).unwrap();

        assert_eq!(view.patient_id, 1);
        assert_eq!(view.medication_names(), vec!["Aspirin", "Tylenol"]);
        assert_eq!(view.disease_names(), vec!["Hypertension", "Flu"]);
        assert_eq!(
            service.source.queries.borrow().as_slice(),
            &[DashboardQuery::ByPatient(id(SubjectKind::Patient, 1))]
        );
    }

    #[test]
    fn patient_dashboard_empty_is_not_found() {
        let service = DashboardService::new(FixedRows::new(Vec::new()));
        let err = service.patient_dashboard(id(SubjectKind::Patient, 7)).unwrap_err();
        match err {
            DashboardError::NotFound { subject, id } => {
                assert_eq!(subject, SubjectKind::Patient);
                assert_eq!(id, 7);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn patient_dashboard_with_two_subjects_is_ambiguous() {
        let service = DashboardService::new(FixedRows::new(vec![
            row(1, "Aspirin", "Flu"),
            row(2, "Tylenol", "Flu"),
        ]));
        let err = service.patient_dashboard(id(SubjectKind::Patient, 1)).unwrap_err();
        assert_eq!(err.code(), "AMBIGUOUS_RESULT");
        match err {
            DashboardError::AmbiguousResult { subject_ids, id, .. } => {
                assert_eq!(subject_ids, vec![1, 2]);
                assert_eq!(id, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn doctor_dashboard_lists_in_first_seen_order() {
        let service = DashboardService::new(FixedRows::new(vec![
            row(12, "A", "X"),
            row(4, "B", "Y"),
            row(12, "C", "X"),
        ]));
        let views = service.doctor_dashboard(id(SubjectKind::Doctor, 2)).unwrap();
        let ids: Vec<i64> = views.iter().map(|v| v.patient_id).collect();
        assert_eq!(ids, vec![12, 4]);
        assert_eq!(views[0].medication_names(), vec!["A", "C"]);
    }

    #[test]
    fn doctor_and_nurse_dashboards_may_be_empty() {
        let service = DashboardService::new(FixedRows::new(Vec::new()));
        assert!(service.doctor_dashboard(id(SubjectKind::Doctor, 1)).unwrap().is_empty());
        assert!(service.nurse_dashboard(id(SubjectKind::Nurse, 1)).unwrap().is_empty());
    }

    #[test]
    fn query_errors_propagate_unchanged() {
        let service = DashboardService::new(FailingSource);
        let err = service.doctor_dashboard(id(SubjectKind::Doctor, 1)).unwrap_err();
        assert!(matches!(err, DashboardError::Query(DatabaseError::Sqlite(_))));
        assert_eq!(err.code(), "QUERY_ERROR");
    }

    #[test]
    fn legacy_mode_returns_at_most_one_view() {
        let service = DashboardService::new(FixedRows::new(vec![row(3, "A", "X")]));
        let view = service.legacy_patient_dashboard().unwrap().unwrap();
        assert_eq!(view.patient_id, 3);

        let empty = DashboardService::new(FixedRows::new(Vec::new()));
        assert!(empty.legacy_patient_dashboard().unwrap().is_none());
    }

    #[test]
    fn service_accepts_borrowed_source() {
        let source = FixedRows::new(vec![row(1, "A", "X")]);
        let service = DashboardService::new(&source);
        assert_eq!(service.nurse_dashboard(id(SubjectKind::Nurse, 3)).unwrap().len(), 1);
        assert_eq!(source.queries.borrow().len(), 1);
    }
}
