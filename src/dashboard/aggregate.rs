use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::models::{DashboardView, FlatDashboardRow, NamedEntry, SubjectAttributes};

/// In-progress view for one subject. The name sets keep insertion order, so
/// they double as the deduplicated lists.
#[derive(Debug)]
struct Accumulator {
    attributes: SubjectAttributes,
    medications: IndexSet<String>,
    diseases: IndexSet<String>,
}

impl Accumulator {
    fn new(attributes: SubjectAttributes) -> Self {
        Self {
            attributes,
            medications: IndexSet::new(),
            diseases: IndexSet::new(),
        }
    }

    fn into_view(self, subject_id: i64) -> DashboardView {
        DashboardView {
            patient_id: subject_id,
            attributes: self.attributes,
            medications: self.medications.into_iter().map(NamedEntry::new).collect(),
            diseases: self.diseases.into_iter().map(NamedEntry::new).collect(),
        }
    }
}

/// Single-pass fold from flat dashboard rows to one view per subject.
///
/// Subjects keep the order in which they first appear in the row stream.
/// Scalar attributes come from the first row of a subject; later rows
/// only contribute medication and disease names.
#[derive(Debug, Default)]
pub struct DashboardAggregator {
    // IndexMap rather than HashMap: iteration follows insertion order.
    subjects: IndexMap<i64, Accumulator>,
    rows_seen: usize,
}

impl DashboardAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: FlatDashboardRow) {
        self.rows_seen += 1;
        let FlatDashboardRow {
            subject_id,
            attributes,
            medication_name,
            disease_name,
        } = row;

        let acc = match self.subjects.entry(subject_id) {
            Entry::Occupied(slot) => {
                if slot.get().attributes != attributes {
                    tracing::warn!(
                        subject_id,
                        "Dashboard row disagrees with first-seen attributes, keeping first"
                    );
                }
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(Accumulator::new(attributes)),
        };

        if let Some(name) = present(medication_name) {
            acc.medications.insert(name);
        }
        if let Some(name) = present(disease_name) {
            acc.diseases.insert(name);
        }
    }

    /// Number of rows folded so far.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    pub fn finish(self) -> AggregatedDashboards {
        AggregatedDashboards {
            views: self
                .subjects
                .into_iter()
                .map(|(subject_id, acc)| (subject_id, acc.into_view(subject_id)))
                .collect(),
        }
    }
}

fn present(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}

/// Fold a complete row sequence.
pub fn aggregate<I>(rows: I) -> AggregatedDashboards
where
    I: IntoIterator<Item = FlatDashboardRow>,
{
    let mut aggregator = DashboardAggregator::new();
    for row in rows {
        aggregator.push(row);
    }
    aggregator.finish()
}

/// A by-id query produced more than one distinct subject.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected at most one subject, found {}", .subject_ids.len())]
pub struct AmbiguousSubjects {
    pub subject_ids: Vec<i64>,
}

/// Result of an aggregation pass: subject id → view, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedDashboards {
    views: IndexMap<i64, DashboardView>,
}

impl AggregatedDashboards {
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, subject_id: i64) -> Option<&DashboardView> {
        self.views.get(&subject_id)
    }

    pub fn contains(&self, subject_id: i64) -> bool {
        self.views.contains_key(&subject_id)
    }

    /// Subject ids in first-seen order.
    pub fn subject_ids(&self) -> Vec<i64> {
        self.views.keys().copied().collect()
    }

    pub fn iter(&self) -> indexmap::map::Values<'_, i64, DashboardView> {
        self.views.values()
    }

    /// List form, in first-seen subject order.
    pub fn into_list(self) -> Vec<DashboardView> {
        self.views.into_values().collect()
    }

    /// Single-subject form for by-id queries: `Ok(None)` when nothing
    /// matched, an error when more than one subject came back.
    pub fn into_single(self) -> Result<Option<DashboardView>, AmbiguousSubjects> {
        if self.views.len() > 1 {
            return Err(AmbiguousSubjects {
                subject_ids: self.subject_ids(),
            });
        }
        Ok(self.views.into_values().next())
    }
}

impl IntoIterator for AggregatedDashboards {
    type Item = DashboardView;
    type IntoIter = indexmap::map::IntoValues<i64, DashboardView>;

    fn into_iter(self) -> Self::IntoIter {
        self.views.into_values()
    }
}

impl<'a> IntoIterator for &'a AggregatedDashboards {
    type Item = &'a DashboardView;
    type IntoIter = indexmap::map::Values<'a, i64, DashboardView>;

    fn into_iter(self) -> Self::IntoIter {
        self.views.values()
    }
}
