use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::aggregate::{Aggregate, Metrics};
use crate::classify::Classify;
use crate::error::{DashboardError, Result};
use crate::filter::{
    self, AttendanceFacets, Facet, FacetSet, GradeFacets, PaymentFacets, Searchable,
    StudentFacets,
};
use crate::models::{AttendanceRecord, GradeRecord, PaymentRecord, StudentRecord};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query<F> {
    pub search: String,
    pub facets: F,
}

impl<F: Default> Query<F> {
    pub fn search(term: impl Into<String>) -> Self {
        Query {
            search: term.into(),
            facets: F::default(),
        }
    }
}

impl<F> Query<F> {
    pub fn with_facets(mut self, facets: F) -> Self {
        self.facets = facets;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "R: Serialize"))]
pub struct Row<'a, R: Classify> {
    #[serde(flatten)]
    pub record: &'a R,
    pub tier: R::Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl<'a, R: Classify> Row<'a, R> {
    fn classify(record: &'a R) -> Self {
        Row {
            record,
            tier: record.tier(),
            score: record.score(),
        }
    }
}

/// `totals` summarizes the whole collection (the screen's cards) while
/// `filtered_totals` summarizes only the visible rows.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "R: Serialize"))]
pub struct View<'a, R: Classify + Aggregate> {
    pub rows: Vec<Row<'a, R>>,
    pub totals: R::Summary,
    pub filtered_totals: R::Summary,
}

impl<'a, R: Classify + Aggregate> View<'a, R> {
    pub fn records(&self) -> impl Iterator<Item = &'a R> + '_ {
        self.rows.iter().map(|row| row.record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> View<'a, AttendanceRecord> {
    pub fn observations(&self) -> impl Iterator<Item = &'a AttendanceRecord> + '_ {
        self.records().filter(|record| record.note().is_some())
    }
}

pub fn build<'a, R, F>(records: &'a [R], query: &Query<F>) -> View<'a, R>
where
    R: Searchable + Classify + Aggregate,
    F: FacetSet<R>,
{
    let visible = filter::filter(records, &query.search, &query.facets);
    debug!(
        "view recomputed: {} of {} records match {:?}",
        visible.len(),
        records.len(),
        query.search
    );

    View {
        totals: R::aggregate(records),
        filtered_totals: R::aggregate(visible.iter().copied()),
        rows: visible.into_iter().map(Row::classify).collect(),
    }
}

pub fn student_view<'a>(
    records: &'a [StudentRecord],
    query: &Query<StudentFacets>,
) -> View<'a, StudentRecord> {
    build(records, query)
}

pub fn grade_view<'a>(
    records: &'a [GradeRecord],
    query: &Query<GradeFacets>,
) -> View<'a, GradeRecord> {
    build(records, query)
}

pub fn attendance_view<'a>(
    records: &'a [AttendanceRecord],
    query: &Query<AttendanceFacets>,
) -> View<'a, AttendanceRecord> {
    build(records, query)
}

pub fn payment_view<'a>(
    records: &'a [PaymentRecord],
    query: &Query<PaymentFacets>,
) -> View<'a, PaymentRecord> {
    build(records, query)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Students,
    Grades,
    Attendance,
    Payments,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Students,
        Domain::Grades,
        Domain::Attendance,
        Domain::Payments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Students => "students",
            Domain::Grades => "grades",
            Domain::Attendance => "attendance",
            Domain::Payments => "payments",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == normalized)
            .ok_or_else(|| DashboardError::UnknownDomain(value.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "domain", rename_all = "kebab-case")]
pub enum DomainView<'a> {
    Students(View<'a, StudentRecord>),
    Grades(View<'a, GradeRecord>),
    Attendance(View<'a, AttendanceRecord>),
    Payments(View<'a, PaymentRecord>),
}

impl DomainView<'_> {
    pub fn domain(&self) -> Domain {
        match self {
            DomainView::Students(_) => Domain::Students,
            DomainView::Grades(_) => Domain::Grades,
            DomainView::Attendance(_) => Domain::Attendance,
            DomainView::Payments(_) => Domain::Payments,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DomainView::Students(view) => view.len(),
            DomainView::Grades(view) => view.len(),
            DomainView::Attendance(view) => view.len(),
            DomainView::Payments(view) => view.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Card values over the whole collection.
    pub fn aggregates(&self) -> BTreeMap<String, f64> {
        match self {
            DomainView::Students(view) => view.totals.to_map(),
            DomainView::Grades(view) => view.totals.to_map(),
            DomainView::Attendance(view) => view.totals.to_map(),
            DomainView::Payments(view) => view.totals.to_map(),
        }
    }

    pub fn filtered_aggregates(&self) -> BTreeMap<String, f64> {
        match self {
            DomainView::Students(view) => view.filtered_totals.to_map(),
            DomainView::Grades(view) => view.filtered_totals.to_map(),
            DomainView::Attendance(view) => view.filtered_totals.to_map(),
            DomainView::Payments(view) => view.filtered_totals.to_map(),
        }
    }
}

fn facet<T: FromStr>(domain: Domain, raw: &str) -> Result<Facet<T>> {
    Facet::parse(raw).map_err(|_| DashboardError::UnknownFacet {
        domain: domain.as_str(),
        value: raw.to_string(),
    })
}

/// Single string-driven entry point. `facet_value` drives the domain's primary
/// selector: section for students, subject for grades, status otherwise.
pub fn compute_view<'a>(
    domain: Domain,
    snapshot: &'a Snapshot,
    search: &str,
    facet_value: &str,
) -> Result<DomainView<'a>> {
    let view = match domain {
        Domain::Students => {
            let facets = StudentFacets {
                section: facet(domain, facet_value)?,
                ..StudentFacets::default()
            };
            DomainView::Students(student_view(
                &snapshot.students,
                &Query::search(search).with_facets(facets),
            ))
        }
        Domain::Grades => {
            let facets = GradeFacets {
                subject: facet(domain, facet_value)?,
                ..GradeFacets::default()
            };
            DomainView::Grades(grade_view(
                &snapshot.grades,
                &Query::search(search).with_facets(facets),
            ))
        }
        Domain::Attendance => {
            let facets = AttendanceFacets {
                status: facet(domain, facet_value)?,
            };
            DomainView::Attendance(attendance_view(
                &snapshot.attendance,
                &Query::search(search).with_facets(facets),
            ))
        }
        Domain::Payments => {
            let facets = PaymentFacets {
                status: facet(domain, facet_value)?,
            };
            DomainView::Payments(payment_view(
                &snapshot.payments,
                &Query::search(search).with_facets(facets),
            ))
        }
    };
    Ok(view)
}
