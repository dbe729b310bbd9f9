use std::str::FromStr;

use serde::Serialize;

use crate::models::{
    AttendanceRecord, AttendanceStatus, Enrollment, GradeRecord, PaymentRecord, PaymentStatus,
    StudentRecord,
};

pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for StudentRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.id.as_str(), self.grade_section.as_str()]
    }
}

impl Searchable for GradeRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.student_id.as_str(),
            self.grade_section.as_str(),
            self.subject.as_str(),
        ]
    }
}

impl Searchable for AttendanceRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.student_id.as_str(),
            self.grade_section.as_str(),
        ]
    }
}

impl Searchable for PaymentRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.student_name.as_str(),
            self.concept.as_str(),
            self.id.as_str(),
        ]
    }
}

/// Case-insensitive substring search over a record's searchable fields.
/// An empty term matches everything.
pub fn matches_search<R: Searchable>(record: &R, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(wanted) => wanted == value,
        }
    }
}

impl Facet<String> {
    /// Section facets match by substring so `"10°"` covers `"10°A"` and `"10°B"`.
    pub fn admits_substring(&self, value: &str) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(wanted) => value.contains(wanted.as_str()),
        }
    }
}

impl<T: FromStr> Facet<T> {
    /// Parse a UI selector value; `"all"` in any case (or a blank value)
    /// disables the facet.
    pub fn parse(raw: &str) -> Result<Self, T::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Facet::All)
        } else {
            trimmed.parse().map(Facet::Only)
        }
    }
}

pub trait FacetSet<R> {
    fn admits(&self, record: &R) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentFacets {
    pub section: Facet<String>,
    pub enrollment: Facet<Enrollment>,
}

impl FacetSet<StudentRecord> for StudentFacets {
    fn admits(&self, record: &StudentRecord) -> bool {
        self.section.admits_substring(&record.grade_section)
            && self.enrollment.admits(&record.enrollment)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GradeFacets {
    pub subject: Facet<String>,
    pub section: Facet<String>,
}

impl FacetSet<GradeRecord> for GradeFacets {
    fn admits(&self, record: &GradeRecord) -> bool {
        self.subject.admits(&record.subject) && self.section.admits_substring(&record.grade_section)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceFacets {
    pub status: Facet<AttendanceStatus>,
}

impl FacetSet<AttendanceRecord> for AttendanceFacets {
    fn admits(&self, record: &AttendanceRecord) -> bool {
        self.status.admits(&record.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentFacets {
    pub status: Facet<PaymentStatus>,
}

impl FacetSet<PaymentRecord> for PaymentFacets {
    fn admits(&self, record: &PaymentRecord) -> bool {
        self.status.admits(&record.status)
    }
}

/// Records matching `search` and every facet in `facets`, in input order.
pub fn filter<'a, R, F>(records: &'a [R], search: &str, facets: &F) -> Vec<&'a R>
where
    R: Searchable,
    F: FacetSet<R>,
{
    records
        .iter()
        .filter(|record| facets.admits(record) && matches_search(*record, search))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn empty_search_keeps_everything_in_order() {
        let students = sample::students();
        let result = filter(&students, "", &StudentFacets::default());
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["EST001", "EST002", "EST003", "EST004", "EST005"]);
    }

    #[test]
    fn search_ignores_case_and_hits_any_field() {
        let students = sample::students();
        assert_eq!(filter(&students, "est003", &StudentFacets::default()).len(), 1);
        assert_eq!(filter(&students, "ANA MARÍA", &StudentFacets::default()).len(), 1);
        assert_eq!(filter(&students, "8°c", &StudentFacets::default()).len(), 1);
    }

    #[test]
    fn every_match_contains_the_term() {
        let grades = sample::grades();
        for term in ["mat", "EST00", "°a", "ía"] {
            for record in filter(&grades, term, &GradeFacets::default()) {
                let needle = term.to_lowercase();
                assert!(record
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle)));
            }
        }
    }

    #[test]
    fn section_facet_matches_by_substring() {
        let students = sample::students();
        let facets = StudentFacets {
            section: Facet::Only("10°".to_string()),
            ..StudentFacets::default()
        };
        let sections: Vec<&str> = filter(&students, "", &facets)
            .into_iter()
            .map(|s| s.grade_section.as_str())
            .collect();
        assert_eq!(sections, vec!["10°A", "10°B"]);
    }

    #[test]
    fn facets_combine_with_search() {
        let grades = sample::grades();
        let facets = GradeFacets {
            subject: Facet::Only("Matemáticas".to_string()),
            ..GradeFacets::default()
        };
        let result = filter(&grades, "carlos", &facets);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].student_id, "EST002");

        let none = filter(&grades, "sofía", &facets);
        assert!(none.is_empty());
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let payments = sample::payments();
        let facets = PaymentFacets {
            status: Facet::Only(PaymentStatus::Paid),
        };
        let once: Vec<PaymentRecord> = filter(&payments, "pensión", &facets)
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<PaymentRecord> = filter(&once, "pensión", &facets)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn facet_parse_treats_all_as_disabled() {
        assert_eq!(Facet::<PaymentStatus>::parse("ALL").unwrap(), Facet::All);
        assert_eq!(Facet::<PaymentStatus>::parse("").unwrap(), Facet::All);
        assert_eq!(
            Facet::<PaymentStatus>::parse("overdue").unwrap(),
            Facet::Only(PaymentStatus::Overdue)
        );
        assert!(Facet::<PaymentStatus>::parse("refunded").is_err());
    }
}
