use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::classify::{grade_tier, GradeTier};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Enrollment, GradeRecord, PaymentRecord, PaymentStanding,
    PaymentStatus, StudentRecord,
};

/// `numerator / denominator` as a percentage, or `0.0` when the denominator is zero.
pub fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Arithmetic mean, or `0.0` for no values.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub trait Metrics {
    fn to_map(&self) -> BTreeMap<String, f64>;
}

pub trait Aggregate: Sized {
    type Summary: Metrics + Serialize + fmt::Debug + Clone;

    fn aggregate<'a, I>(records: I) -> Self::Summary
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a;
}

fn entries<const N: usize>(pairs: [(&str, f64); N]) -> BTreeMap<String, f64> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentSummary {
    pub total: usize,
    pub active: usize,
    pub up_to_date: usize,
    pub average_academic: f64,
    pub average_attendance: f64,
}

impl Metrics for StudentSummary {
    fn to_map(&self) -> BTreeMap<String, f64> {
        entries([
            ("total", self.total as f64),
            ("active", self.active as f64),
            ("up_to_date", self.up_to_date as f64),
            ("average_academic", self.average_academic),
            ("average_attendance", self.average_attendance),
        ])
    }
}

impl Aggregate for StudentRecord {
    type Summary = StudentSummary;

    fn aggregate<'a, I>(records: I) -> StudentSummary
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        let records: Vec<&StudentRecord> = records.into_iter().collect();
        StudentSummary {
            total: records.len(),
            active: records
                .iter()
                .filter(|s| s.enrollment == Enrollment::Active)
                .count(),
            up_to_date: records
                .iter()
                .filter(|s| s.payment_standing == PaymentStanding::UpToDate)
                .count(),
            average_academic: mean(records.iter().map(|s| s.academic_average)),
            average_attendance: mean(records.iter().map(|s| s.attendance_rate)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub count: usize,
    pub average: f64,
}

pub fn subject_averages<'a, I>(records: I) -> Vec<SubjectAverage>
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();

    for record in records {
        let entry = groups.entry(record.subject.clone()).or_insert_with(|| {
            order.push(record.subject.clone());
            Vec::new()
        });
        entry.push(record.average());
    }

    order
        .into_iter()
        .map(|subject| {
            let averages = groups.remove(&subject).unwrap_or_default();
            SubjectAverage {
                count: averages.len(),
                average: mean(averages),
                subject,
            }
        })
        .collect()
}

/// Per-subject means for a fixed subject catalog; subjects with no records
/// report `0.0`.
pub fn subject_summary(records: &[GradeRecord], catalog: &[&str]) -> Vec<SubjectAverage> {
    let observed = subject_averages(records);
    catalog
        .iter()
        .map(|subject| {
            observed
                .iter()
                .find(|entry| entry.subject == *subject)
                .cloned()
                .unwrap_or_else(|| SubjectAverage {
                    subject: subject.to_string(),
                    count: 0,
                    average: 0.0,
                })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GradeSummary {
    pub total: usize,
    pub overall_average: f64,
    pub excellent_count: usize,
    pub needs_improvement_count: usize,
    pub pass_rate: f64,
    pub subjects: Vec<SubjectAverage>,
}

impl Metrics for GradeSummary {
    fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = entries([
            ("total", self.total as f64),
            ("overall_average", self.overall_average),
            ("excellent_count", self.excellent_count as f64),
            ("needs_improvement_count", self.needs_improvement_count as f64),
            ("pass_rate", self.pass_rate),
        ]);
        for subject in &self.subjects {
            map.insert(format!("subject:{}", subject.subject), subject.average);
        }
        map
    }
}

impl Aggregate for GradeRecord {
    type Summary = GradeSummary;

    fn aggregate<'a, I>(records: I) -> GradeSummary
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        let records: Vec<&GradeRecord> = records.into_iter().collect();
        let total = records.len();
        let excellent_count = records
            .iter()
            .filter(|g| grade_tier(g.average()) >= GradeTier::Excellent)
            .count();
        let needs_improvement_count = records
            .iter()
            .filter(|g| grade_tier(g.average()) == GradeTier::NeedsImprovement)
            .count();

        GradeSummary {
            total,
            overall_average: mean(records.iter().map(|g| g.average())),
            excellent_count,
            needs_improvement_count,
            pass_rate: rate((total - needs_improvement_count) as f64, total as f64),
            subjects: subject_averages(records.iter().copied()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub present_rate: f64,
    pub late_rate: f64,
    pub absent_rate: f64,
    /// Present and late both count as attending.
    pub attendance_rate: f64,
}

impl Metrics for AttendanceSummary {
    fn to_map(&self) -> BTreeMap<String, f64> {
        entries([
            ("total", self.total as f64),
            ("present", self.present as f64),
            ("late", self.late as f64),
            ("absent", self.absent as f64),
            ("present_rate", self.present_rate),
            ("late_rate", self.late_rate),
            ("absent_rate", self.absent_rate),
            ("attendance_rate", self.attendance_rate),
        ])
    }
}

impl Aggregate for AttendanceRecord {
    type Summary = AttendanceSummary;

    fn aggregate<'a, I>(records: I) -> AttendanceSummary
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        let mut counts: HashMap<AttendanceStatus, usize> = HashMap::new();
        let mut total = 0usize;
        for record in records {
            *counts.entry(record.status).or_insert(0) += 1;
            total += 1;
        }

        let count = |status| counts.get(&status).copied().unwrap_or(0);
        let present = count(AttendanceStatus::Present);
        let late = count(AttendanceStatus::Late);
        let absent = count(AttendanceStatus::Absent);
        let denominator = total as f64;

        AttendanceSummary {
            total,
            present,
            late,
            absent,
            present_rate: rate(present as f64, denominator),
            late_rate: rate(late as f64, denominator),
            absent_rate: rate(absent as f64, denominator),
            attendance_rate: rate((present + late) as f64, denominator),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub total: usize,
    pub paid_count: usize,
    pub pending_count: usize,
    pub overdue_count: usize,
    /// Sums of `u64` amounts; wide enough that no slice of payments overflows.
    pub total_paid: u128,
    pub total_pending: u128,
    pub total_overdue: u128,
    pub total_invoiced: u128,
    /// Amount paid over amount invoiced, not a record count ratio.
    pub collection_rate: f64,
}

impl PaymentSummary {
    pub fn outstanding(&self) -> u128 {
        self.total_pending + self.total_overdue
    }
}

impl Metrics for PaymentSummary {
    fn to_map(&self) -> BTreeMap<String, f64> {
        entries([
            ("total", self.total as f64),
            ("paid_count", self.paid_count as f64),
            ("pending_count", self.pending_count as f64),
            ("overdue_count", self.overdue_count as f64),
            ("total_paid", self.total_paid as f64),
            ("total_pending", self.total_pending as f64),
            ("total_overdue", self.total_overdue as f64),
            ("total_invoiced", self.total_invoiced as f64),
            ("collection_rate", self.collection_rate),
        ])
    }
}

impl Aggregate for PaymentRecord {
    type Summary = PaymentSummary;

    fn aggregate<'a, I>(records: I) -> PaymentSummary
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        let mut summary = PaymentSummary::default();
        for record in records {
            summary.total += 1;
            match record.status {
                PaymentStatus::Paid => {
                    summary.paid_count += 1;
                    summary.total_paid += u128::from(record.amount);
                }
                PaymentStatus::Pending => {
                    summary.pending_count += 1;
                    summary.total_pending += u128::from(record.amount);
                }
                PaymentStatus::Overdue => {
                    summary.overdue_count += 1;
                    summary.total_overdue += u128::from(record.amount);
                }
            }
        }
        summary.total_invoiced = summary.total_paid + summary.outstanding();
        summary.collection_rate = rate(summary.total_paid as f64, summary.total_invoiced as f64);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn empty_inputs_yield_zero() {
        assert_eq!(rate(3.0, 0.0), 0.0);
        assert_eq!(mean(Vec::<f64>::new()), 0.0);

        let grades: Vec<GradeRecord> = Vec::new();
        let summary = GradeRecord::aggregate(&grades);
        assert_eq!(summary.overall_average, 0.0);
        assert_eq!(summary.pass_rate, 0.0);
        assert!(summary.subjects.is_empty());

        let payments: Vec<PaymentRecord> = Vec::new();
        assert_eq!(PaymentRecord::aggregate(&payments).collection_rate, 0.0);
    }

    #[test]
    fn sample_grades_summary() {
        let grades = sample::grades();
        let summary = GradeRecord::aggregate(&grades);
        assert_eq!(summary.total, 6);
        assert!((summary.overall_average - 4.0183).abs() < 0.001);
        assert_eq!(summary.excellent_count, 4);
        assert_eq!(summary.needs_improvement_count, 0);
        assert_eq!(summary.pass_rate, 100.0);
    }

    #[test]
    fn sample_payments_summary() {
        let payments = sample::payments();
        let summary = PaymentRecord::aggregate(&payments);
        assert_eq!(summary.total_paid, 1_410_000);
        assert_eq!(summary.total_pending, 430_000);
        assert_eq!(summary.total_overdue, 280_000);
        assert_eq!(summary.total_invoiced, 2_120_000);
        assert_eq!(summary.paid_count, 3);
        assert!((summary.collection_rate - 66.509).abs() < 0.01);
    }

    #[test]
    fn amounts_near_the_integer_limit_do_not_overflow() {
        let mut payments = sample::payments();
        payments.truncate(2);
        for payment in &mut payments {
            payment.amount = 10_000_000_000_000_000_000;
            payment.status = PaymentStatus::Paid;
        }
        let summary = PaymentRecord::aggregate(&payments);
        assert_eq!(summary.total_paid, 20_000_000_000_000_000_000);
        assert_eq!(summary.total_invoiced, summary.total_paid);
        assert_eq!(summary.collection_rate, 100.0);
    }

    #[test]
    fn sample_attendance_counts_late_as_attending() {
        let attendance = sample::attendance();
        let summary = AttendanceRecord::aggregate(&attendance);
        assert_eq!((summary.present, summary.late, summary.absent), (3, 2, 1));
        assert!((summary.attendance_rate - 83.333).abs() < 0.01);
        assert!((summary.absent_rate - 16.667).abs() < 0.01);
    }

    #[test]
    fn sample_students_summary() {
        let students = sample::students();
        let summary = StudentRecord::aggregate(&students);
        assert_eq!(summary.active, 4);
        assert_eq!(summary.up_to_date, 3);
        assert!((summary.average_academic - 4.04).abs() < 0.001);
    }

    #[test]
    fn subjects_group_in_first_seen_order() {
        let grades = sample::grades();
        let subjects = subject_averages(&grades);
        let names: Vec<&str> = subjects.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(names, vec!["Matemáticas", "Español", "Inglés", "Ciencias Naturales"]);
        assert_eq!(subjects[0].count, 3);
        assert!((subjects[0].average - (4.27 + 3.77 + 3.07) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn catalog_subjects_without_records_report_zero() {
        let grades = sample::grades();
        let summary = subject_summary(&grades, &sample::SUBJECTS);
        assert_eq!(summary.len(), sample::SUBJECTS.len());
        assert_eq!(summary[1].subject, "Español");
        assert_eq!(summary[1].average, 4.23);
        assert_eq!(summary[3].subject, "Ciencias Sociales");
        assert_eq!(summary[3].average, 0.0);
        assert_eq!(summary[3].count, 0);
    }

    #[test]
    fn metrics_flatten_to_named_values() {
        let payments = sample::payments();
        let map = PaymentRecord::aggregate(&payments).to_map();
        assert_eq!(map["total_paid"], 1_410_000.0);
        assert_eq!(map["overdue_count"], 1.0);
    }
}
