use serde::Serialize;

use crate::aggregate::{
    mean, Aggregate, AttendanceSummary, GradeSummary, PaymentSummary, StudentSummary,
};
use crate::classify::{progress_percent, SchoolLevel};
use crate::models::{AttendanceRecord, GradeRecord, PaymentRecord, StudentRecord};
use crate::snapshot::Snapshot;

/// Students whose attendance rate falls below this are flagged.
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: SchoolLevel,
    pub students: usize,
    pub average: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Alerts {
    pub overdue_payments: usize,
    pub low_attendance_students: usize,
    pub grades_needing_improvement: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub students: StudentSummary,
    pub grades: GradeSummary,
    pub attendance: AttendanceSummary,
    pub payments: PaymentSummary,
    pub outstanding_amount: u128,
    pub levels: Vec<LevelProgress>,
    pub alerts: Alerts,
}

pub fn overview(snapshot: &Snapshot) -> Overview {
    let students = StudentRecord::aggregate(&snapshot.students);
    let grades = GradeRecord::aggregate(&snapshot.grades);
    let attendance = AttendanceRecord::aggregate(&snapshot.attendance);
    let payments = PaymentRecord::aggregate(&snapshot.payments);

    let alerts = Alerts {
        overdue_payments: payments.overdue_count,
        low_attendance_students: snapshot
            .students
            .iter()
            .filter(|s| s.attendance_rate < LOW_ATTENDANCE_THRESHOLD)
            .count(),
        grades_needing_improvement: grades.needs_improvement_count,
    };

    Overview {
        outstanding_amount: payments.outstanding(),
        levels: level_progress(&snapshot.students),
        students,
        grades,
        attendance,
        payments,
        alerts,
    }
}

/// Mean academic average per school level. Levels without students report
/// zero; sections that name no level are left out.
pub fn level_progress(students: &[StudentRecord]) -> Vec<LevelProgress> {
    SchoolLevel::ALL
        .into_iter()
        .map(|level| {
            let averages: Vec<f64> = students
                .iter()
                .filter(|s| SchoolLevel::of_section(&s.grade_section) == Some(level))
                .map(|s| s.academic_average)
                .collect();
            let average = mean(averages.iter().copied());
            LevelProgress {
                level,
                students: averages.len(),
                average,
                progress: progress_percent(average),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn sample_overview_alerts() {
        let summary = overview(&sample::snapshot());
        assert_eq!(summary.students.total, 5);
        assert_eq!(summary.outstanding_amount, 710_000);
        assert_eq!(
            summary.alerts,
            Alerts {
                overdue_payments: 1,
                low_attendance_students: 1,
                grades_needing_improvement: 0,
            }
        );
    }

    #[test]
    fn levels_average_their_sections() {
        let levels = level_progress(&sample::students());
        assert_eq!(levels[0].level, SchoolLevel::Primary);
        assert_eq!(levels[0].students, 0);
        assert_eq!(levels[0].progress, 0.0);

        // 9°A at 4.6 and 8°C at 3.2
        assert_eq!(levels[1].students, 2);
        assert!((levels[1].average - 3.9).abs() < 1e-9);
        assert!((levels[1].progress - 78.0).abs() < 1e-9);

        assert_eq!(levels[2].students, 3);
    }
}
