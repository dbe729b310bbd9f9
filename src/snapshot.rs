use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, GradeRecord, PaymentRecord, StudentRecord};

/// The four record collections, loaded once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub grades: Vec<GradeRecord>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

impl Snapshot {
    pub fn student(&self, id: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn grades_for<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a GradeRecord> {
        self.grades
            .iter()
            .filter(move |grade| grade.student_id == student_id)
    }

    pub fn attendance_for<'a>(
        &'a self,
        student_id: &'a str,
    ) -> impl Iterator<Item = &'a AttendanceRecord> {
        self.attendance
            .iter()
            .filter(move |record| record.student_id == student_id)
    }

    pub fn payments_for<'a>(
        &'a self,
        student_id: &'a str,
    ) -> impl Iterator<Item = &'a PaymentRecord> {
        self.payments
            .iter()
            .filter(move |payment| payment.student_id == student_id)
    }

    pub fn payment(&self, id: &str) -> Option<&PaymentRecord> {
        self.payments.iter().find(|payment| payment.id == id)
    }
}

#[cfg(test)]
mod tests {
    use crate::sample;

    #[test]
    fn lookups_follow_student_ids() {
        let snapshot = sample::snapshot();
        let ana = snapshot.student("EST001").unwrap();
        assert_eq!(ana.name, "Ana María García");
        assert_eq!(snapshot.grades_for("EST001").count(), 2);
        assert_eq!(snapshot.payments_for("EST001").count(), 2);
        assert_eq!(snapshot.attendance_for("EST004").count(), 1);
        assert!(snapshot.student("EST999").is_none());
    }

    #[test]
    fn references_may_dangle() {
        let snapshot = sample::snapshot();
        // Attendance lists EST006, who has no student record.
        assert_eq!(snapshot.attendance_for("EST006").count(), 1);
        assert!(snapshot.student("EST006").is_none());
        assert_eq!(snapshot.payment("PAY004").map(|p| p.amount), Some(280_000));
    }
}
