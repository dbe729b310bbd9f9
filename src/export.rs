use std::io;

use crate::error::{DashboardError, Result};
use crate::view::DomainView;

const STUDENT_HEADER: [&str; 12] = [
    "id",
    "name",
    "grade_section",
    "age",
    "phone",
    "email",
    "address",
    "enrollment",
    "academic_average",
    "attendance_rate",
    "payment_standing",
    "academic_tier",
];

const GRADE_HEADER: [&str; 9] = [
    "student_id",
    "student_name",
    "grade_section",
    "subject",
    "period1",
    "period2",
    "period3",
    "average",
    "tier",
];

const ATTENDANCE_HEADER: [&str; 6] = [
    "student_id",
    "student_name",
    "grade_section",
    "status",
    "arrival_time",
    "notes",
];

const PAYMENT_HEADER: [&str; 9] = [
    "id",
    "student_id",
    "student_name",
    "concept",
    "amount",
    "due_date",
    "paid_date",
    "status",
    "method",
];

/// Writes the visible rows of `view` as CSV, one line per row. Grade rows
/// carry the derived average and tier rather than any stored average.
pub fn write_csv<W: io::Write>(view: &DomainView<'_>, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    match view {
        DomainView::Students(view) => {
            writer.write_record(STUDENT_HEADER)?;
            for row in &view.rows {
                let student = row.record;
                writer.write_record(&[
                    student.id.clone(),
                    student.name.clone(),
                    student.grade_section.clone(),
                    student.age.to_string(),
                    student.phone.clone(),
                    student.email.clone(),
                    student.address.clone(),
                    student.enrollment.to_string(),
                    student.academic_average.to_string(),
                    student.attendance_rate.to_string(),
                    student.payment_standing.to_string(),
                    row.tier.academic.label().to_string(),
                ])?;
            }
        }
        DomainView::Grades(view) => {
            writer.write_record(GRADE_HEADER)?;
            for row in &view.rows {
                let grade = row.record;
                writer.write_record(&[
                    grade.student_id.clone(),
                    grade.student_name.clone(),
                    grade.grade_section.clone(),
                    grade.subject.clone(),
                    grade.period1.to_string(),
                    grade.period2.to_string(),
                    grade.period3.to_string(),
                    format!("{:.2}", grade.average()),
                    row.tier.label().to_string(),
                ])?;
            }
        }
        DomainView::Attendance(view) => {
            writer.write_record(ATTENDANCE_HEADER)?;
            for row in &view.rows {
                let record = row.record;
                writer.write_record(&[
                    record.student_id.clone(),
                    record.student_name.clone(),
                    record.grade_section.clone(),
                    row.tier.to_string(),
                    record
                        .arrival_time
                        .map(|time| time.format("%H:%M").to_string())
                        .unwrap_or_default(),
                    record.note().unwrap_or_default().to_string(),
                ])?;
            }
        }
        DomainView::Payments(view) => {
            writer.write_record(PAYMENT_HEADER)?;
            for row in &view.rows {
                let payment = row.record;
                writer.write_record(&[
                    payment.id.clone(),
                    payment.student_id.clone(),
                    payment.student_name.clone(),
                    payment.concept.clone(),
                    payment.amount.to_string(),
                    payment.due_date.to_string(),
                    payment
                        .paid_date
                        .map(|date| date.to_string())
                        .unwrap_or_default(),
                    row.tier.to_string(),
                    payment.method.clone().unwrap_or_default(),
                ])?;
            }
        }
    }

    writer
        .flush()
        .map_err(|source| DashboardError::Export(source.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;
    use crate::view::{compute_view, Domain};

    fn export(domain: Domain, search: &str) -> String {
        let snapshot = sample::snapshot();
        let view = compute_view(domain, &snapshot, search, "all").unwrap();
        let mut buffer = Vec::new();
        write_csv(&view, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn grade_rows_export_the_derived_average_and_tier() {
        let text = export(Domain::Grades, "EST004");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "student_id,student_name,grade_section,subject,period1,period2,period3,average,tier"
        );
        assert_eq!(
            lines[1],
            "EST004,Juan Pablo Morales,8°C,Matemáticas,2.8,3.1,3.3,3.07,acceptable"
        );
        assert_eq!(lines.len(), 2);
        assert!(!text.contains("recorded_average"));
    }

    #[test]
    fn student_rows_end_with_the_academic_tier() {
        let text = export(Domain::Students, "EST001");
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("EST001,Ana María García,10°A,"));
        assert!(row.ends_with(",up-to-date,excellent"));
    }

    #[test]
    fn missing_optional_fields_export_as_empty_cells() {
        let text = export(Domain::Payments, "PAY004");
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("PAY004,"));
        assert!(row.ends_with(",,overdue,"));

        let text = export(Domain::Attendance, "EST004");
        assert!(text.lines().nth(1).unwrap().contains(",absent,,"));
    }

    #[test]
    fn empty_view_exports_only_the_header() {
        let text = export(Domain::Payments, "nobody");
        assert_eq!(text.lines().count(), 1);
    }
}
