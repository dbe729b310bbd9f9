use std::fmt::Write;

use crate::aggregate::{subject_averages, Metrics};
use crate::models::{AttendanceRecord, GradeRecord, PaymentRecord, StudentRecord};
use crate::overview::Overview;
use crate::snapshot::Snapshot;
use crate::view::{DomainView, Query, View};
use crate::{overview, view};

fn write_metrics(output: &mut String, metrics: &impl Metrics) {
    for (key, value) in metrics.to_map() {
        let _ = writeln!(output, "- {key}: {value:.2}");
    }
}

fn students_section(output: &mut String, view: &View<'_, StudentRecord>) {
    for row in &view.rows {
        let student = row.record;
        let _ = writeln!(
            output,
            "- {} ({}, {}) average {:.1} [{}], attendance {:.0}%, {} / {}",
            student.name,
            student.id,
            student.grade_section,
            student.academic_average,
            row.tier.academic.label(),
            student.attendance_rate,
            row.tier.enrollment,
            row.tier.payment
        );
    }
}

fn grades_section(output: &mut String, view: &View<'_, GradeRecord>) {
    for row in &view.rows {
        let grade = row.record;
        let _ = writeln!(
            output,
            "- {} ({}, {}) {}: {:.1} / {:.1} / {:.1} -> {:.2} [{}]",
            grade.student_name,
            grade.student_id,
            grade.grade_section,
            grade.subject,
            grade.period1,
            grade.period2,
            grade.period3,
            grade.average(),
            row.tier.label()
        );
    }

    if !view.totals.subjects.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### By Subject");
        for subject in &view.totals.subjects {
            let _ = writeln!(
                output,
                "- {}: {:.1} across {} records",
                subject.subject, subject.average, subject.count
            );
        }
    }
}

fn attendance_section(output: &mut String, view: &View<'_, AttendanceRecord>) {
    for row in &view.rows {
        let record = row.record;
        let arrival = record
            .arrival_time
            .map(|time| time.format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            output,
            "- {} ({}, {}) {} at {}",
            record.student_name, record.student_id, record.grade_section, row.tier, arrival
        );
    }

    let mut observations = view.observations().peekable();
    if observations.peek().is_some() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Observations");
        for record in observations {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                record.student_name,
                record.status,
                record.note().unwrap_or_default()
            );
        }
    }
}

fn payments_section(output: &mut String, view: &View<'_, PaymentRecord>) {
    for row in &view.rows {
        let payment = row.record;
        let _ = write!(
            output,
            "- #{} {} {}: {} due {} [{}]",
            payment.id,
            payment.student_name,
            payment.concept,
            payment.amount,
            payment.due_date,
            row.tier
        );
        if let Some(paid_date) = payment.paid_date {
            let _ = write!(output, ", paid {paid_date}");
        }
        if let Some(method) = &payment.method {
            let _ = write!(output, " by {method}");
        }
        let _ = writeln!(output);
    }
}

pub fn render_view(view: &DomainView<'_>) -> String {
    let mut output = String::new();
    let domain = view.domain();

    let _ = writeln!(output, "## {}", title(domain.as_str()));
    let _ = writeln!(output);
    let _ = writeln!(output, "### Summary");
    match view {
        DomainView::Students(v) => write_metrics(&mut output, &v.totals),
        DomainView::Grades(v) => write_metrics(&mut output, &v.totals),
        DomainView::Attendance(v) => write_metrics(&mut output, &v.totals),
        DomainView::Payments(v) => write_metrics(&mut output, &v.totals),
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Records");
    if view.is_empty() {
        let _ = writeln!(output, "No records match the current search.");
        return output;
    }

    match view {
        DomainView::Students(v) => students_section(&mut output, v),
        DomainView::Grades(v) => grades_section(&mut output, v),
        DomainView::Attendance(v) => attendance_section(&mut output, v),
        DomainView::Payments(v) => payments_section(&mut output, v),
    }
    output
}

pub fn render_overview(summary: &Overview) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Overview");
    let _ = writeln!(
        output,
        "- Students: {} ({} active)",
        summary.students.total, summary.students.active
    );
    let _ = writeln!(
        output,
        "- Attendance rate: {:.1}%",
        summary.attendance.attendance_rate
    );
    let _ = writeln!(
        output,
        "- Overall grade average: {:.2}",
        summary.grades.overall_average
    );
    let _ = writeln!(
        output,
        "- Outstanding payments: {} ({:.1}% collected)",
        summary.outstanding_amount, summary.payments.collection_rate
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Progress by Level");
    for level in &summary.levels {
        let _ = writeln!(
            output,
            "- {}: {:.0}% across {} students",
            level.level.label(),
            level.progress,
            level.students
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Alerts");
    let _ = writeln!(output, "- Overdue payments: {}", summary.alerts.overdue_payments);
    let _ = writeln!(
        output,
        "- Low attendance students: {}",
        summary.alerts.low_attendance_students
    );
    let _ = writeln!(
        output,
        "- Grades needing improvement: {}",
        summary.alerts.grades_needing_improvement
    );

    output
}

pub fn build_report(snapshot: &Snapshot) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Academic Dashboard Report");
    let _ = writeln!(output);
    output.push_str(&render_overview(&overview::overview(snapshot)));

    let views = [
        DomainView::Students(view::student_view(&snapshot.students, &Query::default())),
        DomainView::Grades(view::grade_view(&snapshot.grades, &Query::default())),
        DomainView::Attendance(view::attendance_view(&snapshot.attendance, &Query::default())),
        DomainView::Payments(view::payment_view(&snapshot.payments, &Query::default())),
    ];
    for domain_view in &views {
        let _ = writeln!(output);
        output.push_str(&render_view(domain_view));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");
    let subjects = subject_averages(&snapshot.grades);
    if subjects.is_empty() {
        let _ = writeln!(output, "No grade records.");
    }
    for subject in subjects {
        let _ = writeln!(
            output,
            "- {}: {:.1} over {} records",
            subject.subject, subject.average, subject.count
        );
    }

    output
}

fn title(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
