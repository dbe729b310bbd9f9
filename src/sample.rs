use chrono::{NaiveDate, NaiveTime};

use crate::models::{
    AttendanceRecord, AttendanceStatus, Enrollment, GradeRecord, PaymentRecord, PaymentStanding,
    PaymentStatus, StudentRecord,
};
use crate::snapshot::Snapshot;

pub const SUBJECTS: [&str; 8] = [
    "Matemáticas",
    "Español",
    "Ciencias Naturales",
    "Ciencias Sociales",
    "Inglés",
    "Educación Física",
    "Artes",
    "Ética",
];

pub fn snapshot() -> Snapshot {
    Snapshot {
        students: students(),
        grades: grades(),
        attendance: attendance(),
        payments: payments(),
    }
}

// Literal dates below are all valid; the default is never reached.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn clock(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    grade_section: &str,
    age: u8,
    phone: &str,
    email: &str,
    address: &str,
    enrollment: Enrollment,
    academic_average: f64,
    attendance_rate: f64,
    payment_standing: PaymentStanding,
) -> StudentRecord {
    StudentRecord {
        id: id.to_string(),
        name: name.to_string(),
        grade_section: grade_section.to_string(),
        age,
        phone: phone.to_string(),
        email: email.to_string(),
        address: address.to_string(),
        enrollment,
        academic_average,
        attendance_rate,
        payment_standing,
    }
}

pub fn students() -> Vec<StudentRecord> {
    vec![
        student(
            "EST001",
            "Ana María García",
            "10°A",
            16,
            "+57 300 123 4567",
            "ana.garcia@email.com",
            "Calle 45 #12-34, Bogotá",
            Enrollment::Active,
            4.2,
            95.0,
            PaymentStanding::UpToDate,
        ),
        student(
            "EST002",
            "Carlos Rodríguez",
            "11°B",
            17,
            "+57 301 234 5678",
            "carlos.rodriguez@email.com",
            "Carrera 23 #56-78, Bogotá",
            Enrollment::Active,
            3.8,
            88.0,
            PaymentStanding::Pending,
        ),
        student(
            "EST003",
            "María José López",
            "9°A",
            15,
            "+57 302 345 6789",
            "maria.lopez@email.com",
            "Avenida 68 #23-45, Bogotá",
            Enrollment::Active,
            4.6,
            98.0,
            PaymentStanding::UpToDate,
        ),
        student(
            "EST004",
            "Juan Pablo Morales",
            "8°C",
            14,
            "+57 303 456 7890",
            "juan.morales@email.com",
            "Calle 127 #45-67, Bogotá",
            Enrollment::Inactive,
            3.2,
            75.0,
            PaymentStanding::Overdue,
        ),
        student(
            "EST005",
            "Sofía Hernández",
            "10°B",
            16,
            "+57 304 567 8901",
            "sofia.hernandez@email.com",
            "Transversal 34 #12-89, Bogotá",
            Enrollment::Active,
            4.4,
            92.0,
            PaymentStanding::UpToDate,
        ),
    ]
}

fn grade(
    student_id: &str,
    student_name: &str,
    grade_section: &str,
    subject: &str,
    periods: [f64; 3],
    recorded_average: f64,
) -> GradeRecord {
    GradeRecord {
        student_id: student_id.to_string(),
        student_name: student_name.to_string(),
        grade_section: grade_section.to_string(),
        subject: subject.to_string(),
        period1: periods[0],
        period2: periods[1],
        period3: periods[2],
        recorded_average: Some(recorded_average),
    }
}

pub fn grades() -> Vec<GradeRecord> {
    vec![
        grade("EST001", "Ana María García", "10°A", "Matemáticas", [4.2, 4.5, 4.1], 4.27),
        grade("EST001", "Ana María García", "10°A", "Español", [4.0, 4.3, 4.4], 4.23),
        grade("EST002", "Carlos Rodríguez", "11°B", "Matemáticas", [3.5, 3.8, 4.0], 3.77),
        grade("EST002", "Carlos Rodríguez", "11°B", "Inglés", [4.1, 3.9, 4.2], 4.07),
        grade("EST003", "María José López", "9°A", "Ciencias Naturales", [4.7, 4.6, 4.8], 4.70),
        grade("EST004", "Juan Pablo Morales", "8°C", "Matemáticas", [2.8, 3.1, 3.3], 3.07),
    ]
}

fn attendance_record(
    student_id: &str,
    student_name: &str,
    grade_section: &str,
    status: AttendanceStatus,
    arrival_time: Option<NaiveTime>,
    notes: &str,
) -> AttendanceRecord {
    AttendanceRecord {
        student_id: student_id.to_string(),
        student_name: student_name.to_string(),
        grade_section: grade_section.to_string(),
        status,
        arrival_time,
        notes: Some(notes.to_string()).filter(|n| !n.is_empty()),
    }
}

pub fn attendance() -> Vec<AttendanceRecord> {
    use AttendanceStatus::{Absent, Late, Present};

    vec![
        attendance_record("EST001", "Ana María García", "10°A", Present, clock(7, 45), ""),
        attendance_record(
            "EST002",
            "Carlos Rodríguez",
            "11°B",
            Late,
            clock(8, 15),
            "Retraso justificado - cita médica",
        ),
        attendance_record("EST003", "María José López", "9°A", Present, clock(7, 30), ""),
        attendance_record(
            "EST004",
            "Juan Pablo Morales",
            "8°C",
            Absent,
            None,
            "Enfermedad - incapacidad médica",
        ),
        attendance_record("EST005", "Sofía Hernández", "10°B", Present, clock(7, 40), ""),
        attendance_record(
            "EST006",
            "Diego Martínez",
            "11°A",
            Late,
            clock(8, 20),
            "Problema de transporte",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn payment(
    id: &str,
    student_id: &str,
    student_name: &str,
    concept: &str,
    amount: u64,
    due_date: NaiveDate,
    paid: Option<(NaiveDate, &str)>,
    status: PaymentStatus,
) -> PaymentRecord {
    PaymentRecord {
        id: id.to_string(),
        student_id: student_id.to_string(),
        student_name: student_name.to_string(),
        concept: concept.to_string(),
        amount,
        due_date,
        paid_date: paid.map(|(paid_date, _)| paid_date),
        status,
        method: paid.map(|(_, method)| method.to_string()),
    }
}

pub fn payments() -> Vec<PaymentRecord> {
    use PaymentStatus::{Overdue, Paid, Pending};

    vec![
        payment(
            "PAY001",
            "EST001",
            "Ana María García",
            "Matrícula 2024",
            850_000,
            date(2024, 1, 15),
            Some((date(2024, 1, 12), "Transferencia bancaria")),
            Paid,
        ),
        payment(
            "PAY002",
            "EST002",
            "Carlos Rodríguez",
            "Pensión Febrero",
            280_000,
            date(2024, 2, 5),
            None,
            Pending,
        ),
        payment(
            "PAY003",
            "EST003",
            "María José López",
            "Pensión Enero",
            280_000,
            date(2024, 1, 5),
            Some((date(2024, 1, 3), "Efectivo")),
            Paid,
        ),
        payment(
            "PAY004",
            "EST004",
            "Juan Pablo Morales",
            "Pensión Diciembre",
            280_000,
            date(2023, 12, 5),
            None,
            Overdue,
        ),
        payment(
            "PAY005",
            "EST001",
            "Ana María García",
            "Seguro estudiantil",
            150_000,
            date(2024, 3, 1),
            None,
            Pending,
        ),
        payment(
            "PAY006",
            "EST005",
            "Sofía Hernández",
            "Pensión Febrero",
            280_000,
            date(2024, 2, 5),
            Some((date(2024, 2, 1), "Tarjeta de crédito")),
            Paid,
        ),
    ]
}
