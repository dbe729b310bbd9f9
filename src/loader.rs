use std::collections::HashSet;
use std::path::Path;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::classify::MAX_SCORE;
use crate::error::{DashboardError, Result};
use crate::models::{AttendanceStatus, PaymentStatus};
use crate::snapshot::Snapshot;

pub const STUDENTS_FILE: &str = "students.csv";
pub const GRADES_FILE: &str = "grades.csv";
pub const ATTENDANCE_FILE: &str = "attendance.csv";
pub const PAYMENTS_FILE: &str = "payments.csv";

/// Largest gap tolerated between a stored grade average and the derived one.
const AVERAGE_DRIFT_TOLERANCE: f64 = 0.01;

pub fn load(path: &Path) -> Result<Snapshot> {
    if path.is_dir() {
        load_dir(path)
    } else {
        load_json(path)
    }
}

/// Read the four CSV collections from `dir`. A missing file yields an empty
/// collection.
pub fn load_dir(dir: &Path) -> Result<Snapshot> {
    let snapshot = Snapshot {
        students: read_csv(&dir.join(STUDENTS_FILE))?,
        grades: read_csv(&dir.join(GRADES_FILE))?,
        attendance: read_csv(&dir.join(ATTENDANCE_FILE))?,
        payments: read_csv(&dir.join(PAYMENTS_FILE))?,
    };
    validate(&snapshot)?;
    info!(
        "loaded {} students, {} grades, {} attendance and {} payment records from {}",
        snapshot.students.len(),
        snapshot.grades.len(),
        snapshot.attendance.len(),
        snapshot.payments.len(),
        dir.display()
    );
    Ok(snapshot)
}

pub fn load_json(path: &Path) -> Result<Snapshot> {
    let raw = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|source| DashboardError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&snapshot)?;
    info!("loaded snapshot from {}", path.display());
    Ok(snapshot)
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("{} not found, using an empty collection", path.display());
        return Ok(Vec::new());
    }

    let csv_error = |source| DashboardError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result.map_err(csv_error)?);
    }
    debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn check_range(
    kind: &'static str,
    id: &str,
    field: &'static str,
    value: f64,
    max: f64,
) -> Result<()> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(DashboardError::OutOfRange {
            kind,
            id: id.to_string(),
            field,
            value,
        })
    }
}

/// Reject snapshots that break record invariants; log softer
/// inconsistencies and carry on.
pub fn validate(snapshot: &Snapshot) -> Result<()> {
    let mut student_ids = HashSet::new();
    for student in &snapshot.students {
        if !student_ids.insert(student.id.as_str()) {
            return Err(DashboardError::DuplicateId {
                kind: "student",
                id: student.id.clone(),
            });
        }
        check_range(
            "student",
            &student.id,
            "academic_average",
            student.academic_average,
            MAX_SCORE,
        )?;
        check_range(
            "student",
            &student.id,
            "attendance_rate",
            student.attendance_rate,
            100.0,
        )?;
    }

    for grade in &snapshot.grades {
        let key = format!("{}/{}", grade.student_id, grade.subject);
        check_range("grade", &key, "period1", grade.period1, MAX_SCORE)?;
        check_range("grade", &key, "period2", grade.period2, MAX_SCORE)?;
        check_range("grade", &key, "period3", grade.period3, MAX_SCORE)?;

        if let Some(recorded) = grade.recorded_average {
            let derived = grade.average();
            if (recorded - derived).abs() > AVERAGE_DRIFT_TOLERANCE {
                warn!("grade {key}: stored average {recorded:.2} differs from derived {derived:.2}");
            }
        }
        if !student_ids.contains(grade.student_id.as_str()) {
            debug!("grade {key} refers to unknown student");
        }
    }

    for record in &snapshot.attendance {
        match (record.status, record.arrival_time) {
            (AttendanceStatus::Absent, Some(time)) => warn!(
                "attendance {}: absent but arrived at {}",
                record.student_id,
                time.format("%H:%M")
            ),
            (AttendanceStatus::Present | AttendanceStatus::Late, None) => {
                warn!("attendance {}: {} without arrival time", record.student_id, record.status)
            }
            _ => {}
        }
        if !student_ids.contains(record.student_id.as_str()) {
            debug!("attendance for {} refers to unknown student", record.student_id);
        }
    }

    let mut payment_ids = HashSet::new();
    for payment in &snapshot.payments {
        if !payment_ids.insert(payment.id.as_str()) {
            return Err(DashboardError::DuplicateId {
                kind: "payment",
                id: payment.id.clone(),
            });
        }
        if payment.amount == 0 {
            return Err(DashboardError::NonPositiveAmount {
                id: payment.id.clone(),
            });
        }
        let paid = payment.status == PaymentStatus::Paid;
        if paid != payment.paid_date.is_some() {
            warn!(
                "payment {}: status {} does not match paid date {:?}",
                payment.id, payment.status, payment.paid_date
            );
        }
        if payment.method.is_some() && payment.paid_date.is_none() {
            warn!("payment {}: method recorded without a paid date", payment.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;
    use std::fs;

    const STUDENTS: &str = "\
id,name,grade_section,age,phone,email,address,enrollment,academic_average,attendance_rate,payment_standing
EST001,Ana María García,10°A,16,+57 300 123 4567,ana.garcia@email.com,\"Calle 45 #12-34, Bogotá\",active,4.2,95,up-to-date
EST002,Carlos Rodríguez,11°B,17,+57 301 234 5678,carlos.rodriguez@email.com,\"Carrera 23 #56-78, Bogotá\",active,3.8,88,pending
";

    const ATTENDANCE: &str = "\
student_id,student_name,grade_section,status,arrival_time,notes
EST001,Ana María García,10°A,present,07:45,
EST002,Carlos Rodríguez,11°B,late,08:15,Retraso justificado - cita médica
";

    const PAYMENTS: &str = "\
id,student_id,student_name,concept,amount,due_date,paid_date,status,method
PAY001,EST001,Ana María García,Matrícula 2024,850000,2024-01-15,2024-01-12,paid,Transferencia bancaria
PAY002,EST002,Carlos Rodríguez,Pensión Febrero,280000,2024-02-05,,pending,
";

    const GRADES: &str = "\
student_id,student_name,grade_section,subject,period1,period2,period3,recorded_average
EST001,Ana María García,10°A,Matemáticas,4.2,4.5,4.1,4.27
EST002,Carlos Rodríguez,11°B,Inglés,4.1,3.9,4.2,
";

    fn write_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    #[test]
    fn loads_csv_directory() {
        let dir = write_dir(&[
            (STUDENTS_FILE, STUDENTS),
            (GRADES_FILE, GRADES),
            (ATTENDANCE_FILE, ATTENDANCE),
            (PAYMENTS_FILE, PAYMENTS),
        ]);
        let snapshot = load(dir.path()).unwrap();

        assert_eq!(snapshot.students.len(), 2);
        assert_eq!(snapshot.students[0].address, "Calle 45 #12-34, Bogotá");
        assert_eq!(snapshot.grades[0].recorded_average, Some(4.27));
        assert_eq!(snapshot.grades[1].recorded_average, None);
        assert_eq!(snapshot.attendance[0].notes, None);
        assert!(snapshot.attendance[1].arrival_time.is_some());
        assert_eq!(snapshot.payments[1].paid_date, None);
        assert_eq!(snapshot.payments[1].method, None);
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = write_dir(&[(STUDENTS_FILE, STUDENTS)]);
        let snapshot = load_dir(dir.path()).unwrap();
        assert_eq!(snapshot.students.len(), 2);
        assert!(snapshot.payments.is_empty());
    }

    #[test]
    fn duplicate_student_id_fails_fast() {
        let duplicated = format!("{STUDENTS}EST001,Otra Persona,9°A,15,x,y,z,active,3.0,90,pending\n");
        let dir = write_dir(&[(STUDENTS_FILE, &duplicated)]);
        let err = load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DashboardError::DuplicateId { kind: "student", .. }));
    }

    #[test]
    fn unknown_status_is_a_csv_error() {
        let bad = ATTENDANCE.replace("late", "tardy");
        let dir = write_dir(&[(ATTENDANCE_FILE, &bad)]);
        let err = load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DashboardError::Csv { .. }));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut snapshot = sample::snapshot();
        snapshot.students[2].academic_average = 5.4;
        let err = validate(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::OutOfRange { field: "academic_average", .. }
        ));

        let mut snapshot = sample::snapshot();
        snapshot.payments[0].amount = 0;
        assert!(matches!(
            validate(&snapshot).unwrap_err(),
            DashboardError::NonPositiveAmount { .. }
        ));
    }

    #[test]
    fn sample_snapshot_is_valid() {
        assert!(validate(&sample::snapshot()).is_ok());
    }

    #[test]
    fn json_snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = sample::snapshot();
        fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_json_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_json(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DashboardError::Io { .. }));
    }
}
