use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DashboardError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == normalized)
                    .ok_or_else(|| DashboardError::UnknownStatus {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }
    };
}

status_enum!(
    Enrollment, "enrollment", {
        Active => "active",
        Inactive => "inactive",
    }
);

status_enum!(
    PaymentStanding, "payment standing", {
        UpToDate => "up-to-date",
        Pending => "pending",
        Overdue => "overdue",
    }
);

status_enum!(
    AttendanceStatus, "attendance status", {
        Present => "present",
        Late => "late",
        Absent => "absent",
    }
);

status_enum!(
    PaymentStatus, "payment status", {
        Paid => "paid",
        Pending => "pending",
        Overdue => "overdue",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub grade_section: String,
    pub age: u8,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub enrollment: Enrollment,
    /// 0.0 to 5.0
    pub academic_average: f64,
    /// 0 to 100
    pub attendance_rate: f64,
    pub payment_standing: PaymentStanding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub student_name: String,
    pub grade_section: String,
    pub status: AttendanceStatus,
    #[serde(default, with = "clock")]
    pub arrival_time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// Notes that carry actual text; blank strings count as no note.
    pub fn note(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub student_id: String,
    pub student_name: String,
    pub grade_section: String,
    pub subject: String,
    pub period1: f64,
    pub period2: f64,
    pub period3: f64,
    /// Average as stored by the data source. Only used to detect drift at
    /// load time; [`GradeRecord::average`] is always derived from the periods.
    #[serde(default)]
    pub recorded_average: Option<f64>,
}

impl GradeRecord {
    pub fn periods(&self) -> [f64; 3] {
        [self.period1, self.period2, self.period3]
    }

    /// Mean of the three periods, rounded to hundredths.
    pub fn average(&self) -> f64 {
        let mean = crate::aggregate::mean(self.periods());
        (mean * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub concept: String,
    /// Whole currency units.
    pub amount: u64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub method: Option<String>,
}

/// `HH:MM` wall-clock times, with empty strings read as no time.
mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveTime::parse_from_str(text, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(periods: [f64; 3]) -> GradeRecord {
        GradeRecord {
            student_id: "EST001".to_string(),
            student_name: "Ana María García".to_string(),
            grade_section: "10°A".to_string(),
            subject: "Matemáticas".to_string(),
            period1: periods[0],
            period2: periods[1],
            period3: periods[2],
            recorded_average: None,
        }
    }

    #[test]
    fn statuses_parse_their_kebab_case_spelling() {
        assert_eq!("up-to-date".parse::<PaymentStanding>().unwrap(), PaymentStanding::UpToDate);
        assert_eq!(" Late ".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Late);
        assert_eq!(PaymentStatus::Overdue.to_string(), "overdue");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "excused".parse::<AttendanceStatus>().unwrap_err();
        assert!(matches!(err, DashboardError::UnknownStatus { kind: "attendance status", .. }));
    }

    #[test]
    fn grade_average_is_derived_from_periods() {
        assert_eq!(grade([4.2, 4.5, 4.1]).average(), 4.27);
        assert_eq!(grade([2.8, 3.1, 3.3]).average(), 3.07);
        assert_eq!(grade([4.0, 4.0, 4.0]).average(), 4.0);
    }

    #[test]
    fn blank_notes_count_as_missing() {
        let record = AttendanceRecord {
            student_id: "EST001".to_string(),
            student_name: "Ana María García".to_string(),
            grade_section: "10°A".to_string(),
            status: AttendanceStatus::Present,
            arrival_time: None,
            notes: Some("  ".to_string()),
        };
        assert_eq!(record.note(), None);
    }

    #[test]
    fn arrival_time_round_trips_as_hours_and_minutes() {
        let json = r#"{"student_id":"EST002","student_name":"Carlos Rodríguez","grade_section":"11°B","status":"late","arrival_time":"08:15"}"#;
        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.arrival_time, NaiveTime::from_hms_opt(8, 15, 0));
        assert_eq!(record.notes, None);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["arrival_time"], "08:15");
    }
}
