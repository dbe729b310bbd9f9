use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{
    AttendanceRecord, AttendanceStatus, Enrollment, GradeRecord, PaymentRecord, PaymentStanding,
    PaymentStatus, StudentRecord,
};

pub const MAX_SCORE: f64 = 5.0;

/// Performance band for a 0.0 to 5.0 score. Declared lowest first, so the
/// derived ordering is the tier rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeTier {
    NeedsImprovement,
    Acceptable,
    Good,
    Excellent,
    Outstanding,
}

impl GradeTier {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeTier::NeedsImprovement => "needs-improvement",
            GradeTier::Acceptable => "acceptable",
            GradeTier::Good => "good",
            GradeTier::Excellent => "excellent",
            GradeTier::Outstanding => "outstanding",
        }
    }
}

/// Clamp a score into 0.0..=5.0; NaN is treated as 0.0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    }
}

pub fn grade_tier(average: f64) -> GradeTier {
    let average = clamp_score(average);
    if average >= 4.5 {
        GradeTier::Outstanding
    } else if average >= 4.0 {
        GradeTier::Excellent
    } else if average >= 3.5 {
        GradeTier::Good
    } else if average >= 3.0 {
        GradeTier::Acceptable
    } else {
        GradeTier::NeedsImprovement
    }
}

pub fn progress_percent(average: f64) -> f64 {
    clamp_score(average) / MAX_SCORE * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchoolLevel {
    /// 1° to 6°
    Primary,
    /// 7° to 9°
    LowerSecondary,
    /// 10° to 11°
    UpperSecondary,
}

impl SchoolLevel {
    pub const ALL: [SchoolLevel; 3] = [
        SchoolLevel::Primary,
        SchoolLevel::LowerSecondary,
        SchoolLevel::UpperSecondary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SchoolLevel::Primary => "primary",
            SchoolLevel::LowerSecondary => "lower-secondary",
            SchoolLevel::UpperSecondary => "upper-secondary",
        }
    }

    /// Level of a section such as `"10°A"`, read from its leading number.
    pub fn of_section(section: &str) -> Option<SchoolLevel> {
        let digits: String = section
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        match digits.parse::<u8>().ok()? {
            1..=6 => Some(SchoolLevel::Primary),
            7..=9 => Some(SchoolLevel::LowerSecondary),
            10..=11 => Some(SchoolLevel::UpperSecondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudentTier {
    pub enrollment: Enrollment,
    pub payment: PaymentStanding,
    pub academic: GradeTier,
}

pub trait Classify {
    type Tier: Copy + fmt::Debug + Serialize;

    fn tier(&self) -> Self::Tier;

    /// Numeric value the tier was derived from, when there is one.
    fn score(&self) -> Option<f64> {
        None
    }
}

impl Classify for StudentRecord {
    type Tier = StudentTier;

    fn tier(&self) -> StudentTier {
        StudentTier {
            enrollment: self.enrollment,
            payment: self.payment_standing,
            academic: grade_tier(self.academic_average),
        }
    }

    fn score(&self) -> Option<f64> {
        Some(self.academic_average)
    }
}

impl Classify for GradeRecord {
    type Tier = GradeTier;

    fn tier(&self) -> GradeTier {
        grade_tier(self.average())
    }

    fn score(&self) -> Option<f64> {
        Some(self.average())
    }
}

impl Classify for AttendanceRecord {
    type Tier = AttendanceStatus;

    fn tier(&self) -> AttendanceStatus {
        self.status
    }
}

impl Classify for PaymentRecord {
    type Tier = PaymentStatus;

    fn tier(&self) -> PaymentStatus {
        self.status
    }
}
