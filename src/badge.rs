use crate::error::BadgeError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Number of sheet columns a badge row occupies (extended schema)
pub const ROW_WIDTH: usize = 12;

/// A single badge row as stored in the sheet
///
/// Columns in order: id, name, university, major, graduationDate, github,
/// profileUrl, qrCode, then the optional extended columns profilePhoto,
/// skills, interests, yearInCollege. Rows written before the extended
/// columns existed are shorter; missing cells read back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    pub id: String,
    pub name: String,
    pub university: String,
    pub major: String,
    pub graduation_date: String,
    pub github: String,
    pub profile_url: String,
    pub qr_code: String,
    pub profile_photo: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub year_in_college: Option<String>,
}

/// Incoming attendee submission
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBadge {
    pub name: String,
    pub university: String,
    pub major: String,
    pub graduation_date: String,
    #[serde(default)]
    pub github: Option<String>,
}

/// Public-safe projection returned by the lookup API (no QR column)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSummary {
    pub id: String,
    pub name: String,
    pub university: String,
    pub major: String,
    pub graduation_date: String,
    pub github: String,
    pub profile_url: String,
}

impl NewBadge {
    /// Validate that every field except github is non-empty
    pub fn validate(&self) -> Result<(), BadgeError> {
        if self.name.trim().is_empty() {
            return Err(BadgeError::MissingField("name"));
        }
        if self.university.trim().is_empty() {
            return Err(BadgeError::MissingField("university"));
        }
        if self.major.trim().is_empty() {
            return Err(BadgeError::MissingField("major"));
        }
        if self.graduation_date.trim().is_empty() {
            return Err(BadgeError::MissingField("graduationDate"));
        }
        Ok(())
    }

    /// GitHub handle as stored: absent submissions become the empty string
    pub fn github_or_empty(&self) -> &str {
        self.github.as_deref().unwrap_or("")
    }
}

impl BadgeRecord {
    /// Parse a badge record from a sheet row, padding missing trailing cells
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let opt_cell = |i: usize| row.get(i).filter(|s| !s.is_empty()).cloned();

        Self {
            id: cell(0),
            name: cell(1),
            university: cell(2),
            major: cell(3),
            graduation_date: cell(4),
            github: cell(5),
            profile_url: cell(6),
            qr_code: cell(7),
            profile_photo: opt_cell(8),
            skills: opt_cell(9),
            interests: opt_cell(10),
            year_in_college: opt_cell(11),
        }
    }

    /// Serialize the record into a sheet row
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.university.clone(),
            self.major.clone(),
            self.graduation_date.clone(),
            self.github.clone(),
            self.profile_url.clone(),
            self.qr_code.clone(),
            self.profile_photo.clone().unwrap_or_default(),
            self.skills.clone().unwrap_or_default(),
            self.interests.clone().unwrap_or_default(),
            self.year_in_college.clone().unwrap_or_default(),
        ]
    }

    /// Project to the public API subset
    pub fn summary(&self) -> BadgeSummary {
        BadgeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            university: self.university.clone(),
            major: self.major.clone(),
            graduation_date: self.graduation_date.clone(),
            github: self.github.clone(),
            profile_url: self.profile_url.clone(),
        }
    }
}

/// Generate a new time-based badge identifier.
///
/// Epoch milliseconds as a decimal string. Uniqueness is probabilistic: two
/// submissions landing in the same millisecond would collide, which is
/// accepted for this workload.
pub fn new_identifier() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Derive the public profile URL for an identifier
pub fn profile_url(base_url: &str, id: &str) -> String {
    format!("{}/profile/{}", base_url.trim_end_matches('/'), id)
}
