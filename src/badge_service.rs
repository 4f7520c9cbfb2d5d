use crate::badge::{self, BadgeRecord, BadgeSummary, NewBadge};
use crate::error::BadgeError;
use crate::qr;
use crate::sheet_store::RecordStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Response for a successful badge creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBadge {
    pub id: String,
    pub profile_url: String,
    pub qr_code: String,
}

/// Badge creation and lookup over a record store
///
/// Holds no per-request state; every call reads the full range from the
/// store. Two identical submissions racing through `create` can both pass
/// the duplicate scan before either append lands; the storage layer offers
/// no guard against that and this service does not add one.
pub struct BadgeService {
    store: Arc<dyn RecordStore>,
    base_url: String,
}

impl BadgeService {
    pub fn new(store: Arc<dyn RecordStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    /// Validate a submission, reject duplicates, and append a new badge row.
    ///
    /// A submission is a duplicate when an existing row matches on the
    /// (name, university, github) triple exactly; an absent github handle
    /// compares equal to a stored empty cell.
    #[instrument(skip(self, submission), fields(name = %submission.name))]
    pub async fn create(&self, submission: NewBadge) -> Result<CreatedBadge, BadgeError> {
        submission.validate()?;

        let github = submission.github_or_empty().to_string();
        let rows = self.store.read_rows().await?;
        let duplicate = rows.iter().any(|row| {
            row.get(1).map(String::as_str) == Some(submission.name.as_str())
                && row.get(2).map(String::as_str) == Some(submission.university.as_str())
                && row.get(5).map(String::as_str).unwrap_or("") == github.as_str()
        });

        if duplicate {
            warn!(name = %submission.name, "Duplicate badge submission rejected");
            metrics::counter!("badges.duplicate_rejected").increment(1);
            return Err(BadgeError::DuplicateSubmission);
        }

        let id = badge::new_identifier();
        let profile_url = badge::profile_url(&self.base_url, &id);
        let qr_code = qr::data_url(&profile_url)?;

        let record = BadgeRecord {
            id: id.clone(),
            name: submission.name,
            university: submission.university,
            major: submission.major,
            graduation_date: submission.graduation_date,
            github,
            profile_url: profile_url.clone(),
            qr_code: qr_code.clone(),
            profile_photo: None,
            skills: None,
            interests: None,
            year_in_college: None,
        };

        self.store.append_row(record.to_row()).await?;

        info!(id = %id, "Badge created");
        metrics::counter!("badges.created").increment(1);

        Ok(CreatedBadge {
            id,
            profile_url,
            qr_code,
        })
    }

    /// Look up a badge by identifier, projected to the public subset
    #[instrument(skip(self))]
    pub async fn lookup(&self, id: &str) -> Result<BadgeSummary, BadgeError> {
        Ok(self.fetch_record(id).await?.summary())
    }

    /// Fetch the full badge record for an identifier.
    ///
    /// Used by profile rendering, which also needs the QR image and the
    /// extended optional columns.
    pub async fn fetch_record(&self, id: &str) -> Result<BadgeRecord, BadgeError> {
        let rows = self.store.read_rows().await?;

        let row = rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(id));

        match row {
            Some(row) => Ok(BadgeRecord::from_row(row)),
            None => {
                metrics::counter!("badges.lookup_not_found").increment(1);
                Err(BadgeError::NotFound)
            }
        }
    }
}
