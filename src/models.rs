use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api_models::{NewComplaint, NewSuggestion};
use crate::error::AppError;
use crate::store::Record;

/**
 * Where a suggestion is in the review process, always `Pending` when submitted
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Implemented,
    Rejected,
}

/**
 * Where a complaint is in the resolution process, always `Open` when filed
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub votes: u64,
    pub created_at: DateTime<Utc>,
    pub status: SuggestionStatus,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub votes: u64,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

/**
 * Presence check shared by every submission form: absent and empty are both missing
 */
fn required(field: Option<String>) -> Result<String, AppError> {
    field.filter(|v| !v.is_empty()).ok_or(AppError::MissingField)
}

impl Record for Suggestion {
    const KIND: &'static str = "Suggestion";
    type Draft = NewSuggestion;

    fn from_draft(id: u64, draft: NewSuggestion, now: DateTime<Utc>) -> Result<Self, AppError> {
        Ok(Self {
            id,
            title: required(draft.title)?,
            description: required(draft.description)?,
            category: required(draft.category)?,
            votes: 0,
            created_at: now,
            status: SuggestionStatus::Pending,
        })
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn votes(&self) -> u64 {
        self.votes
    }

    fn upvote(&mut self) {
        self.votes += 1;
    }
}

impl Record for Complaint {
    const KIND: &'static str = "Complaint";
    type Draft = NewComplaint;

    fn from_draft(id: u64, draft: NewComplaint, now: DateTime<Utc>) -> Result<Self, AppError> {
        Ok(Self {
            id,
            title: required(draft.title)?,
            description: required(draft.description)?,
            category: required(draft.category)?,
            image_url: draft.image_url.filter(|url| !url.is_empty()),
            location: draft.location,
            votes: 0,
            status: ComplaintStatus::Open,
            created_at: now,
        })
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn votes(&self) -> u64 {
        self.votes
    }

    fn upvote(&mut self) {
        self.votes += 1;
    }
}
