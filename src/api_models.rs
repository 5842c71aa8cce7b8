use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Complaint, Location, Suggestion};
use crate::news::{NewsItem, TrendingTopic};
use crate::tally::Tally;

/**
 * User-provided details to submit a suggestion
 *
 * Every field is optional on the wire so that a missing one is reported as a validation
 * failure rather than a parse failure.
 */
#[derive(Debug, Default, Deserialize)]
pub struct NewSuggestion {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/**
 * User-provided details to file a complaint
 */
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<Location>,
}

/**
 * User-provided ballot for the poll
 */
#[derive(Debug, Default, Deserialize)]
pub struct Ballot {
    pub vote: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectionsQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/**
 * The one poll residents can vote in
 */
#[derive(Debug, Serialize)]
pub struct Poll {
    pub id: u32,
    pub question: &'static str,
    pub options: [&'static str; 3],
    pub category: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub poll: &'static Poll,
    pub results: Tally,
    pub total_votes: u64,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub message: &'static str,
    pub results: Tally,
    pub total_votes: u64,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub news: Vec<&'static NewsItem>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub trending: &'static [TrendingTopic],
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ComplaintsResponse {
    pub complaints: Vec<Complaint>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}
