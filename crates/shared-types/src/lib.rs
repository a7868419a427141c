use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod choices;
pub mod forms;

pub use forms::{ArtistForm, ShowForm, VenueForm};

/// Format used wherever a show's start time leaves the server as text.
pub const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Venue struct matching database column order exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

/// Artist struct matching database column order exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Show {
    pub id: i32,
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<Utc>,
}

// ============================================================================
// Page view models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

/// Venues sharing a city and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> SearchResults<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// A show as listed on a venue's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(serialize_with = "start_time::serialize")]
    pub start_time: DateTime<Utc>,
}

/// A show as listed on an artist's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    #[serde(serialize_with = "start_time::serialize")]
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(serialize_with = "start_time::serialize")]
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    pub past_shows: Vec<ArtistAppearance>,
    pub upcoming_shows: Vec<ArtistAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub past_shows: Vec<VenueAppearance>,
    pub upcoming_shows: Vec<VenueAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

mod start_time {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(super::START_TIME_FORMAT))
    }
}
