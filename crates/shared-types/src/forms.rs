//! Form payloads posted by the create/edit pages.
//!
//! Field names follow the HTML forms, so `website_link` maps onto the
//! `website` column and checkboxes arrive as `"y"` when ticked.

use std::borrow::Cow;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::choices;
use crate::{Artist, Venue};

const CHECKED: &str = "y";

/// Accepted layouts for a show's start time, tried in order.
const START_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VenueForm {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 120, message = "City is required"))]
    pub city: String,
    #[validate(custom = "validate_state")]
    pub state: String,
    #[validate(length(min = 1, max = 120, message = "Address is required"))]
    pub address: String,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "Image link must be a valid URL"))]
    pub image_link: Option<String>,
    #[validate(custom = "validate_genres")]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "Facebook link must be a valid URL"))]
    pub facebook_link: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "Website link must be a valid URL"))]
    pub website_link: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub seeking_talent: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(length(max = 300, message = "Seeking description is too long"))]
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn seeking_talent(&self) -> bool {
        is_checked(&self.seeking_talent)
    }
}

impl From<&Venue> for VenueForm {
    fn from(venue: &Venue) -> Self {
        VenueForm {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            image_link: venue.image_link.clone(),
            genres: venue.genres.clone(),
            facebook_link: venue.facebook_link.clone(),
            website_link: venue.website.clone(),
            seeking_talent: checkbox(venue.seeking_talent),
            seeking_description: venue.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ArtistForm {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 120, message = "City is required"))]
    pub city: String,
    #[validate(custom = "validate_state")]
    pub state: String,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "Image link must be a valid URL"))]
    pub image_link: Option<String>,
    #[validate(custom = "validate_genres")]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "Facebook link must be a valid URL"))]
    pub facebook_link: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "Website link must be a valid URL"))]
    pub website_link: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub seeking_venue: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(length(max = 300, message = "Seeking description is too long"))]
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn seeking_venue(&self) -> bool {
        is_checked(&self.seeking_venue)
    }
}

impl From<&Artist> for ArtistForm {
    fn from(artist: &Artist) -> Self {
        ArtistForm {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone.clone(),
            image_link: artist.image_link.clone(),
            genres: artist.genres.clone(),
            facebook_link: artist.facebook_link.clone(),
            website_link: artist.website.clone(),
            seeking_venue: checkbox(artist.seeking_venue),
            seeking_description: artist.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    #[validate(custom = "validate_start_time")]
    pub start_time: String,
}

impl ShowForm {
    /// Blank form with the start time pre-filled, like the create page shows it.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        ShowForm {
            start_time: now.format(START_TIME_LAYOUTS[0]).to_string(),
            ..Default::default()
        }
    }

    pub fn artist_id(&self) -> Option<i32> {
        self.artist_id.trim().parse().ok()
    }

    pub fn venue_id(&self) -> Option<i32> {
        self.venue_id.trim().parse().ok()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        parse_start_time(&self.start_time)
    }
}

/// Parse a submitted start time. Inputs without an offset are taken as UTC.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let parsed = START_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| naive.and_utc());

    if parsed.is_none() {
        tracing::debug!("Unparseable start time: {:?}", raw);
    }
    parsed
}

/// Flatten validation errors into one line per problem, sorted by field.
pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}

fn is_checked(value: &Option<String>) -> bool {
    value.as_deref() == Some(CHECKED)
}

fn checkbox(checked: bool) -> Option<String> {
    checked.then(|| CHECKED.to_string())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_state(value: &str) -> Result<(), ValidationError> {
    if choices::is_state(value) {
        Ok(())
    } else {
        Err(invalid("state", "State must be a valid US state code"))
    }
}

fn validate_genres(values: &[String]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(invalid("genres", "Pick at least one genre"));
    }
    if values.iter().all(|g| choices::is_genre(g)) {
        Ok(())
    } else {
        Err(invalid("genres", "Genres must come from the list"))
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    let re = PHONE.get_or_init(|| Regex::new(r"^\d{3}-\d{3}-\d{4}$").expect("valid phone regex"));

    if re.is_match(value) {
        Ok(())
    } else {
        Err(invalid("phone", "Phone must look like xxx-xxx-xxxx"))
    }
}

fn validate_start_time(value: &str) -> Result<(), ValidationError> {
    match parse_start_time(value) {
        Some(_) => Ok(()),
        None => Err(invalid("start_time", "Start time must be a date and time")),
    }
}
