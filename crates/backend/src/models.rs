// Database models for Diesel
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use shared_types::{ArtistForm, VenueForm};

/// Insertable/updatable venue columns.
///
/// `treat_none_as_null` makes an edit that blanks an optional field clear it
/// instead of leaving the old value in place.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::venues)]
#[diesel(treat_none_as_null = true)]
pub struct NewVenue {
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

impl From<&VenueForm> for NewVenue {
    fn from(form: &VenueForm) -> Self {
        NewVenue {
            name: form.name.trim().to_string(),
            city: form.city.trim().to_string(),
            state: form.state.clone(),
            address: form.address.trim().to_string(),
            phone: form.phone.clone(),
            image_link: form.image_link.clone(),
            facebook_link: form.facebook_link.clone(),
            genres: form.genres.clone(),
            website: form.website_link.clone(),
            seeking_talent: form.seeking_talent(),
            seeking_description: form.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::artists)]
#[diesel(treat_none_as_null = true)]
pub struct NewArtist {
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

impl From<&ArtistForm> for NewArtist {
    fn from(form: &ArtistForm) -> Self {
        NewArtist {
            name: form.name.trim().to_string(),
            city: form.city.trim().to_string(),
            state: form.state.clone(),
            phone: form.phone.clone(),
            genres: form.genres.clone(),
            image_link: form.image_link.clone(),
            facebook_link: form.facebook_link.clone(),
            website: form.website_link.clone(),
            seeking_venue: form.seeking_venue(),
            seeking_description: form.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::shows)]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_venue_copies_form_fields() {
        let form = VenueForm {
            name: "  The Dueling Pianos Bar ".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            address: "335 Delancey Street".to_string(),
            phone: Some("914-003-1132".to_string()),
            image_link: None,
            genres: vec!["Classical".to_string(), "R&B".to_string()],
            facebook_link: Some("https://www.facebook.com/theduelingpianos".to_string()),
            website_link: Some("https://www.theduelingpianos.com".to_string()),
            seeking_talent: None,
            seeking_description: None,
        };

        let record = NewVenue::from(&form);
        assert_eq!(record.name, "The Dueling Pianos Bar");
        assert_eq!(record.website.as_deref(), Some("https://www.theduelingpianos.com"));
        assert!(!record.seeking_talent);
        assert_eq!(record.genres.len(), 2);
    }

    #[test]
    fn test_new_artist_reads_seeking_checkbox() {
        let form = ArtistForm {
            name: "Guns N Petals".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            genres: vec!["Rock n Roll".to_string()],
            seeking_venue: Some("y".to_string()),
            seeking_description: Some("Looking for shows to perform at".to_string()),
            ..Default::default()
        };

        let record = NewArtist::from(&form);
        assert!(record.seeking_venue);
        assert_eq!(record.phone, None);
    }
}
