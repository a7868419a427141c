//! Page assembly for venues and artists.
//!
//! Handlers ask for a finished view model; the queries and the past/upcoming
//! bookkeeping live here so they can be reused by the CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel_async::AsyncPgConnection;
use shared_types::{
    Area, ArtistDetail, ArtistSummary, SearchResults, VenueDetail, VenueSummary,
};

use super::timeline::{group_by_area, Timeline};
use crate::db::{artists, shows, venues};

/// Service for catalog-related page data
pub struct CatalogService;

impl CatalogService {
    /// All venues grouped by city and state, with upcoming show counts
    pub async fn venue_areas(conn: &mut AsyncPgConnection, now: DateTime<Utc>) -> Result<Vec<Area>> {
        let all = venues::list_all(conn)
            .await
            .context("Failed to load venues")?;
        let upcoming = shows::upcoming_counts_by_venue(conn, now)
            .await
            .context("Failed to count upcoming shows")?;

        Ok(group_by_area(all, &upcoming))
    }

    pub async fn search_venues(
        conn: &mut AsyncPgConnection,
        term: &str,
        now: DateTime<Utc>,
    ) -> Result<SearchResults<VenueSummary>> {
        let found = venues::search_by_name(conn, term)
            .await
            .context("Failed to search venues")?;
        let upcoming = shows::upcoming_counts_by_venue(conn, now).await?;

        let data = found
            .into_iter()
            .map(|venue| VenueSummary {
                num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
                id: venue.id,
                name: venue.name,
            })
            .collect();

        Ok(SearchResults::new(data))
    }

    /// Venue page data, or `None` when the venue does not exist
    pub async fn venue_detail(
        conn: &mut AsyncPgConnection,
        venue_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<VenueDetail>> {
        let Some(venue) = venues::get_by_id(conn, venue_id).await? else {
            return Ok(None);
        };

        let booked = shows::for_venue(conn, venue_id)
            .await
            .context("Failed to load venue shows")?;
        let timeline = Timeline::split(booked, now, |show| show.start_time);

        Ok(Some(VenueDetail {
            venue,
            past_shows_count: timeline.past.len(),
            upcoming_shows_count: timeline.upcoming.len(),
            past_shows: timeline.past,
            upcoming_shows: timeline.upcoming,
        }))
    }

    /// Every artist, in id order
    pub async fn artist_summaries(
        conn: &mut AsyncPgConnection,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArtistSummary>> {
        let all = artists::list_all(conn)
            .await
            .context("Failed to load artists")?;
        let upcoming = shows::upcoming_counts_by_artist(conn, now).await?;

        Ok(all
            .into_iter()
            .map(|artist| ArtistSummary {
                num_upcoming_shows: upcoming.get(&artist.id).copied().unwrap_or(0),
                id: artist.id,
                name: artist.name,
            })
            .collect())
    }

    pub async fn search_artists(
        conn: &mut AsyncPgConnection,
        term: &str,
        now: DateTime<Utc>,
    ) -> Result<SearchResults<ArtistSummary>> {
        let found = artists::search_by_name(conn, term)
            .await
            .context("Failed to search artists")?;
        let upcoming = shows::upcoming_counts_by_artist(conn, now).await?;

        let data = found
            .into_iter()
            .map(|artist| ArtistSummary {
                num_upcoming_shows: upcoming.get(&artist.id).copied().unwrap_or(0),
                id: artist.id,
                name: artist.name,
            })
            .collect();

        Ok(SearchResults::new(data))
    }

    /// Artist page data, or `None` when the artist does not exist
    pub async fn artist_detail(
        conn: &mut AsyncPgConnection,
        artist_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<ArtistDetail>> {
        let Some(artist) = artists::get_by_id(conn, artist_id).await? else {
            return Ok(None);
        };

        let booked = shows::for_artist(conn, artist_id)
            .await
            .context("Failed to load artist shows")?;
        let timeline = Timeline::split(booked, now, |show| show.start_time);

        Ok(Some(ArtistDetail {
            artist,
            past_shows_count: timeline.past.len(),
            upcoming_shows_count: timeline.upcoming.len(),
            past_shows: timeline.past,
            upcoming_shows: timeline.upcoming,
        }))
    }
}
