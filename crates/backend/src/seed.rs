//! Sample catalog used by `fyyur-cli seed` and the database-backed tests.

use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use diesel_async::AsyncPgConnection;

use crate::db::{artists, shows, venues};
use crate::models::{NewArtist, NewShow, NewVenue};

/// Ids of the rows inserted by [`sample_data`], in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub venue_ids: Vec<i32>,
    pub artist_ids: Vec<i32>,
    pub show_ids: Vec<i32>,
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> anyhow::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .with_context(|| format!("Invalid seed date {}-{}-{} {}:00", year, month, day, hour))
}

fn genres(names: &[&str]) -> Vec<String> {
    names.iter().map(|g| g.to_string()).collect()
}

/// Insert the sample venues, artists and shows. Two shows are in the past
/// and three far in the future.
pub async fn sample_data(conn: &mut AsyncPgConnection) -> anyhow::Result<SeedSummary> {

    let musical_hop = venues::create(
        conn,
        &NewVenue {
            name: "The Musical Hop".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: "1015 Folsom Street".to_string(),
            phone: Some("123-123-1234".to_string()),
            image_link: Some("https://images.unsplash.com/photo-1543900694-133f37abaaa5?w=400".to_string()),
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".to_string()),
            genres: genres(&["Jazz", "Reggae", "Classical", "Folk"]),
            website: Some("https://www.themusicalhop.com".to_string()),
            seeking_talent: true,
            seeking_description: Some(
                "We are on the lookout for a local artist to play every two weeks. Please call us."
                    .to_string(),
            ),
        },
    )
    .await?;

    let dueling_pianos = venues::create(
        conn,
        &NewVenue {
            name: "The Dueling Pianos Bar".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            address: "335 Delancey Street".to_string(),
            phone: Some("914-003-1132".to_string()),
            image_link: Some("https://images.unsplash.com/photo-1497032205916-ac775f0649ae?w=750".to_string()),
            facebook_link: Some("https://www.facebook.com/theduelingpianos".to_string()),
            genres: genres(&["Classical", "R&B", "Hip-Hop"]),
            website: Some("https://www.theduelingpianos.com".to_string()),
            seeking_talent: false,
            seeking_description: None,
        },
    )
    .await?;

    let park_square = venues::create(
        conn,
        &NewVenue {
            name: "Park Square Live Music & Coffee".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            address: "34 Whiskey Moore Ave".to_string(),
            phone: Some("415-000-1234".to_string()),
            image_link: Some("https://images.unsplash.com/photo-1485686531765-ba63b07845a7?w=747".to_string()),
            facebook_link: Some("https://www.facebook.com/ParkSquareLiveMusicAndCoffee".to_string()),
            genres: genres(&["Rock n Roll", "Jazz", "Classical", "Folk"]),
            website: Some("https://www.parksquarelivemusicandcoffee.com".to_string()),
            seeking_talent: false,
            seeking_description: None,
        },
    )
    .await?;

    let guns_n_petals = artists::create(
        conn,
        &NewArtist {
            name: "Guns N Petals".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: Some("326-123-5000".to_string()),
            genres: genres(&["Rock n Roll"]),
            image_link: Some("https://images.unsplash.com/photo-1549213783-8284d0336c4f?w=300".to_string()),
            facebook_link: Some("https://www.facebook.com/GunsNPetals".to_string()),
            website: Some("https://www.gunsnpetalsband.com".to_string()),
            seeking_venue: true,
            seeking_description: Some(
                "Looking for shows to perform at in the San Francisco Bay Area!".to_string(),
            ),
        },
    )
    .await?;

    let matt_quevedo = artists::create(
        conn,
        &NewArtist {
            name: "Matt Quevedo".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            phone: Some("300-400-5000".to_string()),
            genres: genres(&["Jazz"]),
            image_link: Some("https://images.unsplash.com/photo-1495223153807-b916f75de8c5?w=334".to_string()),
            facebook_link: Some("https://www.facebook.com/mattquevedo923251523".to_string()),
            website: None,
            seeking_venue: false,
            seeking_description: None,
        },
    )
    .await?;

    let wild_sax = artists::create(
        conn,
        &NewArtist {
            name: "The Wild Sax Band".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            phone: Some("432-325-5432".to_string()),
            genres: genres(&["Jazz", "Classical"]),
            image_link: Some("https://images.unsplash.com/photo-1558369981-f9ca78462e61?w=794".to_string()),
            facebook_link: None,
            website: None,
            seeking_venue: false,
            seeking_description: None,
        },
    )
    .await?;

    let bookings = [
        (guns_n_petals.id, musical_hop.id, at(2019, 5, 21, 21)?),
        (matt_quevedo.id, park_square.id, at(2019, 6, 15, 23)?),
        (wild_sax.id, park_square.id, at(2035, 4, 1, 20)?),
        (wild_sax.id, park_square.id, at(2035, 4, 8, 20)?),
        (wild_sax.id, dueling_pianos.id, at(2035, 4, 15, 20)?),
    ];
    let mut show_ids = Vec::with_capacity(bookings.len());
    for (artist_id, venue_id, start_time) in bookings {
        let show = shows::create(
            conn,
            &NewShow {
                artist_id,
                venue_id,
                start_time,
            },
        )
        .await?;
        show_ids.push(show.id);
    }

    Ok(SeedSummary {
        venue_ids: vec![musical_hop.id, dueling_pianos.id, park_square.id],
        artist_ids: vec![guns_n_petals.id, matt_quevedo.id, wild_sax.id],
        show_ids,
    })
}
