use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{
    async_connection_wrapper::AsyncConnectionWrapper,
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use shared_types::{Artist, Show, Venue};

use crate::models::{NewArtist, NewShow, NewVenue};

pub type DbPool = Pool<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    // Set up rustls TLS configuration
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?
    .with_root_certificates(root_store)
    .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    // TLS is negotiated according to the sslmode in the URL
    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

/// Build the connection pool. No connection is opened until the first checkout.
pub fn establish_connection_pool(database_url: &str, max_size: usize) -> anyhow::Result<DbPool> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup =
        Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
        database_url,
        manager_config,
    );
    let pool = Pool::builder(config).max_size(max_size).build()?;

    Ok(pool)
}

/// Apply any migrations that have not run yet, returning how many were applied.
pub async fn run_migrations(database_url: &str) -> anyhow::Result<usize> {
    let conn = establish_tls_connection(database_url.to_string()).await?;
    let mut harness: AsyncConnectionWrapper<AsyncPgConnection> = AsyncConnectionWrapper::from(conn);

    // The harness drives the async connection synchronously, so keep it off the runtime threads
    let applied = tokio::task::spawn_blocking(move || {
        harness
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| {
                for version in &versions {
                    tracing::info!("Applied migration {}", version);
                }
                versions.len()
            })
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))
    })
    .await??;

    Ok(applied)
}

/// Escape `LIKE` wildcards so a search term only ever matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// Venue database operations
pub mod venues {
    use super::*;

    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Venue>> {
        use crate::schema::venues::dsl::*;

        let items = venues.order_by(id.asc()).load::<Venue>(conn).await?;

        Ok(items)
    }

    pub async fn get_by_id(
        conn: &mut AsyncPgConnection,
        venue_id: i32,
    ) -> anyhow::Result<Option<Venue>> {
        use crate::schema::venues::dsl::*;

        let venue = venues
            .find(venue_id)
            .first::<Venue>(conn)
            .await
            .optional()?;

        Ok(venue)
    }

    /// Case-insensitive substring match on the venue name.
    pub async fn search_by_name(
        conn: &mut AsyncPgConnection,
        term: &str,
    ) -> anyhow::Result<Vec<Venue>> {
        use crate::schema::venues::dsl::*;

        let items = venues
            .filter(name.ilike(like_pattern(term)))
            .order_by(id.asc())
            .load::<Venue>(conn)
            .await?;

        Ok(items)
    }

    pub async fn create(conn: &mut AsyncPgConnection, record: &NewVenue) -> anyhow::Result<Venue> {
        use crate::schema::venues::dsl::*;

        let venue = diesel::insert_into(venues)
            .values(record)
            .get_result::<Venue>(conn)
            .await?;

        Ok(venue)
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        venue_id: i32,
        record: &NewVenue,
    ) -> anyhow::Result<Option<Venue>> {
        use crate::schema::venues::dsl::*;

        let updated = diesel::update(venues.find(venue_id))
            .set(record)
            .get_result::<Venue>(conn)
            .await
            .optional()?;

        Ok(updated)
    }

    /// Delete a venue; its shows go with it through the foreign key cascade.
    pub async fn delete(conn: &mut AsyncPgConnection, venue_id: i32) -> anyhow::Result<bool> {
        use crate::schema::venues::dsl::*;

        let removed = diesel::delete(venues.find(venue_id)).execute(conn).await?;

        Ok(removed > 0)
    }
}

// Artist database operations
pub mod artists {
    use super::*;

    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Artist>> {
        use crate::schema::artists::dsl::*;

        let items = artists.order_by(id.asc()).load::<Artist>(conn).await?;

        Ok(items)
    }

    pub async fn get_by_id(
        conn: &mut AsyncPgConnection,
        artist_id: i32,
    ) -> anyhow::Result<Option<Artist>> {
        use crate::schema::artists::dsl::*;

        let artist = artists
            .find(artist_id)
            .first::<Artist>(conn)
            .await
            .optional()?;

        Ok(artist)
    }

    pub async fn search_by_name(
        conn: &mut AsyncPgConnection,
        term: &str,
    ) -> anyhow::Result<Vec<Artist>> {
        use crate::schema::artists::dsl::*;

        let items = artists
            .filter(name.ilike(like_pattern(term)))
            .order_by(id.asc())
            .load::<Artist>(conn)
            .await?;

        Ok(items)
    }

    pub async fn create(conn: &mut AsyncPgConnection, record: &NewArtist) -> anyhow::Result<Artist> {
        use crate::schema::artists::dsl::*;

        let artist = diesel::insert_into(artists)
            .values(record)
            .get_result::<Artist>(conn)
            .await?;

        Ok(artist)
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        artist_id: i32,
        record: &NewArtist,
    ) -> anyhow::Result<Option<Artist>> {
        use crate::schema::artists::dsl::*;

        let updated = diesel::update(artists.find(artist_id))
            .set(record)
            .get_result::<Artist>(conn)
            .await
            .optional()?;

        Ok(updated)
    }

    pub async fn delete(conn: &mut AsyncPgConnection, artist_id: i32) -> anyhow::Result<bool> {
        use crate::schema::artists::dsl::*;

        let removed = diesel::delete(artists.find(artist_id)).execute(conn).await?;

        Ok(removed > 0)
    }
}

// Show database operations
pub mod shows {
    use super::*;
    use crate::schema::{artists, shows, venues};
    use shared_types::{ArtistAppearance, ShowListing, VenueAppearance};

    /// Every show with the names needed to list it, earliest first.
    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<ShowListing>> {
        let rows = shows::table
            .inner_join(venues::table)
            .inner_join(artists::table)
            .select((
                shows::venue_id,
                venues::name,
                shows::artist_id,
                artists::name,
                artists::image_link,
                shows::start_time,
            ))
            .order_by((shows::start_time.asc(), shows::id.asc()))
            .load::<(i32, String, i32, String, Option<String>, DateTime<Utc>)>(conn)
            .await?;

        let listings = rows
            .into_iter()
            .map(
                |(venue_id, venue_name, artist_id, artist_name, artist_image_link, start_time)| {
                    ShowListing {
                        venue_id,
                        venue_name,
                        artist_id,
                        artist_name,
                        artist_image_link,
                        start_time,
                    }
                },
            )
            .collect();

        Ok(listings)
    }

    /// Shows booked at a venue, with the performing artist.
    pub async fn for_venue(
        conn: &mut AsyncPgConnection,
        venue_id: i32,
    ) -> anyhow::Result<Vec<ArtistAppearance>> {
        let rows = shows::table
            .inner_join(artists::table)
            .filter(shows::venue_id.eq(venue_id))
            .select((
                artists::id,
                artists::name,
                artists::image_link,
                shows::start_time,
            ))
            .order_by((shows::start_time.asc(), shows::id.asc()))
            .load::<(i32, String, Option<String>, DateTime<Utc>)>(conn)
            .await?;

        let appearances = rows
            .into_iter()
            .map(
                |(artist_id, artist_name, artist_image_link, start_time)| ArtistAppearance {
                    artist_id,
                    artist_name,
                    artist_image_link,
                    start_time,
                },
            )
            .collect();

        Ok(appearances)
    }

    /// Shows an artist plays, with the hosting venue.
    pub async fn for_artist(
        conn: &mut AsyncPgConnection,
        artist_id: i32,
    ) -> anyhow::Result<Vec<VenueAppearance>> {
        let rows = shows::table
            .inner_join(venues::table)
            .filter(shows::artist_id.eq(artist_id))
            .select((
                venues::id,
                venues::name,
                venues::image_link,
                shows::start_time,
            ))
            .order_by((shows::start_time.asc(), shows::id.asc()))
            .load::<(i32, String, Option<String>, DateTime<Utc>)>(conn)
            .await?;

        let appearances = rows
            .into_iter()
            .map(
                |(venue_id, venue_name, venue_image_link, start_time)| VenueAppearance {
                    venue_id,
                    venue_name,
                    venue_image_link,
                    start_time,
                },
            )
            .collect();

        Ok(appearances)
    }

    /// Number of shows starting after `now`, keyed by venue id.
    pub async fn upcoming_counts_by_venue(
        conn: &mut AsyncPgConnection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<i32, usize>> {
        let rows = shows::table
            .filter(shows::start_time.gt(now))
            .group_by(shows::venue_id)
            .select((shows::venue_id, diesel::dsl::count(shows::id)))
            .load::<(i32, i64)>(conn)
            .await?;

        Ok(into_count_map(rows))
    }

    /// Number of shows starting after `now`, keyed by artist id.
    pub async fn upcoming_counts_by_artist(
        conn: &mut AsyncPgConnection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<i32, usize>> {
        let rows = shows::table
            .filter(shows::start_time.gt(now))
            .group_by(shows::artist_id)
            .select((shows::artist_id, diesel::dsl::count(shows::id)))
            .load::<(i32, i64)>(conn)
            .await?;

        Ok(into_count_map(rows))
    }

    pub async fn create(conn: &mut AsyncPgConnection, record: &NewShow) -> anyhow::Result<Show> {
        let show = diesel::insert_into(shows::table)
            .values(record)
            .get_result::<Show>(conn)
            .await?;

        Ok(show)
    }

    fn into_count_map(rows: Vec<(i32, i64)>) -> HashMap<i32, usize> {
        rows.into_iter()
            .map(|(key, count)| (key, usize::try_from(count).unwrap_or_default()))
            .collect()
    }
}
