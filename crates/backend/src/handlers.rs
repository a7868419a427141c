use askama::Template;
use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, WithRejection};
use chrono::Utc;
use serde::Deserialize;
use shared_types::{forms::error_messages, ArtistForm, ShowForm, VenueForm};
use validator::Validate;

use crate::db::{artists, shows, venues, DbPool};
use crate::error::{ApiError, ApiResult};
use crate::flash::Flash;
use crate::models::{NewArtist, NewShow, NewVenue};
use crate::services::CatalogService;
use crate::templates::{
    ArtistsTemplate, EditArtistTemplate, EditVenueTemplate, HomeTemplate, NewArtistTemplate,
    NewShowTemplate, NewVenueTemplate, SearchArtistsTemplate, SearchVenuesTemplate,
    ShowArtistTemplate, ShowVenueTemplate, ShowsTemplate, VenuesTemplate,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

/// Form payload whose rejection renders the error pages like any other failure.
type FormInput<T> = WithRejection<Form<T>, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Venue,
    Artist,
}

impl Listing {
    fn label(self) -> &'static str {
        match self {
            Listing::Venue => "Venue",
            Listing::Artist => "Artist",
        }
    }
}

pub fn missing_message(kind: Listing, id: i32) -> String {
    format!("{} id {} does not exist.", kind.label(), id)
}

/// `created` carries the stored name, `None` when the insert failed.
pub fn listed_message(kind: Listing, submitted_name: &str, created: Option<&str>) -> String {
    match created {
        Some(name) => format!("{} {} was successfully listed!", kind.label(), name),
        None => format!(
            "An error occurred. {} {} could not be listed.",
            kind.label(),
            submitted_name
        ),
    }
}

pub fn updated_message(kind: Listing, id: i32, updated: Option<&str>) -> String {
    match updated {
        Some(name) => format!("{} {} was successfully updated.", kind.label(), name),
        None => format!(
            "An error occurred. {} id {} could not be updated.",
            kind.label(),
            id
        ),
    }
}

/// Status and flash text for a delete, given whether a row was removed.
pub fn delete_outcome(kind: Listing, id: i32, removed: &anyhow::Result<bool>) -> (StatusCode, String) {
    let failed = format!(
        "An error occurred. {} id {} could not be deleted.",
        kind.label(),
        id
    );
    match removed {
        Ok(true) => (
            StatusCode::NO_CONTENT,
            format!("{} id {} was successfully deleted.", kind.label(), id),
        ),
        Ok(false) => (StatusCode::NOT_FOUND, failed),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, failed),
    }
}

/// Flash for a show naming an artist or venue that does not exist.
pub fn unknown_party_message(kind: Listing, raw_id: &str) -> String {
    format!(
        "No {} could be found for ID {}",
        kind.label().to_lowercase(),
        raw_id.trim()
    )
}

pub fn show_listed_message(listed: bool) -> String {
    if listed {
        "Show was successfully listed!".to_string()
    } else {
        "An error occurred. Show could not be listed.".to_string()
    }
}

/// Render a page, showing (and clearing) any pending flash messages.
fn render<T: Template>(template: T, flash: Flash) -> ApiResult<Response> {
    let body = template.render()?;
    Ok(flash.consumed(Html(body).into_response()))
}

fn redirect(to: &str, flash: Flash) -> Response {
    flash.deferred(Redirect::to(to).into_response())
}

fn home(mut flash: Flash, message: String) -> ApiResult<Response> {
    flash.push(message);
    render(
        HomeTemplate {
            messages: flash.messages(),
        },
        flash,
    )
}

/// Ids in the URL must be integers; anything else is an unknown page.
fn parse_id(raw: &str) -> ApiResult<i32> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Page with id {:?}", raw)))
}

pub async fn index(flash: Flash) -> ApiResult<Response> {
    render(
        HomeTemplate {
            messages: flash.messages(),
        },
        flash,
    )
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Page {}", uri.path()))
}

// Venue handlers
pub async fn list_venues(State(pool): State<DbPool>, flash: Flash) -> ApiResult<Response> {
    let mut conn = pool.get().await?;
    let areas = CatalogService::venue_areas(&mut conn, Utc::now()).await?;

    render(
        VenuesTemplate {
            messages: flash.messages(),
            areas,
        },
        flash,
    )
}

pub async fn search_venues(
    State(pool): State<DbPool>,
    flash: Flash,
    WithRejection(Form(search), _): FormInput<SearchForm>,
) -> ApiResult<Response> {
    let mut conn = pool.get().await?;
    let results = CatalogService::search_venues(&mut conn, &search.search_term, Utc::now()).await?;

    render(
        SearchVenuesTemplate {
            messages: flash.messages(),
            results,
            search_term: search.search_term,
        },
        flash,
    )
}

pub async fn show_venue(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    flash: Flash,
) -> ApiResult<Response> {
    let venue_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    match CatalogService::venue_detail(&mut conn, venue_id, Utc::now()).await? {
        Some(venue) => render(
            ShowVenueTemplate {
                messages: flash.messages(),
                venue,
            },
            flash,
        ),
        None => home(flash, missing_message(Listing::Venue, venue_id)),
    }
}

pub async fn create_venue_form(flash: Flash) -> ApiResult<Response> {
    render(
        NewVenueTemplate::new(flash.messages(), VenueForm::default(), vec![]),
        flash,
    )
}

pub async fn create_venue_submission(
    State(pool): State<DbPool>,
    flash: Flash,
    WithRejection(Form(form), _): FormInput<VenueForm>,
) -> ApiResult<Response> {
    if let Err(errors) = form.validate() {
        let errors = error_messages(&errors);
        tracing::debug!("Rejected venue form: {:?}", errors);
        return render(NewVenueTemplate::new(flash.messages(), form, errors), flash);
    }

    let mut conn = pool.get().await?;
    let message = match venues::create(&mut conn, &NewVenue::from(&form)).await {
        Ok(venue) => {
            tracing::info!("Created venue {} ({})", venue.id, venue.name);
            listed_message(Listing::Venue, &form.name, Some(&venue.name))
        }
        Err(e) => {
            tracing::error!("Failed to create venue {:?}: {:?}", form.name, e);
            listed_message(Listing::Venue, &form.name, None)
        }
    };

    home(flash, message)
}

pub async fn edit_venue(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    flash: Flash,
) -> ApiResult<Response> {
    let venue_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    match venues::get_by_id(&mut conn, venue_id).await? {
        Some(venue) => render(
            EditVenueTemplate::new(flash.messages(), venue_id, VenueForm::from(&venue), vec![]),
            flash,
        ),
        None => home(flash, missing_message(Listing::Venue, venue_id)),
    }
}

pub async fn edit_venue_submission(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    mut flash: Flash,
    WithRejection(Form(form), _): FormInput<VenueForm>,
) -> ApiResult<Response> {
    let venue_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    if venues::get_by_id(&mut conn, venue_id).await?.is_none() {
        return home(flash, missing_message(Listing::Venue, venue_id));
    }

    if let Err(errors) = form.validate() {
        let errors = error_messages(&errors);
        return render(
            EditVenueTemplate::new(flash.messages(), venue_id, form, errors),
            flash,
        );
    }

    let message = match venues::update(&mut conn, venue_id, &NewVenue::from(&form)).await {
        Ok(Some(venue)) => {
            tracing::info!("Updated venue {}", venue.id);
            updated_message(Listing::Venue, venue_id, Some(&venue.name))
        }
        Ok(None) => updated_message(Listing::Venue, venue_id, None),
        Err(e) => {
            tracing::error!("Failed to update venue {}: {:?}", venue_id, e);
            updated_message(Listing::Venue, venue_id, None)
        }
    };
    flash.push(message);

    Ok(redirect(&format!("/venues/{}", venue_id), flash))
}

pub async fn delete_venue(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    mut flash: Flash,
) -> ApiResult<Response> {
    let venue_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    let removed = venues::delete(&mut conn, venue_id).await;
    match &removed {
        Ok(true) => tracing::info!("Deleted venue {}", venue_id),
        Ok(false) => tracing::debug!("No venue {} to delete", venue_id),
        Err(e) => tracing::error!("Failed to delete venue {}: {:?}", venue_id, e),
    }

    let (status, message) = delete_outcome(Listing::Venue, venue_id, &removed);
    flash.push(message);
    Ok(flash.deferred(status.into_response()))
}

// Artist handlers
pub async fn list_artists(State(pool): State<DbPool>, flash: Flash) -> ApiResult<Response> {
    let mut conn = pool.get().await?;
    let artists = CatalogService::artist_summaries(&mut conn, Utc::now()).await?;

    render(
        ArtistsTemplate {
            messages: flash.messages(),
            artists,
        },
        flash,
    )
}

pub async fn search_artists(
    State(pool): State<DbPool>,
    flash: Flash,
    WithRejection(Form(search), _): FormInput<SearchForm>,
) -> ApiResult<Response> {
    let mut conn = pool.get().await?;
    let results =
        CatalogService::search_artists(&mut conn, &search.search_term, Utc::now()).await?;

    render(
        SearchArtistsTemplate {
            messages: flash.messages(),
            results,
            search_term: search.search_term,
        },
        flash,
    )
}

pub async fn show_artist(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    flash: Flash,
) -> ApiResult<Response> {
    let artist_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    match CatalogService::artist_detail(&mut conn, artist_id, Utc::now()).await? {
        Some(artist) => render(
            ShowArtistTemplate {
                messages: flash.messages(),
                artist,
            },
            flash,
        ),
        None => home(flash, missing_message(Listing::Artist, artist_id)),
    }
}

pub async fn create_artist_form(flash: Flash) -> ApiResult<Response> {
    render(
        NewArtistTemplate::new(flash.messages(), ArtistForm::default(), vec![]),
        flash,
    )
}

pub async fn create_artist_submission(
    State(pool): State<DbPool>,
    flash: Flash,
    WithRejection(Form(form), _): FormInput<ArtistForm>,
) -> ApiResult<Response> {
    if let Err(errors) = form.validate() {
        let errors = error_messages(&errors);
        tracing::debug!("Rejected artist form: {:?}", errors);
        return render(NewArtistTemplate::new(flash.messages(), form, errors), flash);
    }

    let mut conn = pool.get().await?;
    let message = match artists::create(&mut conn, &NewArtist::from(&form)).await {
        Ok(artist) => {
            tracing::info!("Created artist {} ({})", artist.id, artist.name);
            listed_message(Listing::Artist, &form.name, Some(&artist.name))
        }
        Err(e) => {
            tracing::error!("Failed to create artist {:?}: {:?}", form.name, e);
            listed_message(Listing::Artist, &form.name, None)
        }
    };

    home(flash, message)
}

pub async fn edit_artist(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    flash: Flash,
) -> ApiResult<Response> {
    let artist_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    match artists::get_by_id(&mut conn, artist_id).await? {
        Some(artist) => render(
            EditArtistTemplate::new(
                flash.messages(),
                artist_id,
                ArtistForm::from(&artist),
                vec![],
            ),
            flash,
        ),
        None => home(flash, missing_message(Listing::Artist, artist_id)),
    }
}

pub async fn edit_artist_submission(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    mut flash: Flash,
    WithRejection(Form(form), _): FormInput<ArtistForm>,
) -> ApiResult<Response> {
    let artist_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    if artists::get_by_id(&mut conn, artist_id).await?.is_none() {
        return home(flash, missing_message(Listing::Artist, artist_id));
    }

    if let Err(errors) = form.validate() {
        let errors = error_messages(&errors);
        return render(
            EditArtistTemplate::new(flash.messages(), artist_id, form, errors),
            flash,
        );
    }

    let message = match artists::update(&mut conn, artist_id, &NewArtist::from(&form)).await {
        Ok(Some(artist)) => {
            tracing::info!("Updated artist {}", artist.id);
            updated_message(Listing::Artist, artist_id, Some(&artist.name))
        }
        Ok(None) => updated_message(Listing::Artist, artist_id, None),
        Err(e) => {
            tracing::error!("Failed to update artist {}: {:?}", artist_id, e);
            updated_message(Listing::Artist, artist_id, None)
        }
    };
    flash.push(message);

    Ok(redirect(&format!("/artists/{}", artist_id), flash))
}

pub async fn delete_artist(
    State(pool): State<DbPool>,
    Path(raw_id): Path<String>,
    mut flash: Flash,
) -> ApiResult<Response> {
    let artist_id = parse_id(&raw_id)?;
    let mut conn = pool.get().await?;

    let removed = artists::delete(&mut conn, artist_id).await;
    match &removed {
        Ok(true) => tracing::info!("Deleted artist {}", artist_id),
        Ok(false) => tracing::debug!("No artist {} to delete", artist_id),
        Err(e) => tracing::error!("Failed to delete artist {}: {:?}", artist_id, e),
    }

    let (status, message) = delete_outcome(Listing::Artist, artist_id, &removed);
    flash.push(message);
    Ok(flash.deferred(status.into_response()))
}

// Show handlers
pub async fn list_shows(State(pool): State<DbPool>, flash: Flash) -> ApiResult<Response> {
    let mut conn = pool.get().await?;
    let shows = shows::list_all(&mut conn).await?;

    render(
        ShowsTemplate {
            messages: flash.messages(),
            shows,
        },
        flash,
    )
}

pub async fn create_show_form(flash: Flash) -> ApiResult<Response> {
    render(
        NewShowTemplate {
            messages: flash.messages(),
            form: ShowForm::starting_at(Utc::now()),
            errors: vec![],
        },
        flash,
    )
}

pub async fn create_show_submission(
    State(pool): State<DbPool>,
    flash: Flash,
    WithRejection(Form(form), _): FormInput<ShowForm>,
) -> ApiResult<Response> {
    let start_time = match (form.validate(), form.start_time()) {
        (Ok(()), Some(start_time)) => start_time,
        (result, _) => {
            let errors = match result {
                Err(errors) => error_messages(&errors),
                Ok(()) => vec!["Start time is not a valid date and time".to_string()],
            };
            return render(
                NewShowTemplate {
                    messages: flash.messages(),
                    form,
                    errors,
                },
                flash,
            );
        }
    };

    let mut conn = pool.get().await?;

    let artist = match form.artist_id() {
        Some(id) => artists::get_by_id(&mut conn, id).await?,
        None => None,
    };
    let Some(artist) = artist else {
        return home(flash, unknown_party_message(Listing::Artist, &form.artist_id));
    };

    let venue = match form.venue_id() {
        Some(id) => venues::get_by_id(&mut conn, id).await?,
        None => None,
    };
    let Some(venue) = venue else {
        return home(flash, unknown_party_message(Listing::Venue, &form.venue_id));
    };

    let record = NewShow {
        artist_id: artist.id,
        venue_id: venue.id,
        start_time,
    };
    let message = match shows::create(&mut conn, &record).await {
        Ok(show) => {
            tracing::info!(
                "Listed show {} ({} at {})",
                show.id,
                artist.name,
                venue.name
            );
            show_listed_message(true)
        }
        Err(e) => {
            tracing::error!("Failed to create show: {:?}", e);
            show_listed_message(false)
        }
    };

    home(flash, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_integers_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_id("4.2"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_id(""), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_listing_messages() {
        assert_eq!(
            listed_message(Listing::Venue, " The Musical Hop", Some("The Musical Hop")),
            "Venue The Musical Hop was successfully listed!"
        );
        assert_eq!(
            listed_message(Listing::Artist, "Guns N Petals", None),
            "An error occurred. Artist Guns N Petals could not be listed."
        );
        assert_eq!(missing_message(Listing::Venue, 9), "Venue id 9 does not exist.");
        assert_eq!(
            updated_message(Listing::Artist, 4, Some("Matt Quevedo")),
            "Artist Matt Quevedo was successfully updated."
        );
        assert_eq!(
            updated_message(Listing::Venue, 4, None),
            "An error occurred. Venue id 4 could not be updated."
        );
        assert_eq!(
            unknown_party_message(Listing::Artist, " 12 "),
            "No artist could be found for ID 12"
        );
        assert_eq!(
            unknown_party_message(Listing::Venue, "abc"),
            "No venue could be found for ID abc"
        );
        assert_eq!(show_listed_message(true), "Show was successfully listed!");
        assert_eq!(
            show_listed_message(false),
            "An error occurred. Show could not be listed."
        );
    }

    #[test]
    fn test_delete_outcomes() {
        assert_eq!(
            delete_outcome(Listing::Venue, 3, &Ok(true)),
            (
                StatusCode::NO_CONTENT,
                "Venue id 3 was successfully deleted.".to_string()
            )
        );
        assert_eq!(
            delete_outcome(Listing::Artist, 3, &Ok(false)),
            (
                StatusCode::NOT_FOUND,
                "An error occurred. Artist id 3 could not be deleted.".to_string()
            )
        );
        assert_eq!(
            delete_outcome(Listing::Venue, 3, &Err(anyhow::anyhow!("deadlock"))).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_home_shows_message_and_clears_cookie() {
        let response = home(Flash::default(), "Venue id 7 does not exist.".to_string()).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_none());
    }

    #[test]
    fn test_redirect_parks_messages_in_cookie() {
        let mut flash = Flash::default();
        flash.push("Artist Guns N Petals was successfully updated.");
        let response = redirect("/artists/4", flash);

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/artists/4");
        assert!(response.headers()["set-cookie"]
            .to_str()
            .unwrap()
            .starts_with("fyyur_flash="));
    }
}
