use askama::Template;
use shared_types::{
    choices, Area, ArtistDetail, ArtistForm, ArtistSummary, SearchResults, ShowForm, ShowListing,
    VenueDetail, VenueForm, VenueSummary,
};

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

pub fn state_options(selected: &str) -> Vec<SelectOption> {
    choices::STATES
        .iter()
        .map(|&value| SelectOption {
            value: value.to_string(),
            selected: value == selected,
        })
        .collect()
}

/// Every listed genre, followed by any selected genre the list does not
/// carry so a re-rendered or edited form never drops a stored value.
pub fn genre_options(selected: &[String]) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> = choices::GENRES
        .iter()
        .map(|&value| SelectOption {
            value: value.to_string(),
            selected: selected.iter().any(|g| g == value),
        })
        .collect();

    for value in selected {
        if !options.iter().any(|o| &o.value == value) {
            options.push(SelectOption {
                value: value.clone(),
                selected: true,
            });
        }
    }

    options
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub messages: Vec<String>,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesTemplate {
    pub messages: Vec<String>,
    pub areas: Vec<Area>,
}

#[derive(Template)]
#[template(path = "pages/search_venues.html")]
pub struct SearchVenuesTemplate {
    pub messages: Vec<String>,
    pub results: SearchResults<VenueSummary>,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct ShowVenueTemplate {
    pub messages: Vec<String>,
    pub venue: VenueDetail,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsTemplate {
    pub messages: Vec<String>,
    pub artists: Vec<ArtistSummary>,
}

#[derive(Template)]
#[template(path = "pages/search_artists.html")]
pub struct SearchArtistsTemplate {
    pub messages: Vec<String>,
    pub results: SearchResults<ArtistSummary>,
    pub search_term: String,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ShowArtistTemplate {
    pub messages: Vec<String>,
    pub artist: ArtistDetail,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsTemplate {
    pub messages: Vec<String>,
    pub shows: Vec<ShowListing>,
}

#[derive(Template)]
#[template(path = "forms/new_venue.html")]
pub struct NewVenueTemplate {
    pub messages: Vec<String>,
    pub form: VenueForm,
    pub errors: Vec<String>,
    pub states: Vec<SelectOption>,
    pub genres: Vec<SelectOption>,
}

impl NewVenueTemplate {
    pub fn new(messages: Vec<String>, form: VenueForm, errors: Vec<String>) -> Self {
        Self {
            states: state_options(&form.state),
            genres: genre_options(&form.genres),
            messages,
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/edit_venue.html")]
pub struct EditVenueTemplate {
    pub messages: Vec<String>,
    pub venue_id: i32,
    pub form: VenueForm,
    pub errors: Vec<String>,
    pub states: Vec<SelectOption>,
    pub genres: Vec<SelectOption>,
}

impl EditVenueTemplate {
    pub fn new(messages: Vec<String>, venue_id: i32, form: VenueForm, errors: Vec<String>) -> Self {
        Self {
            states: state_options(&form.state),
            genres: genre_options(&form.genres),
            messages,
            venue_id,
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/new_artist.html")]
pub struct NewArtistTemplate {
    pub messages: Vec<String>,
    pub form: ArtistForm,
    pub errors: Vec<String>,
    pub states: Vec<SelectOption>,
    pub genres: Vec<SelectOption>,
}

impl NewArtistTemplate {
    pub fn new(messages: Vec<String>, form: ArtistForm, errors: Vec<String>) -> Self {
        Self {
            states: state_options(&form.state),
            genres: genre_options(&form.genres),
            messages,
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/edit_artist.html")]
pub struct EditArtistTemplate {
    pub messages: Vec<String>,
    pub artist_id: i32,
    pub form: ArtistForm,
    pub errors: Vec<String>,
    pub states: Vec<SelectOption>,
    pub genres: Vec<SelectOption>,
}

impl EditArtistTemplate {
    pub fn new(messages: Vec<String>, artist_id: i32, form: ArtistForm, errors: Vec<String>) -> Self {
        Self {
            states: state_options(&form.state),
            genres: genre_options(&form.genres),
            messages,
            artist_id,
            form,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/new_show.html")]
pub struct NewShowTemplate {
    pub messages: Vec<String>,
    pub form: ShowForm,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "errors/400.html")]
pub struct BadRequestTemplate {
    pub messages: Vec<String>,
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub messages: Vec<String>,
}

#[derive(Template)]
#[template(path = "errors/500.html")]
pub struct ServerErrorTemplate {
    pub messages: Vec<String>,
}

/// Custom template filters.
pub mod filters {
    use chrono::{DateTime, Utc};

    /// `{{ show.start_time|datetime("full") }}`
    ///
    /// `full` reads like "Saturday May, 21, 2019 at 9:30PM", `medium` like
    /// "Sat 05, 21, 2019 9:30PM". Anything else is used as a chrono format.
    pub fn datetime(value: &DateTime<Utc>, format: &str) -> askama::Result<String> {
        let pattern = match format {
            "full" => "%A %B, %-d, %Y at %-I:%M%p",
            "medium" => "%a %m, %d, %Y %-I:%M%p",
            other => other,
        };
        Ok(value.format(pattern).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_datetime_filter_formats() {
        let start = Utc.with_ymd_and_hms(2019, 5, 21, 21, 30, 0).unwrap();

        assert_eq!(
            filters::datetime(&start, "full").unwrap(),
            "Tuesday May, 21, 2019 at 9:30PM"
        );
        assert_eq!(
            filters::datetime(&start, "medium").unwrap(),
            "Tue 05, 21, 2019 9:30PM"
        );
        assert_eq!(filters::datetime(&start, "%Y").unwrap(), "2019");
    }

    #[test]
    fn test_options_mark_selection() {
        let states = state_options("NY");
        assert_eq!(states.iter().filter(|o| o.selected).count(), 1);
        assert!(states.iter().any(|o| o.value == "NY" && o.selected));

        let genres = genre_options(&["Jazz".to_string(), "Folk".to_string()]);
        assert_eq!(genres.iter().filter(|o| o.selected).count(), 2);
        assert_eq!(genres.len(), choices::GENRES.len());
    }

    #[test]
    fn test_unlisted_genre_is_kept_selected() {
        let genres = genre_options(&["Swing".to_string(), "Jazz".to_string(), "Swing".to_string()]);

        assert_eq!(genres.len(), choices::GENRES.len() + 1);
        let last = genres.last().unwrap();
        assert_eq!(last.value, "Swing");
        assert!(last.selected);
    }

    #[test]
    fn test_edit_form_keeps_stored_unlisted_genre() {
        let form = VenueForm {
            name: "The Musical Hop".to_string(),
            state: "CA".to_string(),
            genres: vec!["Jazz".to_string(), "Swing".to_string()],
            ..Default::default()
        };
        let page = EditVenueTemplate::new(vec![], 1, form, vec![]).render().unwrap();

        assert!(page.contains("<option value=\"Swing\" selected>Swing</option>"));
        assert!(page.contains("<option value=\"Jazz\" selected>Jazz</option>"));
    }

    #[test]
    fn test_home_page_shows_flashed_messages() {
        let page = HomeTemplate {
            messages: vec!["Venue <Hop> was successfully listed!".to_string()],
        }
        .render()
        .unwrap();

        assert!(page.contains("Venue &lt;Hop&gt; was successfully listed!"));
    }

    #[test]
    fn test_new_venue_form_keeps_submitted_values() {
        let form = VenueForm {
            name: "The Musical Hop".to_string(),
            state: "CA".to_string(),
            genres: vec!["Jazz".to_string()],
            ..Default::default()
        };
        let page = NewVenueTemplate::new(vec![], form, vec!["City is required".to_string()])
            .render()
            .unwrap();

        assert!(page.contains("value=\"The Musical Hop\""));
        assert!(page.contains("<option value=\"CA\" selected>CA</option>"));
        assert!(page.contains("City is required"));
    }
}
