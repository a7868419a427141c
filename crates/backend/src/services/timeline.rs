//! Pure shaping of shows and venues for the listing pages.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use shared_types::{Area, Venue, VenueSummary};

/// Shows split around a reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> Timeline<T> {
    /// A show is past only when it started strictly before `now`; anything
    /// starting at `now` or later is upcoming. Input order is kept.
    pub fn split<F>(items: Vec<T>, now: DateTime<Utc>, start_of: F) -> Self
    where
        F: Fn(&T) -> DateTime<Utc>,
    {
        let (past, upcoming): (Vec<T>, Vec<T>) =
            items.into_iter().partition(|item| start_of(item) < now);
        Timeline { past, upcoming }
    }
}

/// Group venues by `(city, state)`, ordered by state then city.
///
/// Venues inside an area keep their input order. Venues without an entry in
/// `upcoming` have no upcoming shows.
pub fn group_by_area(venues: Vec<Venue>, upcoming: &HashMap<i32, usize>) -> Vec<Area> {
    let mut areas: BTreeMap<(String, String), Vec<VenueSummary>> = BTreeMap::new();

    for venue in venues {
        let summary = VenueSummary {
            id: venue.id,
            num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
            name: venue.name,
        };
        areas
            .entry((venue.state, venue.city))
            .or_default()
            .push(summary);
    }

    areas
        .into_iter()
        .map(|((state, city), venues)| Area {
            city,
            state,
            venues,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn venue(id: i32, name: &str, city: &str, state: &str) -> Venue {
        Venue {
            id,
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            address: "1 Main Street".to_string(),
            phone: None,
            image_link: None,
            facebook_link: None,
            genres: vec![],
            website: None,
            seeking_talent: false,
            seeking_description: None,
        }
    }

    #[test]
    fn test_split_past_and_upcoming() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let starts = vec![
            now - Duration::days(30),
            now + Duration::hours(2),
            now - Duration::minutes(1),
            now + Duration::days(90),
        ];

        let timeline = Timeline::split(starts.clone(), now, |start| *start);
        assert_eq!(timeline.past, vec![starts[0], starts[2]]);
        assert_eq!(timeline.upcoming, vec![starts[1], starts[3]]);
    }

    #[test]
    fn test_show_starting_now_is_upcoming() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let timeline = Timeline::split(vec![now], now, |start| *start);
        assert!(timeline.past.is_empty());
        assert_eq!(timeline.upcoming.len(), 1);
    }

    #[test]
    fn test_group_by_area_merges_same_city_and_state() {
        let venues = vec![
            venue(1, "The Musical Hop", "San Francisco", "CA"),
            venue(2, "The Dueling Pianos Bar", "New York", "NY"),
            venue(3, "Park Square Live Music & Coffee", "San Francisco", "CA"),
        ];
        let upcoming = HashMap::from([(3, 1)]);

        let areas = group_by_area(venues, &upcoming);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "San Francisco");
        assert_eq!(areas[0].state, "CA");
        assert_eq!(
            areas[0].venues.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 0);
        assert_eq!(areas[0].venues[1].num_upcoming_shows, 1);
        assert_eq!(areas[1].city, "New York");
    }

    #[test]
    fn test_same_city_name_in_different_states_stays_apart() {
        let venues = vec![
            venue(1, "Rose Room", "Portland", "OR"),
            venue(2, "Harbor Hall", "Portland", "ME"),
        ];

        let areas = group_by_area(venues, &HashMap::new());

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].state, "ME");
        assert_eq!(areas[1].state, "OR");
    }

    #[test]
    fn test_group_by_area_empty() {
        assert!(group_by_area(vec![], &HashMap::new()).is_empty());
    }
}
