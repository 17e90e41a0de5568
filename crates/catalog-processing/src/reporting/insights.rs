//! Aggregations over cleaned catalog records.
//!
//! Each question is an independent function so callers can compute only what
//! they need; [`CatalogInsights::from_records`] bundles all of them for the
//! JSON report.

use crate::config::UNKNOWN;
use crate::types::{CleanRecord, TextField};
use crate::utils::split_list;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind value carried by movies in the catalog export.
pub const MOVIE_KIND: &str = "Movie";
/// Kind value carried by series in the catalog export.
pub const TV_SHOW_KIND: &str = "TV Show";

const FLAGGED_KEYWORDS: [&str; 2] = ["kill", "violence"];

/// Keyword-based content label derived from the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Good,
    Bad,
}

/// A value and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedValue {
    pub value: String,
    pub count: usize,
}

/// The movie with the longest running time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestMovie {
    pub id: String,
    pub title: String,
    pub minutes: u32,
}

/// Catalog-wide aggregates written into the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogInsights {
    pub total_titles: usize,
    pub count_by_kind: BTreeMap<String, usize>,
    pub top_countries: Vec<RankedValue>,
    pub top_genres: Vec<RankedValue>,
    pub top_directors: Vec<RankedValue>,
    pub top_actors: Vec<RankedValue>,
    /// Keyed by year of `date_added`; unparsed and missing dates are skipped.
    pub titles_added_per_year: BTreeMap<i32, usize>,
    pub rating_distribution: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_movie: Option<LongestMovie>,
    /// Keyed by the first year of the decade (1990, 2000, ...).
    pub content_per_decade: BTreeMap<u16, usize>,
    pub content_categories: BTreeMap<ContentCategory, usize>,
}

impl CatalogInsights {
    /// Compute every aggregate. Ranked lists keep the `top_n` most common values.
    pub fn from_records(records: &[CleanRecord], top_n: usize) -> Self {
        Self {
            total_titles: records.len(),
            count_by_kind: count_by_kind(records),
            top_countries: top_values(records, TextField::Country, top_n),
            top_genres: top_values(records, TextField::Genres, top_n),
            top_directors: top_values(records, TextField::Director, top_n),
            top_actors: top_values(records, TextField::Cast, top_n),
            titles_added_per_year: titles_added_per_year(records),
            rating_distribution: rating_distribution(records),
            longest_movie: longest_movie(records),
            content_per_decade: content_per_decade(records),
            content_categories: category_counts(records),
        }
    }
}

/// Number of records per `kind` (Movie, TV Show, ...). Empty kinds are skipped.
pub fn count_by_kind(records: &[CleanRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| !r.kind.is_empty()) {
        *counts.entry(record.kind.clone()).or_insert(0) += 1;
    }
    counts
}

/// Most common atoms of a field, most frequent first.
///
/// List fields are split into atoms; the `"Unknown"` default is never ranked.
/// Ties are broken alphabetically so the ranking is stable.
pub fn top_values(records: &[CleanRecord], field: TextField, n: usize) -> Vec<RankedValue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        let Some(value) = field_str(record, field) else {
            continue;
        };
        let atoms: Vec<&str> = if field.is_list() {
            split_list(value).collect()
        } else if value.is_empty() {
            Vec::new()
        } else {
            vec![value]
        };
        for atom in atoms.into_iter().filter(|atom| *atom != UNKNOWN) {
            *counts.entry(atom).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<RankedValue> = counts
        .into_iter()
        .map(|(value, count)| RankedValue {
            value: value.to_string(),
            count,
        })
        .collect();
    // BTreeMap iteration is alphabetical and sort_by is stable
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

fn field_str(record: &CleanRecord, field: TextField) -> Option<&str> {
    let value = match field {
        TextField::Id => &record.id,
        TextField::Kind => &record.kind,
        TextField::Title => &record.title,
        TextField::Director => &record.director,
        TextField::Cast => &record.cast,
        TextField::Country => &record.country,
        TextField::Rating => &record.rating,
        TextField::Duration => &record.duration,
        TextField::Genres => &record.genres,
        TextField::Description => &record.description,
        TextField::DateAdded => return None,
    };
    Some(value.as_str())
}

/// Titles added per calendar year, from parsed `date_added` values only.
pub fn titles_added_per_year(records: &[CleanRecord]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for date in records.iter().filter_map(|r| r.date_added.date()) {
        *counts.entry(date.year()).or_insert(0) += 1;
    }
    counts
}

/// Number of records per rating, including the `"Not Rated"` default.
pub fn rating_distribution(records: &[CleanRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| !r.rating.is_empty()) {
        *counts.entry(record.rating.clone()).or_insert(0) += 1;
    }
    counts
}

/// The movie with the most minutes. The first one wins on a tie.
pub fn longest_movie(records: &[CleanRecord]) -> Option<LongestMovie> {
    records
        .iter()
        .filter(|r| r.kind == MOVIE_KIND)
        .filter_map(|r| r.duration_minutes.map(|minutes| (r, minutes)))
        .fold(None::<(&CleanRecord, u32)>, |best, (record, minutes)| match best {
            Some((_, longest)) if longest >= minutes => best,
            _ => Some((record, minutes)),
        })
        .map(|(record, minutes)| LongestMovie {
            id: record.id.clone(),
            title: record.title.clone(),
            minutes,
        })
}

/// TV shows with strictly more than `seasons` seasons, in input order.
pub fn shows_with_more_than(records: &[CleanRecord], seasons: u32) -> Vec<&CleanRecord> {
    records
        .iter()
        .filter(|r| r.kind == TV_SHOW_KIND)
        .filter(|r| r.season_count.is_some_and(|count| count > seasons))
        .collect()
}

/// Records per release decade. Records without a release year are skipped.
pub fn content_per_decade(records: &[CleanRecord]) -> BTreeMap<u16, usize> {
    let mut counts = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.release_year) {
        *counts.entry(year / 10 * 10).or_insert(0) += 1;
    }
    counts
}

/// Label a description: any flagged keyword (case-insensitive) makes it `Bad`.
pub fn categorize(description: &str) -> ContentCategory {
    let lowered = description.to_lowercase();
    if FLAGGED_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        ContentCategory::Bad
    } else {
        ContentCategory::Good
    }
}

/// Number of records per [`ContentCategory`].
pub fn category_counts(records: &[CleanRecord]) -> BTreeMap<ContentCategory, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(categorize(&record.description)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateAdded;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(id: &str, kind: &str) -> CleanRecord {
        CleanRecord {
            id: id.to_string(),
            kind: kind.to_string(),
            title: format!("Title {id}"),
            director: UNKNOWN.to_string(),
            cast: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            date_added: DateAdded::Missing,
            release_year: None,
            rating: "Not Rated".to_string(),
            duration: UNKNOWN.to_string(),
            duration_minutes: None,
            season_count: None,
            genres: String::new(),
            description: String::new(),
        }
    }

    fn catalog() -> Vec<CleanRecord> {
        let mut a = record("s1", MOVIE_KIND);
        a.country = "United States, India".to_string();
        a.cast = "Anupam Kher, Shah Rukh Khan".to_string();
        a.duration_minutes = Some(125);
        a.release_year = Some(1993);
        a.date_added = DateAdded::Parsed(NaiveDate::from_ymd_opt(2021, 9, 24).unwrap());
        a.rating = "TV-MA".to_string();
        a.description = "A hitman is hired to kill.".to_string();

        let mut b = record("s2", TV_SHOW_KIND);
        b.country = "India".to_string();
        b.cast = "Shah Rukh Khan".to_string();
        b.season_count = Some(4);
        b.release_year = Some(2021);
        b.date_added = DateAdded::Parsed(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());
        b.description = "Friends reunite for a road trip.".to_string();

        let mut c = record("s3", TV_SHOW_KIND);
        c.season_count = Some(1);
        c.release_year = Some(2019);
        c.date_added = DateAdded::Unparsed("someday".to_string());
        c.description = "Gang VIOLENCE in the city.".to_string();

        let mut d = record("s4", MOVIE_KIND);
        d.country = "United States".to_string();
        d.duration_minutes = Some(90);
        d.release_year = Some(1998);

        vec![a, b, c, d]
    }

    #[test]
    fn test_count_by_kind() {
        let counts = count_by_kind(&catalog());
        assert_eq!(counts.get(MOVIE_KIND), Some(&2));
        assert_eq!(counts.get(TV_SHOW_KIND), Some(&2));
    }

    #[test]
    fn test_top_countries_split_atoms_and_skip_unknown() {
        let top = top_values(&catalog(), TextField::Country, 10);
        assert_eq!(
            top,
            vec![
                RankedValue { value: "India".to_string(), count: 2 },
                RankedValue { value: "United States".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_top_actors_truncates() {
        let top = top_values(&catalog(), TextField::Cast, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].value, "Shah Rukh Khan");
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn test_titles_added_per_year_parsed_only() {
        let per_year = titles_added_per_year(&catalog());
        assert_eq!(per_year, BTreeMap::from([(2021, 2)]));
    }

    #[test]
    fn test_longest_movie() {
        let longest = longest_movie(&catalog()).unwrap();
        assert_eq!(longest.id, "s1");
        assert_eq!(longest.minutes, 125);
        assert_eq!(longest_movie(&[]), None);
    }

    #[test]
    fn test_shows_with_more_than() {
        let records = catalog();
        let long_running = shows_with_more_than(&records, 3);
        assert_eq!(long_running.len(), 1);
        assert_eq!(long_running[0].id, "s2");
        assert!(shows_with_more_than(&records, 4).is_empty());
    }

    #[test]
    fn test_content_per_decade() {
        let decades = content_per_decade(&catalog());
        assert_eq!(decades, BTreeMap::from([(1990, 2), (2010, 1), (2020, 1)]));
    }

    #[test]
    fn test_categorize_keywords() {
        assert_eq!(categorize("A hitman is hired to kill."), ContentCategory::Bad);
        assert_eq!(categorize("Gang VIOLENCE in the city."), ContentCategory::Bad);
        assert_eq!(categorize("A gentle comedy."), ContentCategory::Good);
        assert_eq!(categorize(""), ContentCategory::Good);
    }

    #[test]
    fn test_from_records_bundles_everything() {
        let insights = CatalogInsights::from_records(&catalog(), 5);
        assert_eq!(insights.total_titles, 4);
        assert_eq!(insights.rating_distribution.get("Not Rated"), Some(&3));
        assert_eq!(insights.content_categories.get(&ContentCategory::Bad), Some(&2));
        assert_eq!(insights.content_categories.get(&ContentCategory::Good), Some(&2));
        assert!(insights.top_directors.is_empty());
        assert!(insights.top_genres.is_empty());
    }
}
