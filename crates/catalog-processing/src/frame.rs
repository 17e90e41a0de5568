//! Polars adapter: moves catalog records in and out of `DataFrame`s and CSV.
//!
//! Input columns follow the published catalog export (`show_id`, `type`,
//! `listed_in`, ...) but the record field names (`id`, `kind`, `genres`) are
//! accepted as well. Columns the frame does not carry become absent values.

use crate::error::{CleaningError, Result, ResultExt};
use crate::types::{CleanRecord, RawRecord, TextField};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column holding the release year.
pub const RELEASE_YEAR_COLUMN: &str = "release_year";
/// Derived column: running time in minutes.
pub const DURATION_MINUTES_COLUMN: &str = "duration_minutes";
/// Derived column: number of seasons.
pub const SEASON_COUNT_COLUMN: &str = "season_count";

/// Accepted column names for a field. The first entry is the one written out.
pub fn column_names(field: TextField) -> &'static [&'static str] {
    match field {
        TextField::Id => &["show_id", "id"],
        TextField::Kind => &["type", "kind"],
        TextField::Title => &["title"],
        TextField::Director => &["director"],
        TextField::Cast => &["cast"],
        TextField::Country => &["country"],
        TextField::DateAdded => &["date_added"],
        TextField::Rating => &["rating"],
        TextField::Duration => &["duration"],
        TextField::Genres => &["listed_in", "genres"],
        TextField::Description => &["description"],
    }
}

/// Load a catalog CSV with every column read as text.
///
/// Type inference is disabled so that values like `release_year` or ids that
/// look numeric reach the pipeline unchanged.
pub fn load_catalog_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    info!("Loaded {} rows x {} columns from {}", df.height(), df.width(), path.display());
    Ok(df)
}

/// Read a column as optional strings, whatever its dtype.
fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

fn find_column<'a>(df: &DataFrame, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|name| df.get_column_index(name).is_some())
}

/// Convert a frame into raw records, one per row.
///
/// # Errors
///
/// Returns [`CleaningError::ColumnNotFound`] if the frame has no id column.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<RawRecord>> {
    let height = df.height();
    let mut records = vec![RawRecord::default(); height];

    let id_names = column_names(TextField::Id);
    if find_column(df, id_names).is_none() {
        return Err(CleaningError::ColumnNotFound(id_names.join("|")));
    }

    for field in TextField::ALL {
        let Some(name) = find_column(df, column_names(field)) else {
            debug!("Column for '{}' not present, values will be absent", field);
            continue;
        };
        for (record, value) in records.iter_mut().zip(string_values(df, name)?) {
            *record.slot_mut(field) = value;
        }
    }

    if df.get_column_index(RELEASE_YEAR_COLUMN).is_some() {
        for (record, value) in records.iter_mut().zip(string_values(df, RELEASE_YEAR_COLUMN)?) {
            record.release_year = value.and_then(|year| year.trim().parse::<u16>().ok());
        }
    }

    Ok(records)
}

/// Convert cleaned records into a frame using the export column names.
///
/// Parsed dates are written in ISO form; unparsed dates keep their text and
/// missing dates are null.
pub fn records_to_frame(records: &[CleanRecord]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(TextField::ALL.len() + 3);

    for field in TextField::ALL {
        let values: Vec<Option<String>> = records.iter().map(|r| r.text(field)).collect();
        columns.push(Column::new(column_names(field)[0].into(), values));

        if field == TextField::DateAdded {
            let years: Vec<Option<u32>> = records
                .iter()
                .map(|r| r.release_year.map(u32::from))
                .collect();
            columns.push(Column::new(RELEASE_YEAR_COLUMN.into(), years));
        }
        if field == TextField::Duration {
            let minutes: Vec<Option<u32>> = records.iter().map(|r| r.duration_minutes).collect();
            let seasons: Vec<Option<u32>> = records.iter().map(|r| r.season_count).collect();
            columns.push(Column::new(DURATION_MINUTES_COLUMN.into(), minutes));
            columns.push(Column::new(SEASON_COUNT_COLUMN.into(), seasons));
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Write cleaned records to a CSV file, creating parent directories.
pub fn write_catalog_csv(records: &[CleanRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut df = records_to_frame(records)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context(format!("Failed to write {}", path.display()))?;

    info!("Wrote {} cleaned records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateAdded;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn netflix_frame() -> DataFrame {
        df! {
            "show_id" => ["s1", "s2"],
            "type" => ["Movie", "TV Show"],
            "title" => [Some("Dick Johnson Is Dead"), None],
            "release_year" => ["2020", "n/a"],
            "listed_in" => ["Documentaries", "International TV Shows, TV Dramas"],
        }
        .unwrap()
    }

    #[test]
    fn test_records_from_frame_maps_export_columns() {
        let records = records_from_frame(&netflix_frame()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("s1"));
        assert_eq!(records[0].kind.as_deref(), Some("Movie"));
        assert_eq!(records[0].release_year, Some(2020));
        assert_eq!(records[1].title, None);
        assert_eq!(records[1].release_year, None);
        assert_eq!(
            records[1].genres.as_deref(),
            Some("International TV Shows, TV Dramas")
        );
        // absent column
        assert_eq!(records[0].director, None);
    }

    #[test]
    fn test_records_from_frame_accepts_field_names() {
        let df = df! {
            "id" => ["a"],
            "kind" => ["Movie"],
            "genres" => ["Comedies"],
        }
        .unwrap();
        let records = records_from_frame(&df).unwrap();
        assert_eq!(records[0].id.as_deref(), Some("a"));
        assert_eq!(records[0].kind.as_deref(), Some("Movie"));
        assert_eq!(records[0].genres.as_deref(), Some("Comedies"));
    }

    #[test]
    fn test_records_from_frame_numeric_year_column() {
        let df = df! {
            "show_id" => ["s1"],
            "release_year" => [1993i32],
        }
        .unwrap();
        let records = records_from_frame(&df).unwrap();
        assert_eq!(records[0].release_year, Some(1993));
    }

    #[test]
    fn test_records_from_frame_requires_id_column() {
        let df = df! { "title" => ["Orphan"] }.unwrap();
        let err = records_from_frame(&df).unwrap_err();
        assert!(matches!(err, CleaningError::ColumnNotFound(_)));
    }

    #[test]
    fn test_records_to_frame_layout() {
        let record = CleanRecord {
            id: "s1".to_string(),
            kind: "Movie".to_string(),
            title: "Sankofa".to_string(),
            director: "Haile Gerima".to_string(),
            cast: "Unknown".to_string(),
            country: "United States".to_string(),
            date_added: DateAdded::Parsed(NaiveDate::from_ymd_opt(2021, 9, 24).unwrap()),
            release_year: Some(1993),
            rating: "TV-MA".to_string(),
            duration: "125 min".to_string(),
            duration_minutes: Some(125),
            season_count: None,
            genres: "Dramas".to_string(),
            description: String::new(),
        };

        let df = records_to_frame(&[record]).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 14);

        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names[0], "show_id");
        assert_eq!(names[1], "type");
        assert!(names.contains(&"listed_in"));
        assert!(names.contains(&"duration_minutes"));

        let date = df.column("date_added").unwrap().str().unwrap().get(0);
        assert_eq!(date, Some("2021-09-24"));
    }
}
