//! Parser for MovieLens CSV files.
//!
//! - ratings.csv: userId,movieId,rating,timestamp
//! - movies.csv: movieId,title,genres
//!
//! Both files carry a header row. Titles may be quoted and contain commas,
//! which is why this goes through the `csv` crate instead of splitting lines.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw row of ratings.csv as laid out on disk
#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Raw row of movies.csv as laid out on disk
#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    #[serde(default)]
    genres: Option<String>,
}

/// Parse the ratings.csv file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = open(path)?;
    read_ratings(file, &display_name(path))
}

/// Parse the movies.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = open(path)?;
    read_movies(file, &display_name(path))
}

/// Parse ratings from any reader. `source` names the input in error messages.
pub fn read_ratings<R: Read>(reader: R, source: &str) -> Result<Vec<Rating>> {
    let mut csv_reader = csv_reader(reader);
    let mut ratings = Vec::new();

    for (idx, row) in csv_reader.deserialize::<RatingRow>().enumerate() {
        let row = row.map_err(|e| parse_error(source, idx, &e))?;

        // Zero would be indistinguishable from "not rated" once in the matrix
        if !row.rating.is_finite() || row.rating <= 0.0 {
            return Err(DataLoadError::InvalidValue {
                field: format!("rating (line {} in {})", idx + 2, source),
                value: row.rating.to_string(),
            });
        }

        ratings.push(Rating {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            timestamp: row.timestamp.unwrap_or(0),
        });
    }

    Ok(ratings)
}

/// Parse movies from any reader. `source` names the input in error messages.
pub fn read_movies<R: Read>(reader: R, source: &str) -> Result<Vec<Movie>> {
    let mut csv_reader = csv_reader(reader);
    let mut movies = Vec::new();

    for (idx, row) in csv_reader.deserialize::<MovieRow>().enumerate() {
        let row = row.map_err(|e| parse_error(source, idx, &e))?;
        let title = row.title.trim().to_string();

        movies.push(Movie {
            id: row.movie_id,
            year: extract_year_from_title(&title),
            genres: parse_genres(row.genres.as_deref().unwrap_or("")),
            title,
        });
    }

    Ok(movies)
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(File::open(path)?)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Turn a csv error into a located ParseError.
///
/// `idx` is the 0-based record index; the header occupies line 1.
fn parse_error(file: &str, idx: usize, err: &csv::Error) -> DataLoadError {
    let line = err
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(idx + 2);
    let reason = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    };
    DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason,
    }
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        let year_str = title[start + 1..end].trim();
        if year_str.len() == 4 {
            return year_str.parse::<u16>().ok();
        }
    }
    None
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> ["Action", "Adventure", "Sci-Fi"]
fn parse_genres(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != "(no genres listed)")
        .map(str::to_string)
        .collect()
}
