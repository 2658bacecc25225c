//! MovieLens-style CSV ingestion.
//!
//! Expects headered CSV: `userId,movieId,rating,timestamp` for ratings
//! and `movieId,title,genres` for movies, with genres as a `|`-delimited
//! list. Malformed rows are skipped and counted, never a hard failure.

use crate::error::Result;
use crate::model::{Movie, Rating};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Placeholder MovieLens uses for untagged movies; yields no genre tags.
pub const NO_GENRE_LABEL: &str = "(no genres listed)";

/// Records read from one file, plus the number of rows skipped as
/// malformed.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// Successfully parsed records.
    pub records: Vec<T>,
    /// Rows dropped for missing or unparseable fields.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(rename = "userId")]
    user_id: u32,
    #[serde(rename = "movieId")]
    movie_id: u32,
    rating: f64,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct RawMovie {
    #[serde(rename = "movieId")]
    movie_id: u32,
    title: String,
    genres: String,
}

/// Read rating records from a CSV reader.
pub fn read_ratings<R: Read>(reader: R) -> Result<Loaded<Rating>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut loaded = Loaded {
        records: Vec::new(),
        skipped: 0,
    };
    for row in csv_reader.deserialize::<RawRating>() {
        match row {
            Ok(raw) => loaded.records.push(Rating {
                user_id: raw.user_id,
                movie_id: raw.movie_id,
                rating: raw.rating,
                timestamp: raw.timestamp,
            }),
            Err(_) => loaded.skipped += 1,
        }
    }
    Ok(loaded)
}

/// Read rating records from a CSV file.
pub fn read_ratings_file(path: impl AsRef<Path>) -> Result<Loaded<Rating>> {
    read_ratings(File::open(path)?)
}

/// Read movie records from a CSV reader, splitting the genre list.
pub fn read_movies<R: Read>(reader: R) -> Result<Loaded<Movie>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut loaded = Loaded {
        records: Vec::new(),
        skipped: 0,
    };
    for row in csv_reader.deserialize::<RawMovie>() {
        match row {
            Ok(raw) => loaded.records.push(Movie {
                movie_id: raw.movie_id,
                title: raw.title,
                genres: split_genres(&raw.genres),
            }),
            Err(_) => loaded.skipped += 1,
        }
    }
    Ok(loaded)
}

/// Read movie records from a CSV file.
pub fn read_movies_file(path: impl AsRef<Path>) -> Result<Loaded<Movie>> {
    read_movies(File::open(path)?)
}

fn split_genres(genres: &str) -> Vec<String> {
    genres
        .split('|')
        .filter(|g| !g.is_empty() && *g != NO_GENRE_LABEL)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ratings() {
        let data = "\
userId,movieId,rating,timestamp
1,31,2.5,1260759144
1,1029,3.0,1260759179
";
        let loaded = read_ratings(data.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.records[0].user_id, 1);
        assert_eq!(loaded.records[0].movie_id, 31);
        assert!((loaded.records[0].rating - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let data = "\
userId,movieId,rating,timestamp
1,31,2.5,1260759144
not-a-user,31,2.5,1260759144
2,oops,4.0,1260759200
2,50,4.0,1260759200
";
        let loaded = read_ratings(data.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.skipped, 2);
    }

    #[test]
    fn test_read_movies_splits_genres() {
        let data = "\
movieId,title,genres
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
2,Jumanji (1995),Adventure|Children|Fantasy
";
        let loaded = read_movies(data.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].genres.len(), 5);
        assert_eq!(loaded.records[0].genres[0], "Adventure");
    }

    #[test]
    fn test_no_genres_placeholder() {
        let data = "\
movieId,title,genres
141866,Green Room (2015),(no genres listed)
";
        let loaded = read_movies(data.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.records[0].genres.is_empty());
    }

    #[test]
    fn test_titles_with_commas_are_quoted() {
        let data = "\
movieId,title,genres
11,\"American President, The (1995)\",Comedy|Drama|Romance
";
        let loaded = read_movies(data.as_bytes()).unwrap();
        assert_eq!(loaded.records[0].title, "American President, The (1995)");
        assert_eq!(loaded.records[0].genres.len(), 3);
    }
}
