use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Patch;
use crate::validator::{unique, ValidationErrors, Validator};

pub const MAX_TITLE_BYTES: usize = 500;
pub const MAX_GENRES: usize = 5;

/// A stored puzzle collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Puzzle {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub num_of_puzzles: PuzzleCount,
    pub genres: Vec<String>,
    pub version: i32,
}

/// Fields supplied by a client when creating a puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPuzzle {
    pub title: String,
    pub num_of_puzzles: PuzzleCount,
    pub genres: Vec<String>,
}

/// How many puzzles a collection holds.
///
/// Serialized as `"<n> puzzles"`; deserialized from that form or a bare integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PuzzleCount(pub i32);

impl PuzzleCount {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PuzzleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} puzzles", self.0)
    }
}

impl Serialize for PuzzleCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PuzzleCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = PuzzleCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string like \"3 puzzles\" or an integer")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<PuzzleCount, E> {
                i32::try_from(v)
                    .map(PuzzleCount)
                    .map_err(|_| E::custom("invalid num_of_puzzles format"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<PuzzleCount, E> {
                i32::try_from(v)
                    .map(PuzzleCount)
                    .map_err(|_| E::custom("invalid num_of_puzzles format"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PuzzleCount, E> {
                let mut parts = v.split(' ');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(n), Some("puzzles"), None) => n
                        .parse::<i32>()
                        .map(PuzzleCount)
                        .map_err(|_| E::custom("invalid num_of_puzzles format")),
                    _ => Err(E::custom("invalid num_of_puzzles format")),
                }
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

fn validate_fields(v: &mut Validator, title: &str, num_of_puzzles: PuzzleCount, genres: Option<&[String]>) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(
        title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(num_of_puzzles.get() != 0, "num_of_puzzles", "must be provided");
    v.check(num_of_puzzles.get() > 0, "num_of_puzzles", "must be a positive integer");

    match genres {
        None => v.add_error("genres", "must be provided"),
        Some(genres) => {
            v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
            v.check(genres.len() <= MAX_GENRES, "genres", "must not contain more than 5 genres");
            v.check(unique(genres), "genres", "must not contain duplicate values");
        }
    }
}

impl Puzzle {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        validate_fields(&mut v, &self.title, self.num_of_puzzles, Some(&self.genres));
        v.finish()
    }
}

/// Body of `POST /v1/puzzles`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePuzzleInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub num_of_puzzles: PuzzleCount,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

impl CreatePuzzleInput {
    pub fn into_new_puzzle(self) -> Result<NewPuzzle, ValidationErrors> {
        let mut v = Validator::new();
        validate_fields(&mut v, &self.title, self.num_of_puzzles, self.genres.as_deref());
        v.finish()?;
        Ok(NewPuzzle {
            title: self.title,
            num_of_puzzles: self.num_of_puzzles,
            genres: self.genres.unwrap_or_default(),
        })
    }
}

/// Body of `PATCH /v1/puzzles/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePuzzleInput {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub num_of_puzzles: Patch<PuzzleCount>,
    #[serde(default)]
    pub genres: Patch<Vec<String>>,
    /// Version the client last read; when given it must match the stored one.
    #[serde(default)]
    pub version: Option<i32>,
}

impl UpdatePuzzleInput {
    /// Applies the patch and re-validates the whole puzzle
    pub fn apply(self, puzzle: &mut Puzzle) -> Result<(), ValidationErrors> {
        self.title.apply_to(&mut puzzle.title);
        self.num_of_puzzles.apply_to(&mut puzzle.num_of_puzzles);
        self.genres.apply_to(&mut puzzle.genres);
        puzzle.validate()
    }
}
