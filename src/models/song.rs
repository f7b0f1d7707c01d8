use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `{title, artist}` guess, not yet checked against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongCandidate {
    pub title: String,
    pub artist: String,
}

impl SongCandidate {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// The model's "could not identify" sentinel, or an empty title.
    pub fn is_unknown(&self) -> bool {
        let title = self.title.trim();
        title.is_empty() || title.eq_ignore_ascii_case(Self::UNKNOWN)
    }

    /// Free-text catalog query for this candidate
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title.trim(), self.artist.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodQuery {
    Happy,
    Sad,
    Energetic,
    Chill,
}

impl MoodQuery {
    pub const ALL: [MoodQuery; 4] = [
        MoodQuery::Happy,
        MoodQuery::Sad,
        MoodQuery::Energetic,
        MoodQuery::Chill,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MoodQuery::Happy => "Happy",
            MoodQuery::Sad => "Sad",
            MoodQuery::Energetic => "Energetic",
            MoodQuery::Chill => "Chill",
        }
    }
}

impl fmt::Display for MoodQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MoodQuery {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MoodQuery::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::InvalidQuery(format!("Unknown mood: {}", trimmed)))
    }
}

/// What the extractor is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongPrompt {
    /// Identify one song from a lyrics fragment, title or artist text
    Lyrics(String),
    /// Suggest a list of songs matching a mood
    Mood(MoodQuery),
    /// Pick one song at random
    Random,
}

impl SongPrompt {
    /// Songs requested from the model for a mood list
    pub const MOOD_SUGGESTIONS: usize = 20;
    /// Catalog lookups made for a mood list
    pub const MOOD_RESOLUTION_CAP: usize = 10;

    pub fn kind(&self) -> &'static str {
        match self {
            SongPrompt::Lyrics(_) => "single",
            SongPrompt::Mood(_) => "moodList",
            SongPrompt::Random => "random",
        }
    }

    pub fn resolution_limit(&self) -> Option<usize> {
        match self {
            SongPrompt::Mood(_) => Some(Self::MOOD_RESOLUTION_CAP),
            SongPrompt::Lyrics(_) | SongPrompt::Random => None,
        }
    }
}

/// Parsed extractor output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Single(SongCandidate),
    List(Vec<SongCandidate>),
}

impl Extraction {
    pub fn into_candidates(self) -> Vec<SongCandidate> {
        match self {
            Extraction::Single(candidate) => vec![candidate],
            Extraction::List(candidates) => candidates,
        }
    }
}
