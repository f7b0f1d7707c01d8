pub mod catalog;
pub mod requests;
pub mod song;

pub use catalog::{CatalogParams, CatalogQuery, CatalogTrack, TrackArtist};
pub use requests::{IdentifyRequest, MoodRequest};
pub use song::{Extraction, MoodQuery, SongCandidate, SongPrompt};
