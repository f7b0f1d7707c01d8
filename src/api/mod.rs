pub mod catalog;
pub mod discover;

pub use catalog::catalog_routes;
pub use discover::{ai_routes, discover_routes};

use crate::services::{DeezerClient, GeminiClient, ResolutionPipeline, SongExtractor};
use std::sync::Arc;

pub struct AppState {
    pub deezer: Arc<DeezerClient>,
    /// Present only when a Gemini key is configured
    pub gemini: Option<Arc<GeminiClient>>,
    pub extractor: Option<Arc<SongExtractor>>,
    pub resolver: Arc<ResolutionPipeline>,
}
