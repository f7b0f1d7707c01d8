pub mod deezer;
pub mod extractor;
pub mod gemini;
pub mod resolver;

pub use deezer::{DeezerClient, TrackSearch};
pub use extractor::SongExtractor;
pub use gemini::{GeminiClient, TextGenerator};
pub use resolver::{ResolutionPipeline, ResolvedResult};
