use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{
    CatalogTrack, Extraction, IdentifyRequest, MoodQuery, MoodRequest, SongCandidate, SongPrompt,
};
use crate::services::SongExtractor;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize)]
struct MoodSuggestions {
    songs: Vec<SongCandidate>,
}

#[derive(Debug, Serialize)]
struct AiCapabilities {
    available: bool,
    model: Option<String>,
    moods: Vec<MoodQuery>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub candidates: Vec<SongCandidate>,
    pub tracks: Vec<CatalogTrack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn ai_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/capabilities", get(ai_capabilities))
        .route("/ai/models", get(list_models))
        .route("/ai/identify", post(identify_song))
        .route("/ai/mood", post(mood_suggestions))
        .route("/ai/random", post(random_song))
}

pub fn discover_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/discover/lyrics", post(discover_lyrics))
        .route("/discover/mood", post(discover_mood))
        .route("/discover/random", post(discover_random))
}

fn extractor(state: &AppState) -> Result<&SongExtractor> {
    state.extractor.as_deref().ok_or(AppError::AiUnavailable)
}

fn lyrics_prompt(req: IdentifyRequest) -> Result<SongPrompt> {
    req.validate()
        .map_err(|e| AppError::InvalidQuery(e.to_string()))?;
    Ok(SongPrompt::Lyrics(req.lyrics))
}

fn mood_prompt(req: MoodRequest) -> Result<SongPrompt> {
    req.validate()
        .map_err(|e| AppError::InvalidQuery(e.to_string()))?;
    Ok(SongPrompt::Mood(req.mood.parse()?))
}

async fn ai_capabilities(State(state): State<Arc<AppState>>) -> Json<AiCapabilities> {
    Json(AiCapabilities {
        available: state.extractor.is_some(),
        model: state.gemini.as_ref().map(|g| g.model().to_string()),
        moods: MoodQuery::ALL.to_vec(),
    })
}

async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let gemini = state.gemini.as_ref().ok_or(AppError::AiUnavailable)?;
    Ok(Json(gemini.list_models().await?))
}

async fn identify_song(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<SongCandidate>> {
    let prompt = lyrics_prompt(req)?;
    single(extractor(&state)?.extract(&prompt).await?).map(Json)
}

async fn mood_suggestions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoodRequest>,
) -> Result<Json<MoodSuggestions>> {
    let prompt = mood_prompt(req)?;
    let songs = extractor(&state)?.extract(&prompt).await?.into_candidates();
    Ok(Json(MoodSuggestions { songs }))
}

async fn random_song(State(state): State<Arc<AppState>>) -> Result<Json<SongCandidate>> {
    single(extractor(&state)?.extract(&SongPrompt::Random).await?).map(Json)
}

async fn discover_lyrics(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<DiscoverResponse>> {
    let prompt = lyrics_prompt(req)?;
    discover(&state, prompt).await.map(Json)
}

async fn discover_mood(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoodRequest>,
) -> Result<Json<DiscoverResponse>> {
    let prompt = mood_prompt(req)?;
    discover(&state, prompt).await.map(Json)
}

async fn discover_random(State(state): State<Arc<AppState>>) -> Result<Json<DiscoverResponse>> {
    discover(&state, SongPrompt::Random).await.map(Json)
}

fn single(extraction: Extraction) -> Result<SongCandidate> {
    match extraction {
        Extraction::Single(candidate) => Ok(candidate),
        Extraction::List(mut candidates) if candidates.len() == 1 => Ok(candidates.remove(0)),
        Extraction::List(_) => Err(AppError::ExtractionUnparseable(
            "expected a single song".to_string(),
        )),
    }
}

/// Extract candidates for a prompt, then resolve them against the catalog.
/// An empty track list is a valid outcome carrying a user-facing message.
async fn discover(state: &AppState, prompt: SongPrompt) -> Result<DiscoverResponse> {
    let candidates = extractor(state)?.extract(&prompt).await?.into_candidates();

    let (identified, unknown): (Vec<SongCandidate>, Vec<SongCandidate>) =
        candidates.into_iter().partition(|c| !c.is_unknown());

    if !unknown.is_empty() {
        tracing::debug!("Dropping {} unidentified candidates", unknown.len());
    }

    if identified.is_empty() {
        return Ok(DiscoverResponse {
            candidates: identified,
            tracks: Vec::new(),
            message: Some(unidentified_message(&prompt).to_string()),
        });
    }

    let resolved = state
        .resolver
        .resolve(&identified, prompt.resolution_limit())
        .await?;

    let message = resolved
        .is_no_match()
        .then(|| no_match_message(&prompt).to_string());

    Ok(DiscoverResponse {
        candidates: identified,
        tracks: resolved.tracks,
        message,
    })
}

fn unidentified_message(prompt: &SongPrompt) -> &'static str {
    match prompt {
        SongPrompt::Lyrics(_) => {
            "Could not identify the song from those lyrics. Try entering more specific lyrics."
        }
        SongPrompt::Mood(_) => "Could not find songs for this mood. Try another!",
        SongPrompt::Random => "Could not pick a random song. Try again!",
    }
}

fn no_match_message(prompt: &SongPrompt) -> &'static str {
    match prompt {
        SongPrompt::Lyrics(_) => {
            "AI identified the song but couldn't find it on Deezer. Try different lyrics."
        }
        SongPrompt::Mood(_) => "Could not find songs for this mood. Try another!",
        SongPrompt::Random => "Could not find that song on Deezer. Try again!",
    }
}
