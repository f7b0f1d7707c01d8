use crate::error::{truncate, AppError, Result};
use crate::models::{Extraction, MoodQuery, SongCandidate, SongPrompt};
use crate::services::gemini::{GenerationConfig, GenerationRequest, TextGenerator};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Turns free text, a mood or a random request into song candidates
/// through one generation call.
pub struct SongExtractor {
    generator: Arc<dyn TextGenerator>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SongListReply {
    Wrapped { songs: Vec<SongCandidate> },
    Bare(Vec<SongCandidate>),
}

impl SongExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn extract(&self, prompt: &SongPrompt) -> Result<Extraction> {
        let request = build_request(prompt)?;

        info!(kind = prompt.kind(), "Requesting song extraction");

        let generation = self.generator.generate(&request).await?;

        if !generation.stopped_normally() {
            let reason = generation.finish_reason.unwrap_or_default();
            return Err(AppError::ExtractionIncomplete(reason));
        }

        let text = generation
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::ExtractionIncomplete("empty content".to_string()))?;

        debug!("Raw AI response: {}", truncate(text, 200));

        let json = strip_code_fence(text);

        match prompt {
            SongPrompt::Mood(_) => {
                let songs = match serde_json::from_str::<SongListReply>(json) {
                    Ok(SongListReply::Wrapped { songs }) | Ok(SongListReply::Bare(songs)) => songs,
                    Err(e) => return Err(unparseable(json, e)),
                };

                if songs.is_empty() {
                    return Err(AppError::ExtractionUnparseable("reply contained no songs".to_string()));
                }

                info!("Got {} song suggestions", songs.len());
                Ok(Extraction::List(songs))
            }
            SongPrompt::Lyrics(_) | SongPrompt::Random => {
                let candidate: SongCandidate =
                    serde_json::from_str(json).map_err(|e| unparseable(json, e))?;

                info!(title = %candidate.title, artist = %candidate.artist, "Song identified");
                Ok(Extraction::Single(candidate))
            }
        }
    }
}

fn unparseable(json: &str, err: serde_json::Error) -> AppError {
    AppError::ExtractionUnparseable(format!("{} | Response was: {}", err, truncate(json, 500)))
}

fn build_request(prompt: &SongPrompt) -> Result<GenerationRequest> {
    let request = match prompt {
        SongPrompt::Lyrics(input) => {
            let input = input.trim();
            if input.is_empty() {
                return Err(AppError::InvalidQuery("Lyrics required".to_string()));
            }

            GenerationRequest {
                prompt: lyrics_prompt(input),
                config: GenerationConfig {
                    temperature: 0.7,
                    max_output_tokens: 200,
                    top_p: Some(0.95),
                    top_k: Some(64),
                    seed: None,
                },
            }
        }
        SongPrompt::Mood(mood) => GenerationRequest {
            prompt: mood_prompt(*mood),
            config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2000,
                top_p: None,
                top_k: None,
                seed: None,
            },
        },
        SongPrompt::Random => GenerationRequest {
            prompt: random_prompt(&uniqueness_token()),
            config: GenerationConfig {
                temperature: 2.0,
                max_output_tokens: 500,
                top_p: None,
                top_k: None,
                seed: Some(rand::random::<i32>()),
            },
        },
    };

    Ok(request)
}

/// Millisecond timestamp plus a v4 uuid; never repeats across calls.
fn uniqueness_token() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple())
}

fn lyrics_prompt(input: &str) -> String {
    format!(
        r#"You are a helpful music search assistant. The user is searching for a song.

User input: "{}"

Your job:
1. If it looks like a song title or artist name, just return it as-is
2. If it looks like lyrics, identify the song
3. If it's vague or partial, make your best guess
4. Consider all genres, eras, and languages

Examples:
- Input: "Bohemian Rhapsody" → {{"title": "Bohemian Rhapsody", "artist": "Queen"}}
- Input: "Taylor Swift Shake it Off" → {{"title": "Shake It Off", "artist": "Taylor Swift"}}
- Input: "never gonna give you up" → {{"title": "Never Gonna Give You Up", "artist": "Rick Astley"}}

Respond ONLY with valid JSON (no markdown, no extra text):
{{"title": "Song Title", "artist": "Artist Name"}}

If you absolutely cannot determine anything, respond with:
{{"title": "{unknown}", "artist": "{unknown}"}}"#,
        input,
        unknown = SongCandidate::UNKNOWN,
    )
}

fn mood_prompt(mood: MoodQuery) -> String {
    format!(
        r#"List {} popular songs that match this mood: {}

Respond with ONLY this JSON format (no other text):
{{"songs": [{{"title": "Song Name", "artist": "Artist Name"}}]}}

Include diverse genres and eras."#,
        SongPrompt::MOOD_SUGGESTIONS,
        mood
    )
}

fn random_prompt(token: &str) -> String {
    format!(
        r#"{}: Random song, any genre/era. JSON: {{"title":"x","artist":"y"}}"#,
        token
    )
}

/// Pulls the body out of a ```json fenced block; text without a fence is
/// returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after = &trimmed[open + 3..];
    let label_len = after
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after.len());
    let body = &after[label_len..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}
