use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct IdentifyRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 1000, message = "Lyrics required"))]
    pub lyrics: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MoodRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Mood required"))]
    pub mood: String,
}
