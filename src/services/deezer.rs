use crate::error::{truncate, AppError, Result, Upstream};
use crate::models::{CatalogQuery, CatalogTrack};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Track search seam used by the resolution pipeline.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn search_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>>;
}

#[derive(Debug, Clone)]
pub struct DeezerClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct DeezerError {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: i64,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    data: Vec<CatalogTrack>,
}

impl DeezerClient {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("songscout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn search_artists(&self, query: &str) -> Result<Value> {
        self.fetch(&CatalogQuery::SearchArtists(query.to_string())).await
    }

    pub async fn list_albums(&self, artist_id: u64) -> Result<Value> {
        self.fetch(&CatalogQuery::ListAlbums(artist_id)).await
    }

    pub async fn list_tracks(&self, album_id: u64) -> Result<Value> {
        self.fetch(&CatalogQuery::ListTracks(album_id)).await
    }

    pub async fn list_genres(&self) -> Result<Value> {
        self.fetch(&CatalogQuery::ListGenres).await
    }

    pub async fn list_artists_by_genre(&self, genre_id: u64) -> Result<Value> {
        self.fetch(&CatalogQuery::ListArtistsByGenre(genre_id)).await
    }

    /// Runs one lookup and returns the provider body unmodified once it has
    /// been checked to carry a `data` array.
    pub async fn fetch(&self, query: &CatalogQuery) -> Result<Value> {
        let (path, params) = query.endpoint();
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(intent = query.intent(), url = %url, "Querying Deezer");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::upstream(Upstream::Catalog, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::upstream(Upstream::Catalog, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!("Deezer API error: {} - {}", status, truncate(&body, 500));
            return Err(AppError::from_status(Upstream::Catalog, status, &body));
        }

        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::upstream(
                Upstream::Catalog,
                format!("Failed to parse response: {} - Response: {}", e, truncate(&body, 200)),
            )
        })?;

        validate_envelope(payload)
    }
}

#[async_trait]
impl TrackSearch for DeezerClient {
    async fn search_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>> {
        let payload = self.fetch(&CatalogQuery::SearchTracks(query.to_string())).await?;

        let page: TrackPage = serde_json::from_value(payload)
            .map_err(|e| AppError::upstream(Upstream::Catalog, format!("Unexpected track shape: {}", e)))?;

        tracing::debug!("Found {} tracks for '{}'", page.data.len(), query);

        Ok(page.data)
    }
}

/// Deezer answers most failures with HTTP 200 and an `error` object, so the
/// body decides success.
fn validate_envelope(payload: Value) -> Result<Value> {
    if let Some(error) = payload.get("error") {
        let error: DeezerError = serde_json::from_value(error.clone()).unwrap_or(DeezerError {
            kind: String::new(),
            message: error.to_string(),
            code: 0,
        });
        return Err(map_deezer_error(error));
    }

    match payload.get("data") {
        Some(Value::Array(_)) => Ok(payload),
        _ => Err(AppError::upstream(
            Upstream::Catalog,
            format!("Response has no data array: {}", truncate(&payload.to_string(), 200)),
        )),
    }
}

fn map_deezer_error(error: DeezerError) -> AppError {
    tracing::warn!(code = error.code, kind = %error.kind, "Deezer error: {}", error.message);

    match error.code {
        // QUOTA, SERVICE_BUSY
        4 | 700 => AppError::RateLimited(Upstream::Catalog),
        // DATA_NOT_FOUND
        800 => AppError::NotFound(if error.message.is_empty() {
            "No data".to_string()
        } else {
            error.message
        }),
        // PARAMETER, MISSING_PARAMETER, QUERY_INVALID
        500 | 501 | 600 => AppError::InvalidQuery(error.message),
        _ => AppError::upstream(
            Upstream::Catalog,
            format!("{} ({}): {}", error.kind, error.code, error.message),
        ),
    }
}
