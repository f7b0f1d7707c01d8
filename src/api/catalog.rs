use crate::api::AppState;
use crate::error::Result;
use crate::models::{CatalogParams, CatalogQuery};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new().route("/catalog", get(catalog_lookup))
}

/// Proxies one Deezer lookup, selected by the query parameters
async fn catalog_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Value>> {
    let query = CatalogQuery::try_from(params)?;

    let payload = match &query {
        CatalogQuery::SearchArtists(q) => state.deezer.search_artists(q).await?,
        CatalogQuery::ListAlbums(artist_id) => state.deezer.list_albums(*artist_id).await?,
        CatalogQuery::ListTracks(album_id) => state.deezer.list_tracks(*album_id).await?,
        CatalogQuery::ListGenres => state.deezer.list_genres().await?,
        CatalogQuery::ListArtistsByGenre(genre_id) => {
            state.deezer.list_artists_by_genre(*genre_id).await?
        }
        // Raw body for the UI, not the decoded track list
        CatalogQuery::SearchTracks(_) => state.deezer.fetch(&query).await?,
    };

    Ok(Json(payload))
}
