use axum::{
    extract::OriginalUri,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::{EmbeddedFile, RustEmbed};
use std::fmt::Write;

/// The single-page UI, compiled into the binary.
#[derive(RustEmbed)]
#[folder = "frontend/"]
pub struct Assets;

const INDEX: &str = "index.html";

/// Fallback handler: embedded asset by path, `index.html` for client-side
/// views, 404 for anything under `api/`.
pub async fn serve_frontend(OriginalUri(uri): OriginalUri, headers: HeaderMap) -> Response {
    let Some((name, file)) = resolve_asset(uri.path()) else {
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    };

    let etag = entity_tag(&file);
    let revalidated = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|tags| tags.split(',').any(|t| t.trim() == etag || t.trim() == "*"));

    let mime = mime_guess::from_path(&name).first_or_octet_stream();
    let mut response = if revalidated {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        file.data.into_owned().into_response()
    };

    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        response_headers.insert(header::CONTENT_TYPE, value);
    }
    response_headers.insert(header::CACHE_CONTROL, cache_policy(&name));
    if let Ok(value) = HeaderValue::from_str(&etag) {
        response_headers.insert(header::ETAG, value);
    }

    response
}

/// Maps a request path onto an embedded file. The UI has no nested
/// directories, so every unknown non-API path is a view of `index.html`.
fn resolve_asset(path: &str) -> Option<(String, EmbeddedFile)> {
    let path = path.trim_start_matches('/');
    if path == "api" || path.starts_with("api/") {
        return None;
    }

    match Assets::get(path) {
        Some(file) if !path.is_empty() => Some((path.to_string(), file)),
        _ => Assets::get(INDEX).map(|file| (INDEX.to_string(), file)),
    }
}

/// Strong validator derived from the content hash rust-embed computes at
/// build time.
fn entity_tag(file: &EmbeddedFile) -> String {
    let mut tag = String::from("\"");
    for byte in &file.metadata.sha256_hash()[..16] {
        let _ = write!(tag, "{:02x}", byte);
    }
    tag.push('"');
    tag
}

fn cache_policy(name: &str) -> HeaderValue {
    // index.html names the other assets, so it must always be revalidated
    if name == INDEX {
        HeaderValue::from_static("no-cache")
    } else {
        HeaderValue::from_static("public, max-age=3600")
    }
}
