use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Deezer track record. Only the fields the app matches on are typed;
/// everything else stays in `extra` exactly as the provider sent it, nulls
/// included, so the record serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: u64,
    pub title: String,
    pub artist: TrackArtist,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogTrack {
    pub fn artist_name(&self) -> &str {
        &self.artist.name
    }

    fn album_field(&self, key: &str) -> Option<&str> {
        self.extra.get("album")?.get(key)?.as_str()
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album_field("title")
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album_field("cover_medium")
    }

    /// Deezer sends an empty string when a track has no preview clip.
    pub fn preview_url(&self) -> Option<&str> {
        self.extra
            .get("preview")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.extra.get("duration").and_then(Value::as_u64)
    }

    pub fn permalink(&self) -> Option<&str> {
        self.extra.get("link").and_then(Value::as_str)
    }
}

/// Raw query-string parameters of the catalog proxy route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub q: Option<String>,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
    pub genre_id: Option<String>,
}

/// One catalog lookup intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    SearchArtists(String),
    SearchTracks(String),
    ListAlbums(u64),
    ListTracks(u64),
    ListGenres,
    ListArtistsByGenre(u64),
}

impl CatalogQuery {
    /// Path and query pairs relative to the catalog base URL
    pub fn endpoint(&self) -> (String, Vec<(&'static str, String)>) {
        match self {
            CatalogQuery::SearchArtists(q) => ("/search/artist".to_string(), vec![("q", q.clone())]),
            CatalogQuery::SearchTracks(q) => ("/search".to_string(), vec![("q", q.clone())]),
            CatalogQuery::ListAlbums(artist_id) => (format!("/artist/{}/albums", artist_id), vec![]),
            CatalogQuery::ListTracks(album_id) => (format!("/album/{}/tracks", album_id), vec![]),
            CatalogQuery::ListGenres => ("/genre".to_string(), vec![]),
            CatalogQuery::ListArtistsByGenre(genre_id) => {
                (format!("/genre/{}/artists", genre_id), vec![])
            }
        }
    }

    pub fn intent(&self) -> &'static str {
        match self {
            CatalogQuery::SearchArtists(_) => "artist",
            CatalogQuery::SearchTracks(_) => "track",
            CatalogQuery::ListAlbums(_) => "albums",
            CatalogQuery::ListTracks(_) => "tracks",
            CatalogQuery::ListGenres => "genres",
            CatalogQuery::ListArtistsByGenre(_) => "genreArtists",
        }
    }
}

impl TryFrom<CatalogParams> for CatalogQuery {
    type Error = AppError;

    /// Exactly one intent per parameter set; anything missing, extra or
    /// malformed is rejected rather than guessed at.
    fn try_from(params: CatalogParams) -> Result<Self, Self::Error> {
        let present = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        let kind = present(&params.kind)
            .ok_or_else(|| AppError::InvalidQuery("Invalid parameters: missing type".to_string()))?;
        let q = present(&params.q);
        let artist_id = present(&params.artist_id);
        let album_id = present(&params.album_id);
        let genre_id = present(&params.genre_id);

        let query = match (kind.as_str(), q, artist_id, album_id, genre_id) {
            ("artist", Some(q), None, None, None) => CatalogQuery::SearchArtists(q),
            ("track", Some(q), None, None, None) => CatalogQuery::SearchTracks(q),
            ("albums", None, Some(id), None, None) => CatalogQuery::ListAlbums(parse_id("artistId", &id)?),
            ("tracks", None, None, Some(id), None) => CatalogQuery::ListTracks(parse_id("albumId", &id)?),
            ("genres", None, None, None, None) => CatalogQuery::ListGenres,
            ("genreArtists", None, None, None, Some(id)) => {
                CatalogQuery::ListArtistsByGenre(parse_id("genreId", &id)?)
            }
            (kind, ..) => {
                return Err(AppError::InvalidQuery(format!(
                    "Invalid parameters for type '{}'",
                    kind
                )))
            }
        };

        Ok(query)
    }
}

fn parse_id(name: &str, raw: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidQuery(format!("{} must be a numeric id", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(kind: &str) -> CatalogParams {
        CatalogParams {
            kind: Some(kind.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_each_intent_selected_from_its_parameters() {
        let cases = vec![
            (
                CatalogParams { q: Some("queen".into()), ..params("artist") },
                CatalogQuery::SearchArtists("queen".into()),
            ),
            (
                CatalogParams { q: Some("bohemian".into()), ..params("track") },
                CatalogQuery::SearchTracks("bohemian".into()),
            ),
            (
                CatalogParams { artist_id: Some("412".into()), ..params("albums") },
                CatalogQuery::ListAlbums(412),
            ),
            (
                CatalogParams { album_id: Some("302127".into()), ..params("tracks") },
                CatalogQuery::ListTracks(302127),
            ),
            (params("genres"), CatalogQuery::ListGenres),
            (
                CatalogParams { genre_id: Some("132".into()), ..params("genreArtists") },
                CatalogQuery::ListArtistsByGenre(132),
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(CatalogQuery::try_from(input).unwrap(), expected);
        }
    }

    #[test]
    fn test_rejects_missing_extra_and_unknown_parameters() {
        let rejected = vec![
            CatalogParams::default(),
            params("artist"),
            params("albums"),
            params("playlist"),
            CatalogParams { q: Some("   ".into()), ..params("track") },
            CatalogParams { q: Some("x".into()), ..params("genres") },
            CatalogParams { q: Some("x".into()), artist_id: Some("1".into()), ..params("artist") },
            CatalogParams { artist_id: Some("1".into()), album_id: Some("2".into()), ..params("albums") },
            CatalogParams { genre_id: Some("../me".into()), ..params("genreArtists") },
            CatalogParams { q: Some("x".into()), ..CatalogParams::default() },
        ];

        for input in rejected {
            let debug = format!("{:?}", input);
            assert!(
                matches!(CatalogQuery::try_from(input), Err(AppError::InvalidQuery(_))),
                "expected InvalidQuery for {}",
                debug
            );
        }
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(
            CatalogQuery::SearchTracks("a b".into()).endpoint(),
            ("/search".to_string(), vec![("q", "a b".to_string())])
        );
        assert_eq!(CatalogQuery::ListAlbums(7).endpoint().0, "/artist/7/albums");
        assert_eq!(CatalogQuery::ListArtistsByGenre(3).endpoint().0, "/genre/3/artists");
    }

    #[test]
    fn test_track_keeps_unknown_fields() {
        let raw = json!({
            "id": 76376880,
            "readable": true,
            "title": "Shake It Off",
            "link": "https://www.deezer.com/track/76376880",
            "duration": 219,
            "rank": 812345,
            "preview": "https://cdns-preview.example/shake.mp3",
            "artist": { "id": 12246, "name": "Taylor Swift", "type": "artist" },
            "album": { "id": 7490862, "title": "1989", "cover_medium": "https://e-cdns.example/1989.jpg" },
            "type": "track"
        });

        let track: CatalogTrack = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(track.artist_name(), "Taylor Swift");
        assert_eq!(track.album_title(), Some("1989"));
        assert_eq!(track.cover_url(), Some("https://e-cdns.example/1989.jpg"));
        assert_eq!(track.duration_seconds(), Some(219));
        assert_eq!(track.permalink(), Some("https://www.deezer.com/track/76376880"));
        assert_eq!(serde_json::to_value(&track).unwrap(), raw);
    }

    #[test]
    fn test_null_and_missing_fields_survive_unchanged() {
        let raw = json!({
            "id": 2,
            "title": "Bootleg",
            "preview": null,
            "album": null,
            "artist": { "name": "Somebody", "picture": null }
        });

        let track: CatalogTrack = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(track.preview_url(), None);
        assert_eq!(track.album_title(), None);
        assert_eq!(track.duration_seconds(), None);
        assert_eq!(track.permalink(), None);
        // no defaults are invented for absent duration/link
        assert_eq!(serde_json::to_value(&track).unwrap(), raw);
    }

    #[test]
    fn test_empty_preview_is_absent() {
        let track: CatalogTrack = serde_json::from_value(json!({
            "id": 1,
            "title": "Silent",
            "preview": "",
            "artist": { "name": "Nobody" }
        }))
        .unwrap();
        assert_eq!(track.preview_url(), None);
        assert_eq!(track.album_title(), None);
    }
}
