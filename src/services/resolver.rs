use crate::error::{AppError, Result};
use crate::models::{CatalogTrack, SongCandidate};
use crate::services::deezer::TrackSearch;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tracks matched to candidates, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedResult {
    pub tracks: Vec<CatalogTrack>,
    pub candidates_considered: usize,
    pub misses: usize,
}

impl ResolvedResult {
    pub fn is_no_match(&self) -> bool {
        self.tracks.is_empty()
    }
}

enum Lookup {
    Hit(CatalogTrack),
    Miss,
    Failed(AppError),
}

pub struct ResolutionPipeline {
    catalog: Arc<dyn TrackSearch>,
    concurrency: usize,
}

impl ResolutionPipeline {
    pub fn new(catalog: Arc<dyn TrackSearch>, concurrency: usize) -> Self {
        Self {
            catalog,
            concurrency: concurrency.max(1),
        }
    }

    /// Looks each candidate up in the catalog and keeps its first hit.
    ///
    /// At most `limit` candidates are considered. Misses (including a
    /// catalog `NotFound`) and per-candidate failures are skipped; an error is
    /// returned only when every lookup failed.
    pub async fn resolve(
        &self,
        candidates: &[SongCandidate],
        limit: Option<usize>,
    ) -> Result<ResolvedResult> {
        let considered = candidates.len().min(limit.unwrap_or(usize::MAX));

        info!(
            "Resolving {} of {} candidates ({} in flight)",
            considered,
            candidates.len(),
            self.concurrency
        );

        // buffered() yields in input order regardless of completion order
        let lookups: Vec<Lookup> = stream::iter(candidates[..considered].to_vec())
            .map(|candidate| async move { self.lookup(&candidate).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut result = ResolvedResult {
            candidates_considered: considered,
            ..Default::default()
        };
        let mut failures = 0;
        let mut last_error = None;

        for lookup in lookups {
            match lookup {
                Lookup::Hit(track) => result.tracks.push(track),
                Lookup::Miss => result.misses += 1,
                Lookup::Failed(e) => {
                    result.misses += 1;
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            if failures == considered {
                return Err(e);
            }
        }

        info!(
            "Resolved {} tracks, {} misses",
            result.tracks.len(),
            result.misses
        );

        Ok(result)
    }

    async fn lookup(&self, candidate: &SongCandidate) -> Lookup {
        let query = candidate.search_query();
        debug!("Searching catalog for: {}", query);

        match self.catalog.search_tracks(&query).await {
            Ok(tracks) => match tracks.into_iter().next() {
                Some(track) => {
                    debug!("Found track: {}", track.title);
                    Lookup::Hit(track)
                }
                None => Lookup::Miss,
            },
            Err(AppError::NotFound(message)) => {
                debug!("No catalog entry for {:?}: {}", candidate, message);
                Lookup::Miss
            }
            Err(e) => {
                warn!("Error fetching song {:?}: {}", candidate, e);
                Lookup::Failed(e)
            }
        }
    }
}
