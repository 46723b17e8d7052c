use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::apis::{FetchError, PublicationSource};
use crate::diagnostics::Diagnostics;
use crate::publication::Publication;
use crate::render;

pub const DEFAULT_WORKERS: usize = 8;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Could not retrieve publication IDs: {0}")]
    Listing(#[source] FetchError),
    #[error("{failed} of {total} publications could not be retrieved")]
    Incomplete { failed: usize, total: usize },
}

#[derive(Debug, Clone)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed { count: usize },
    Aborted,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Completed { .. } => 0,
            RunStatus::Aborted => 1,
        }
    }
}

/// Fans detail lookups for a project's outputs across a fixed number of workers.
pub struct Enricher {
    source: Arc<dyn PublicationSource>,
    workers: usize,
}

impl Enricher {
    pub fn new(source: Arc<dyn PublicationSource>, workers: usize) -> Self {
        Self {
            source,
            workers: workers.max(1),
        }
    }

    /// Fetch and build every output of the project, sorted for publishing.
    ///
    /// All lookups run to completion before any result is inspected. One
    /// failed identifier fails the whole collection.
    pub async fn collect(&self, project_id: &str) -> Result<Vec<Publication>, EnrichError> {
        let ids = self
            .source
            .output_ids(project_id)
            .await
            .map_err(EnrichError::Listing)?;
        let total = ids.len();
        tracing::info!(
            "Enriching {} publications from {} with {} workers",
            total,
            self.source.name(),
            self.workers
        );

        let results: Vec<(String, Result<(Publication, Diagnostics), String>)> = stream::iter(ids)
            .map(|pure_id| {
                let source = Arc::clone(&self.source);
                let task_id = pure_id.clone();
                let handle = tokio::spawn(async move {
                    let raw = source.output_details(&task_id).await?;
                    Ok::<_, FetchError>(Publication::build(&task_id, raw))
                });
                async move {
                    let outcome = match handle.await {
                        Ok(Ok(built)) => Ok(built),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(e) => Err(format!("task panicked: {}", e)),
                    };
                    (pure_id, outcome)
                }
            })
            .buffered(self.workers)
            .collect()
            .await;

        let mut publications = Vec::with_capacity(total);
        let mut failed = 0;
        let mut warnings = 0;
        for (pure_id, outcome) in results {
            match outcome {
                Ok((publication, diag)) => {
                    warnings += diag.len();
                    publications.push(publication);
                }
                Err(e) => {
                    tracing::error!(pure_id = %pure_id, "Could not retrieve details: {}", e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(EnrichError::Incomplete { failed, total });
        }
        if warnings > 0 {
            tracing::warn!("{} data-quality warnings across {} publications", warnings, total);
        }

        sort_publications(&mut publications);
        Ok(publications)
    }

    /// Collect and publish to `target`. Nothing is written unless every output was built.
    pub async fn run(&self, project_id: &str, target: &OutputTarget) -> RunStatus {
        let publications = match self.collect(project_id).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("Aborted publication update: {}", e);
                return RunStatus::Aborted;
            }
        };

        let written = match target {
            OutputTarget::File(path) => render::write(&publications, path),
            OutputTarget::Stdout => render::print(&publications),
        };
        match written {
            Ok(()) => {
                tracing::info!("Published {} publications", publications.len());
                RunStatus::Completed {
                    count: publications.len(),
                }
            }
            Err(e) => {
                tracing::error!("Could not write publications: {}", e);
                RunStatus::Aborted
            }
        }
    }
}

/// Newest first, then by first author's surname. Stable, so ties keep input order.
pub fn sort_publications(publications: &mut [Publication]) {
    publications.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| a.first_author.cmp(&b.first_author))
    });
}
