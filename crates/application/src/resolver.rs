//! Candidate disambiguation.

use bookimport_core::{CandidateEntry, CatalogRepository, DEFAULT_SELECTOR_TITLE, ResolutionOutcome};
use tracing::{debug, warn};

use crate::ports::Prompter;
use crate::reply;

/// Reduces scanned candidates to at most one catalog hit.
#[derive(Debug)]
pub struct DisambiguationResolver<R, P> {
    catalog: R,
    prompter: P,
    selector_title: String,
}

impl<R, P> DisambiguationResolver<R, P>
where
    R: CatalogRepository,
    P: Prompter,
{
    pub fn new(catalog: R, prompter: P) -> Self {
        Self {
            catalog,
            prompter,
            selector_title: DEFAULT_SELECTOR_TITLE.to_string(),
        }
    }

    pub fn with_selector_title(mut self, title: impl Into<String>) -> Self {
        self.selector_title = title.into();
        self
    }

    /// Resolves without prompting where possible. More than one candidate
    /// yields [`ResolutionOutcome::AwaitingChoice`].
    pub fn classify(&self, mut candidates: Vec<CandidateEntry>) -> ResolutionOutcome {
        match candidates.len() {
            0 => ResolutionOutcome::NoCandidates,
            1 => {
                let only = candidates.remove(0);
                self.lookup(&only.name)
            }
            _ => ResolutionOutcome::AwaitingChoice(candidates),
        }
    }

    /// Returns `None` when the user dismisses the choice prompt.
    pub async fn resolve(&self, candidates: Vec<CandidateEntry>) -> Option<ResolutionOutcome> {
        match self.classify(candidates) {
            ResolutionOutcome::AwaitingChoice(candidates) => self.choose(&candidates).await,
            outcome => Some(outcome),
        }
    }

    async fn choose(&self, candidates: &[CandidateEntry]) -> Option<ResolutionOutcome> {
        let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
        let (tx, rx) = reply::channel();
        self.prompter.select(&self.selector_title, &names, tx);

        let Some(index) = rx.wait().await else {
            debug!(candidates = names.len(), "selection dismissed");
            return None;
        };
        let Some(chosen) = candidates.get(index) else {
            warn!(index, candidates = names.len(), "selection out of range, ignoring");
            return None;
        };
        Some(self.lookup(&chosen.name))
    }

    fn lookup(&self, name: &str) -> ResolutionOutcome {
        match self.catalog.find_by_file_name(name) {
            Ok(Some(record)) => {
                debug!(name, book_url = %record.book_url, "candidate resolved");
                ResolutionOutcome::Resolved(record.book_url)
            }
            Ok(None) => {
                debug!(name, "candidate not in catalog");
                ResolutionOutcome::NotFound
            }
            Err(err) => {
                warn!(name, error = %err, "catalog lookup failed");
                ResolutionOutcome::NotFound
            }
        }
    }
}
