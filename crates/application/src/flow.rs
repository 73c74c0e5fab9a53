//! Archive click handling: scan, resolve, then open or notify.

use bookimport_core::{
    BookNamePattern, CandidateEntry, CatalogRepository, ImportClickOutcome, Notice,
    ResolutionOutcome, Settings,
};
use bookimport_engine::{ArchiveContainer, ArchiveEntryScanner};
use tracing::{info, warn};

use crate::ports::{NavigationDispatcher, Notifier, Prompter};
use crate::resolver::DisambiguationResolver;

#[derive(Debug)]
pub struct ArchiveImportFlow<R, P, N, T> {
    scanner: ArchiveEntryScanner,
    pattern: BookNamePattern,
    resolver: DisambiguationResolver<R, P>,
    navigator: N,
    notifier: T,
}

impl<R, P, N, T> ArchiveImportFlow<R, P, N, T>
where
    R: CatalogRepository,
    P: Prompter,
    N: NavigationDispatcher,
    T: Notifier,
{
    pub fn new(catalog: R, prompter: P, navigator: N, notifier: T, settings: &Settings) -> Self {
        Self {
            scanner: ArchiveEntryScanner::new(),
            pattern: settings.book_name_pattern(),
            resolver: DisambiguationResolver::new(catalog, prompter)
                .with_selector_title(settings.selector_title.clone()),
            navigator,
            notifier,
        }
    }

    pub async fn on_archive_click(&self, container: &ArchiveContainer) -> ImportClickOutcome {
        let scanned = self
            .scanner
            .try_scan(container, |name| self.pattern.is_match(name));
        match scanned {
            Ok(candidates) => self.on_candidates(candidates).await,
            Err(err) => {
                warn!(container = %container.path().display(), error = %err, "archive unreadable");
                self.notifier.notify(Notice::ArchiveUnreadable);
                ImportClickOutcome::ScanFailed
            }
        }
    }

    /// Runs resolution and dispatch for an already scanned candidate list.
    pub async fn on_candidates(&self, candidates: Vec<CandidateEntry>) -> ImportClickOutcome {
        let Some(outcome) = self.resolver.resolve(candidates).await else {
            return ImportClickOutcome::Dismissed;
        };
        match outcome {
            ResolutionOutcome::Resolved(book_url) => {
                self.start_read_book(&book_url);
                ImportClickOutcome::Opened(book_url)
            }
            ResolutionOutcome::NotFound => {
                self.notifier.notify(Notice::NoBookInLibrary);
                ImportClickOutcome::NotFound
            }
            ResolutionOutcome::NoCandidates => {
                self.notifier.notify(Notice::UnsupportedArchiveEntries);
                ImportClickOutcome::NoCandidates
            }
            // resolve() answers a pending choice before returning
            ResolutionOutcome::AwaitingChoice(_) => ImportClickOutcome::Dismissed,
        }
    }

    pub fn start_read_book(&self, book_url: &str) {
        info!(book_url, "opening book");
        self.navigator.open(book_url);
    }
}
