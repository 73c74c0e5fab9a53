//! Application orchestration layer for book import.
//!
//! Two flows live here: negotiating a storage location before any import,
//! and turning an archive click into at most one opened book.

pub mod flow;
pub mod negotiator;
pub mod ports;
pub mod reply;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use flow::ArchiveImportFlow;
pub use negotiator::{AccessOutcome, NegotiationError, STORAGE_HELP, StorageAccessNegotiator};
pub use ports::{AlertAnswer, AlertRequest, FilePicker, NavigationDispatcher, Notifier, Prompter};
pub use reply::{Pending, Reply};
pub use resolver::DisambiguationResolver;
