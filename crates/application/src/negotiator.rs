//! Storage location negotiation.

use std::sync::atomic::{AtomicBool, Ordering};

use bookimport_core::{ConfigStore, DEFAULT_BOOK_TREE_KEY, DEFAULT_PICKER_TITLE, StorageLocation};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ports::{AlertAnswer, AlertRequest, FilePicker, Prompter};
use crate::reply;

pub const STORAGE_HELP: &str = include_str!("../assets/storage_help.md");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    AlreadyGranted(StorageLocation),
    Granted(StorageLocation),
    Declined,
    PickerCancelled,
    NotPersisted,
}

impl AccessOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(
            self,
            AccessOutcome::AlreadyGranted(_) | AccessOutcome::Granted(_)
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("a storage negotiation is already pending")]
    AlreadyPending,
}

/// Makes sure a storage location is granted before an import runs.
///
/// At most one negotiation is pending at a time; a call made while another is
/// waiting on the user is rejected and the pending one is left untouched.
#[derive(Debug)]
pub struct StorageAccessNegotiator<C, P, F> {
    config: C,
    prompter: P,
    picker: F,
    picker_title: String,
    pending: AtomicBool,
}

impl<C, P, F> StorageAccessNegotiator<C, P, F>
where
    C: ConfigStore,
    P: Prompter,
    F: FilePicker,
{
    pub fn new(config: C, prompter: P, picker: F) -> Self {
        Self {
            config,
            prompter,
            picker,
            picker_title: DEFAULT_PICKER_TITLE.to_string(),
            pending: AtomicBool::new(false),
        }
    }

    pub fn with_picker_title(mut self, title: impl Into<String>) -> Self {
        self.picker_title = title.into();
        self
    }

    pub fn current_location(&self) -> Option<StorageLocation> {
        match self.config.get(DEFAULT_BOOK_TREE_KEY) {
            Ok(value) => StorageLocation::from_stored(value),
            Err(err) => {
                warn!(error = %err, "read storage location failed");
                None
            }
        }
    }

    pub async fn ensure_access(&self) -> bool {
        match self.try_ensure_access().await {
            Ok(outcome) => outcome.is_granted(),
            Err(err) => {
                warn!(error = %err, "storage negotiation rejected");
                false
            }
        }
    }

    pub async fn try_ensure_access(&self) -> Result<AccessOutcome, NegotiationError> {
        if let Some(location) = self.current_location() {
            return Ok(AccessOutcome::AlreadyGranted(location));
        }

        let _guard = PendingGuard::acquire(&self.pending)?;

        let (tx, rx) = reply::channel();
        self.prompter.alert(
            AlertRequest {
                title: self.picker_title.clone(),
                message: STORAGE_HELP.to_string(),
            },
            tx,
        );
        let answer = rx.wait().await.unwrap_or(AlertAnswer::Dismiss);
        debug!(?answer, "storage prompt answered");
        if answer != AlertAnswer::Affirm {
            return Ok(AccessOutcome::Declined);
        }

        let (tx, rx) = reply::channel();
        self.picker.pick(&self.picker_title, tx);
        let Some(handle) = rx.wait().await.filter(|h| !h.trim().is_empty()) else {
            info!("storage picker cancelled");
            return Ok(AccessOutcome::PickerCancelled);
        };

        if let Err(err) = self.config.set(DEFAULT_BOOK_TREE_KEY, &handle) {
            warn!(error = %err, "persist storage location failed");
            return Ok(AccessOutcome::NotPersisted);
        }
        info!(location = %handle, "storage location granted");
        Ok(AccessOutcome::Granted(StorageLocation { handle }))
    }
}

struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, NegotiationError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| NegotiationError::AlreadyPending)?;
        Ok(Self { flag })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
