//! Collaborators the import logic drives but does not implement.

use bookimport_core::Notice;

use crate::reply::Reply;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAnswer {
    Affirm,
    Decline,
    Dismiss,
}

/// Dialog renderer. Every invocation must end in exactly one answer; dropping
/// the reply counts as a dismissal.
pub trait Prompter {
    fn alert(&self, request: AlertRequest, reply: Reply<AlertAnswer>);

    /// Single choice over `choices`; replies with the chosen index.
    fn select(&self, title: &str, choices: &[String], reply: Reply<usize>);
}

/// Folder picker; replies with a location handle or cancels.
pub trait FilePicker {
    fn pick(&self, title: &str, reply: Reply<String>);
}

/// Opens the reader for a book. Repeated calls with the same url are harmless.
pub trait NavigationDispatcher {
    fn open(&self, book_url: &str);
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl<T: Prompter + ?Sized> Prompter for &T {
    fn alert(&self, request: AlertRequest, reply: Reply<AlertAnswer>) {
        (**self).alert(request, reply)
    }

    fn select(&self, title: &str, choices: &[String], reply: Reply<usize>) {
        (**self).select(title, choices, reply)
    }
}

impl<T: FilePicker + ?Sized> FilePicker for &T {
    fn pick(&self, title: &str, reply: Reply<String>) {
        (**self).pick(title, reply)
    }
}

impl<T: NavigationDispatcher + ?Sized> NavigationDispatcher for &T {
    fn open(&self, book_url: &str) {
        (**self).open(book_url)
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}
