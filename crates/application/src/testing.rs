use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use bookimport_core::{CatalogRecord, CatalogRepository, ConfigStore, Notice};

use crate::ports::{
    AlertAnswer, AlertRequest, FilePicker, NavigationDispatcher, Notifier, Prompter,
};
use crate::reply::Reply;

#[derive(Debug, Default)]
pub struct MapConfig {
    values: RefCell<HashMap<String, String>>,
    read_only: bool,
}

impl MapConfig {
    pub fn with(key: &str, value: &str) -> Self {
        let config = Self::default();
        config
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        config
    }

    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

impl ConfigStore for MapConfig {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.read_only {
            anyhow::bail!("config is read only");
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MapCatalog {
    records: HashMap<String, String>,
    pub lookups: RefCell<Vec<String>>,
    failing: bool,
}

impl MapCatalog {
    pub fn with<const N: usize>(entries: [(&str, &str); N]) -> Self {
        Self {
            records: entries
                .into_iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

impl CatalogRepository for MapCatalog {
    fn find_by_file_name(&self, name: &str) -> anyhow::Result<Option<CatalogRecord>> {
        self.lookups.borrow_mut().push(name.to_string());
        if self.failing {
            anyhow::bail!("catalog unavailable");
        }
        Ok(self.records.get(name).map(|url| CatalogRecord {
            file_name: name.to_string(),
            book_url: url.clone(),
            title: String::new(),
        }))
    }
}

/// Answers prompts from a script; unscripted prompts are held when
/// `hold` is set and dismissed otherwise.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<AlertAnswer>>,
    choices: RefCell<VecDeque<Option<usize>>>,
    hold: Cell<bool>,
    pub held: RefCell<Vec<Reply<AlertAnswer>>>,
    pub alerts: RefCell<Vec<AlertRequest>>,
    pub selections: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedPrompter {
    pub fn answering<const N: usize>(answers: [AlertAnswer; N]) -> Self {
        let prompter = Self::default();
        prompter.script(answers);
        prompter
    }

    pub fn choosing<const N: usize>(choices: [Option<usize>; N]) -> Self {
        let prompter = Self::default();
        prompter.choices.borrow_mut().extend(choices);
        prompter
    }

    pub fn holding() -> Self {
        let prompter = Self::default();
        prompter.hold.set(true);
        prompter
    }

    pub fn script<const N: usize>(&self, answers: [AlertAnswer; N]) {
        self.answers.borrow_mut().extend(answers);
    }
}

impl Prompter for ScriptedPrompter {
    fn alert(&self, request: AlertRequest, reply: Reply<AlertAnswer>) {
        self.alerts.borrow_mut().push(request);
        let answer = self.answers.borrow_mut().pop_front();
        match answer {
            Some(answer) => reply.send(answer),
            None if self.hold.get() => self.held.borrow_mut().push(reply),
            None => reply.cancel(),
        }
    }

    fn select(&self, title: &str, choices: &[String], reply: Reply<usize>) {
        self.selections
            .borrow_mut()
            .push((title.to_string(), choices.to_vec()));
        let choice = self.choices.borrow_mut().pop_front().flatten();
        match choice {
            Some(index) => reply.send(index),
            None => reply.cancel(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedPicker {
    results: RefCell<VecDeque<Option<String>>>,
    pub titles: RefCell<Vec<String>>,
}

impl ScriptedPicker {
    pub fn returning<const N: usize>(results: [Option<&str>; N]) -> Self {
        let picker = Self::default();
        picker
            .results
            .borrow_mut()
            .extend(results.into_iter().map(|r| r.map(str::to_string)));
        picker
    }
}

impl FilePicker for ScriptedPicker {
    fn pick(&self, title: &str, reply: Reply<String>) {
        self.titles.borrow_mut().push(title.to_string());
        let result = self.results.borrow_mut().pop_front().flatten();
        match result {
            Some(location) => reply.send(location),
            None => reply.cancel(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub opened: RefCell<Vec<String>>,
    pub notices: RefCell<Vec<Notice>>,
}

impl NavigationDispatcher for Recorder {
    fn open(&self, book_url: &str) {
        self.opened.borrow_mut().push(book_url.to_string());
    }
}

impl Notifier for Recorder {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
