//! Line-based terminal stand-ins for the dialog, picker and reader screens.
//!
//! Prompts are answered on a blocking thread and delivered back through the
//! reply handle, the same way a dialog callback would arrive.

use std::io::{self, BufRead as _, Write};
use std::path::PathBuf;

use bookimport_application::{
    AlertAnswer, AlertRequest, FilePicker, NavigationDispatcher, Notifier, Prompter, Reply,
};
use bookimport_core::Notice;
use tracing::warn;

#[derive(Debug, Default)]
pub struct Terminal;

fn write_prompt(out: &mut impl Write, prompt: &str) -> io::Result<()> {
    write!(out, "{prompt} ")?;
    out.flush()
}

fn read_answer(prompt: &str) -> Option<String> {
    if let Err(err) = write_prompt(&mut io::stdout().lock(), prompt) {
        warn!(error = %err, "write prompt failed");
    }

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => {
            let line = line.trim();
            (!line.is_empty()).then(|| line.to_string())
        }
        Err(err) => {
            warn!(error = %err, "read stdin failed");
            None
        }
    }
}

fn parse_alert_answer(input: Option<&str>) -> AlertAnswer {
    match input.map(|s| s.to_ascii_lowercase()) {
        Some(s) if s == "y" || s == "yes" => AlertAnswer::Affirm,
        Some(s) if s == "n" || s == "no" => AlertAnswer::Decline,
        _ => AlertAnswer::Dismiss,
    }
}

fn parse_choice(input: Option<&str>, len: usize) -> Option<usize> {
    let number: usize = input?.parse().ok()?;
    (1..=len).contains(&number).then(|| number - 1)
}

impl Prompter for Terminal {
    fn alert(&self, request: AlertRequest, reply: Reply<AlertAnswer>) {
        tokio::task::spawn_blocking(move || {
            println!("== {} ==", request.title);
            println!("{}", request.message.trim_end());
            let input = read_answer("[y]es / [n]o (blank to dismiss):");
            reply.send(parse_alert_answer(input.as_deref()));
        });
    }

    fn select(&self, title: &str, choices: &[String], reply: Reply<usize>) {
        let title = title.to_string();
        let choices = choices.to_vec();
        tokio::task::spawn_blocking(move || {
            println!("== {title} ==");
            for (i, choice) in choices.iter().enumerate() {
                println!("{:>3}. {choice}", i + 1);
            }
            let input = read_answer("number (blank to dismiss):");
            match parse_choice(input.as_deref(), choices.len()) {
                Some(index) => reply.send(index),
                None => reply.cancel(),
            }
        });
    }
}

impl FilePicker for Terminal {
    fn pick(&self, title: &str, reply: Reply<String>) {
        let title = title.to_string();
        tokio::task::spawn_blocking(move || {
            let Some(input) = read_answer(&format!("{title} (folder path):")) else {
                reply.cancel();
                return;
            };
            let path = PathBuf::from(input);
            match path.canonicalize() {
                Ok(path) if path.is_dir() => reply.send(path.to_string_lossy().to_string()),
                _ => {
                    warn!(path = %path.display(), "not a folder");
                    reply.cancel();
                }
            }
        });
    }
}

impl NavigationDispatcher for Terminal {
    fn open(&self, book_url: &str) {
        println!("bookUrl={book_url}");
    }
}

impl Notifier for Terminal {
    fn notify(&self, notice: Notice) {
        println!("{notice}");
    }
}
