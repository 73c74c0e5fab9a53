use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use bookimport_application::{ArchiveImportFlow, StorageAccessNegotiator};
use bookimport_core::{CatalogRecord, ImportClickOutcome};
use bookimport_engine::ArchiveContainer;
use bookimport_storage::Storage;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::Terminal;

#[derive(Debug, Parser)]
#[command(name = "bookimport", about = "Import books from folders and archives")]
struct Cli {
    /// Database path; defaults to the platform config dir.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the book held by a container (zip, tar, tar.gz, folder or file).
    Open { container: PathBuf },
    /// Show the granted book folder.
    Location,
    #[command(subcommand)]
    Catalog(CatalogCommand),
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    Add {
        file_name: String,
        book_url: String,
        #[arg(long)]
        title: Option<String>,
    },
    List,
    Remove {
        file_name: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let storage = open_storage(cli.db)?;

    match cli.command {
        Command::Open { container } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("build tokio runtime")?;
            runtime.block_on(open_container(&storage, ArchiveContainer::new(container)))
        }
        Command::Location => {
            let negotiator = StorageAccessNegotiator::new(&storage, &Terminal, &Terminal);
            match negotiator.current_location() {
                Some(location) => println!("{}", location.handle),
                None => println!("not set"),
            }
            Ok(())
        }
        Command::Catalog(command) => run_catalog(&storage, command),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_storage(db: Option<PathBuf>) -> anyhow::Result<Storage> {
    let db_path = match db {
        Some(path) => path,
        None => {
            let project_dirs = ProjectDirs::from("dev", "bookimport", "bookimport")
                .context("resolve project dirs")?;
            let config_dir = project_dirs.config_dir();
            fs::create_dir_all(config_dir)
                .with_context(|| format!("create config dir {}", config_dir.display()))?;
            config_dir.join("bookimport.db")
        }
    };
    Storage::open(&db_path)
}

async fn open_container(storage: &Storage, container: ArchiveContainer) -> anyhow::Result<()> {
    let settings = storage.load_settings()?;
    let negotiator = StorageAccessNegotiator::new(storage, &Terminal, &Terminal)
        .with_picker_title(settings.picker_title.clone());
    if !negotiator.ensure_access().await {
        println!("no book folder granted, nothing imported");
        return Ok(());
    }

    let flow = ArchiveImportFlow::new(storage, &Terminal, &Terminal, &Terminal, &settings);
    let outcome = flow.on_archive_click(&container).await;
    info!(container = %container.display_name(), ?outcome, "archive click handled");
    if outcome == ImportClickOutcome::ScanFailed {
        anyhow::bail!("could not read {}", container.path().display());
    }
    Ok(())
}

fn run_catalog(storage: &Storage, command: CatalogCommand) -> anyhow::Result<()> {
    match command {
        CatalogCommand::Add {
            file_name,
            book_url,
            title,
        } => {
            let title = title.unwrap_or_else(|| file_stem(&file_name));
            storage.upsert_book(&CatalogRecord {
                file_name,
                book_url,
                title,
            })?;
        }
        CatalogCommand::List => {
            for record in storage.list_books()? {
                println!("{}\t{}\t{}", record.file_name, record.book_url, record.title);
            }
        }
        CatalogCommand::Remove { file_name } => storage.delete_book_by_file_name(&file_name)?,
    }
    Ok(())
}

fn file_stem(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
