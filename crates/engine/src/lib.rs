//! Archive entry scanning.
//!
//! A container is either an archive (zip, tar, tar.gz), a directory, or a
//! single file. Scanning lists the book-like entries it holds, in the order
//! the container yields them.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use bookimport_core::CandidateEntry;
use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read zip {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("unsupported container {0}")]
    UnsupportedContainer(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Zip,
    Tar,
    TarGz,
    Directory,
    File,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Zip => "zip",
            ContainerKind::Tar => "tar",
            ContainerKind::TarGz => "tar.gz",
            ContainerKind::Directory => "directory",
            ContainerKind::File => "file",
        }
    }

    pub fn detect(path: &Path) -> Result<Self, ScanError> {
        let metadata = fs::metadata(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.is_dir() {
            return Ok(ContainerKind::Directory);
        }

        let name = file_name(path).to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ContainerKind::TarGz)
        } else if name.ends_with(".tar") {
            Ok(ContainerKind::Tar)
        } else if name.ends_with(".zip") || name.ends_with(".cbz") {
            Ok(ContainerKind::Zip)
        } else if UNREADABLE_ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            Err(ScanError::UnsupportedContainer(path.to_path_buf()))
        } else {
            Ok(ContainerKind::File)
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const UNREADABLE_ARCHIVE_SUFFIXES: [&str; 3] = [".rar", ".7z", ".cbr"];

/// Read-only handle to a browsable container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveContainer {
    path: PathBuf,
}

impl ArchiveContainer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        file_name(&self.path)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveEntryScanner;

impl ArchiveEntryScanner {
    pub fn new() -> Self {
        Self
    }

    /// Lists matching entries; an unreadable container yields nothing.
    pub fn scan<F>(&self, container: &ArchiveContainer, is_book_name: F) -> Vec<CandidateEntry>
    where
        F: Fn(&str) -> bool,
    {
        match self.try_scan(container, is_book_name) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(container = %container.path.display(), error = %err, "scan failed");
                Vec::new()
            }
        }
    }

    pub fn try_scan<F>(
        &self,
        container: &ArchiveContainer,
        is_book_name: F,
    ) -> Result<Vec<CandidateEntry>, ScanError>
    where
        F: Fn(&str) -> bool,
    {
        let path = container.path();
        let kind = ContainerKind::detect(path)?;
        let mut out = Vec::new();
        let mut push = |entry_path: &str| {
            let name = base_name(entry_path);
            if !name.is_empty() && is_book_name(name) {
                out.push(CandidateEntry::new(name));
            }
        };

        match kind {
            ContainerKind::Zip => scan_zip(path, &mut push)?,
            ContainerKind::Tar => {
                let file = open(path)?;
                scan_tar(path, BufReader::new(file), &mut push)?;
            }
            ContainerKind::TarGz => {
                let file = open(path)?;
                scan_tar(path, GzDecoder::new(BufReader::new(file)), &mut push)?;
            }
            ContainerKind::Directory => scan_dir(path, &mut push)?,
            ContainerKind::File => push(file_name(path)),
        }

        debug!(
            container = %path.display(),
            kind = %kind,
            candidates = out.len(),
            "scanned container"
        );
        Ok(out)
    }
}

fn open(path: &Path) -> Result<File, ScanError> {
    File::open(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn scan_zip(path: &Path, push: &mut impl FnMut(&str)) -> Result<(), ScanError> {
    let zip_err = |source: ZipError| ScanError::Zip {
        path: path.to_path_buf(),
        source,
    };
    let file = open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(zip_err)?;
    for i in 0..archive.len() {
        // raw access: only the name is needed, so no decompressor or password
        let entry = archive.by_index_raw(i).map_err(zip_err)?;
        if entry.is_dir() {
            continue;
        }
        push(entry.name());
    }
    Ok(())
}

fn scan_tar<R: Read>(path: &Path, reader: R, push: &mut impl FnMut(&str)) -> Result<(), ScanError> {
    let io_err = |source: io::Error| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries().map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let entry_path = entry.path().map_err(io_err)?;
        push(&entry_path.to_string_lossy());
    }
    Ok(())
}

fn scan_dir(root: &Path, push: &mut impl FnMut(&str)) -> Result<(), ScanError> {
    // symlinks are not followed, so link cycles cannot repeat entries
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| ScanError::Io {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: io::Error::from(err),
        })?;
        if entry.file_type().is_file() {
            push(file_name(entry.path()));
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// Last segment of an archive entry path, for either separator.
fn base_name(entry_path: &str) -> &str {
    entry_path
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}
