//! Tarball creation for one backup run

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use flate2::{write::GzEncoder, Compression};
use walkdir::WalkDir;

use crate::error::{DrivebackError, DrivebackResult};

/// Extension appended to every archive name
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// A compressed snapshot staged on local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    name: String,
    path: PathBuf,
    size_bytes: u64,
}

impl Archive {
    /// File name, also used as the remote entry name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Delete the local file; an already missing file is not an error
    pub fn remove_local(&self) -> DrivebackResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DrivebackError::Io(format!(
                "Failed to remove local archive {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Produces `.tar.gz` snapshots named after the local time
#[derive(Debug, Clone)]
pub struct ArchiveProducer {
    work_dir: PathBuf,
    name_format: String,
}

impl ArchiveProducer {
    pub fn new(work_dir: impl Into<PathBuf>, name_format: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            name_format: name_format.into(),
        }
    }

    /// Archive file name for a run started at `at`
    pub fn archive_name(&self, at: DateTime<Local>) -> DrivebackResult<String> {
        let mut name = String::new();
        write!(name, "{}", at.format(&self.name_format)).map_err(|_| {
            DrivebackError::Config(format!(
                "Invalid archive name format: {}",
                self.name_format
            ))
        })?;
        name.push_str(ARCHIVE_EXTENSION);
        Ok(name)
    }

    /// Snapshot `source` using the current local time for the name
    pub fn produce(&self, source: &Path) -> DrivebackResult<Archive> {
        self.produce_at(source, Local::now())
    }

    /// Snapshot `source` into an archive named after `at`
    ///
    /// An existing file with the same name is reused rather than overwritten.
    pub fn produce_at(&self, source: &Path, at: DateTime<Local>) -> DrivebackResult<Archive> {
        let source_meta = fs::metadata(source).map_err(|e| {
            DrivebackError::Io(format!("Cannot read source {}: {}", source.display(), e))
        })?;

        let name = self.archive_name(at)?;
        let path = self.work_dir.join(&name);

        if path.is_file() {
            tracing::info!(archive = %path.display(), "Archive already exists, reusing it");
        } else {
            fs::create_dir_all(&self.work_dir).map_err(|e| {
                DrivebackError::Io(format!(
                    "Failed to create work directory {}: {}",
                    self.work_dir.display(),
                    e
                ))
            })?;

            tracing::info!(source = %source.display(), archive = %path.display(), "Archiving");
            if let Err(e) = write_tarball(source, source_meta.is_dir(), &path) {
                // A half-written file would be reused by the next run
                let _ = fs::remove_file(&path);
                return Err(e);
            }
        }

        let size_bytes = fs::metadata(&path)
            .map_err(|e| DrivebackError::Io(format!("Cannot stat {}: {}", path.display(), e)))?
            .len();

        Ok(Archive {
            name,
            path,
            size_bytes,
        })
    }
}

/// Name the source is stored under inside the tarball
fn entry_name(source: &Path) -> PathBuf {
    source
        .file_name()
        .map(PathBuf::from)
        .or_else(|| {
            fs::canonicalize(source)
                .ok()
                .and_then(|p| p.file_name().map(PathBuf::from))
        })
        .unwrap_or_else(|| PathBuf::from("backup"))
}

fn write_tarball(source: &Path, is_dir: bool, dest: &Path) -> DrivebackResult<()> {
    let file = File::create(dest)
        .map_err(|e| DrivebackError::Io(format!("Failed to create {}: {}", dest.display(), e)))?;

    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    // Store symlinks as links instead of copying their targets
    builder.follow_symlinks(false);

    let name = entry_name(source);
    if is_dir {
        append_tree(&mut builder, source, &name, dest)?;
    } else {
        builder
            .append_path_with_name(source, &name)
            .map_err(|e| archive_error(source, e))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| DrivebackError::Io(format!("Failed to finish tar stream: {}", e)))?;
    let mut writer = encoder
        .finish()
        .map_err(|e| DrivebackError::Io(format!("Failed to finish gzip stream: {}", e)))?;
    writer
        .flush()
        .map_err(|e| DrivebackError::Io(format!("Failed to flush archive: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| DrivebackError::Io(format!("Failed to sync archive: {}", e)))?;

    Ok(())
}

/// Append `source` under `name`, leaving out the archive being written
///
/// The work directory may live inside the source (the default is the
/// current directory), so the walk has to skip `dest`.
fn append_tree<W: Write>(
    builder: &mut tar::Builder<W>,
    source: &Path,
    name: &Path,
    dest: &Path,
) -> DrivebackResult<()> {
    let dest = fs::canonicalize(dest).map_err(|e| archive_error(dest, e))?;

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            archive_error(&path, e.into())
        })?;
        let path = entry.path();

        if entry.file_type().is_file() && is_same_file(path, &dest) {
            tracing::debug!(archive = %dest.display(), "Skipping the archive itself");
            continue;
        }

        let relative = path.strip_prefix(source).unwrap_or(path);
        let stored = name.join(relative);
        let appended = if entry.file_type().is_dir() {
            builder.append_dir(&stored, path)
        } else {
            builder.append_path_with_name(path, &stored)
        };
        appended.map_err(|e| archive_error(path, e))?;
    }

    Ok(())
}

fn is_same_file(path: &Path, canonical: &Path) -> bool {
    path.file_name() == canonical.file_name()
        && fs::canonicalize(path).map_or(false, |p| p == canonical)
}

fn archive_error(path: &Path, e: std::io::Error) -> DrivebackError {
    DrivebackError::Io(format!("Failed to archive {}: {}", path.display(), e))
}
