//! The backup command
//!
//! Turns parsed arguments into a run configuration, wires the session
//! manager and the Drive connector together and reports the outcome.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::archive::ArchiveProducer;
use crate::auth::{ClientSecrets, LinePrompt, OAuthClient, SessionManager, SessionStore};
use crate::backup::{BackupReport, UploadCoordinator};
use crate::config::{BackupConfig, DrivebackPaths, Settings};
use crate::error::DrivebackResult;
use crate::logging::{effective_level, init_logging};
use crate::remote::DriveConnector;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(
    name = "driveback",
    version,
    about = "Snapshot a directory into a tarball and upload it to a Google Drive folder",
    long_about = "driveback archives a directory into a single .tar.gz, uploads it into a \
                  named Google Drive folder and prunes the oldest archives in that folder \
                  so that at most the requested number are kept. Meant to be run from cron."
)]
pub struct BackupArgs {
    /// Directory (or file) to back up
    #[arg(short = 's', long = "source", value_name = "SOURCE_DIR")]
    pub source: Option<PathBuf>,

    /// Name of the Drive folder receiving the archive
    #[arg(short = 'g', long = "folder", value_name = "FOLDER_NAME")]
    pub folder: Option<String>,

    /// Number of archives to keep in the folder (0 or absent: keep everything)
    #[arg(
        short = 'f',
        long = "keep",
        value_name = "KEEP_COUNT",
        allow_negative_numbers = true
    )]
    pub keep: Option<i64>,

    /// OAuth client secrets file [default: <config dir>/credentials.json]
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Session file [default: <config dir>/token.json]
    #[arg(long, value_name = "PATH")]
    pub token: Option<PathBuf>,

    /// Directory where the archive is staged before upload
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl BackupArgs {
    /// Validate the arguments into an immutable run configuration
    pub fn to_config(&self) -> DrivebackResult<BackupConfig> {
        BackupConfig::new(
            self.source.clone(),
            self.folder.clone(),
            self.keep,
            self.work_dir.clone(),
        )
    }
}

/// Run one backup end to end
pub fn handle_backup(args: BackupArgs) -> Result<()> {
    // Argument problems surface before anything touches disk or network
    let config = args.to_config()?;

    let paths = DrivebackPaths::new()
        .context("Failed to resolve the configuration directory")?
        .with_credentials_file(args.credentials.clone())
        .with_token_file(args.token.clone());
    let settings = Settings::load_or_create(&paths)?;
    if !paths.settings_file().exists() {
        // First run leaves the defaults on disk for the operator to edit
        settings.save(&paths)?;
    }

    init_logging(effective_level(args.verbose, &settings.log_level))?;
    tracing::debug!(config_dir = %paths.base_dir().display(), "Configuration loaded");

    let secrets = ClientSecrets::load(&paths.credentials_file())?;
    let endpoint = OAuthClient::new(secrets, settings.redirect_uri.clone())?;
    let mut sessions = SessionManager::new(
        SessionStore::new(paths.token_file()),
        endpoint,
        LinePrompt::stdio(),
        settings.scopes.clone(),
    );
    let connector = DriveConnector::new(
        settings.upload_chunk_size,
        settings.archive_mime_type.clone(),
    );
    let producer = ArchiveProducer::new(config.work_dir(), settings.archive_name_format.clone());

    println!(
        "Backing up {} to Drive folder '{}'...",
        config.source().display(),
        config.folder_name()
    );

    let report = UploadCoordinator::new(&config, producer).run(&mut sessions, &connector)?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &BackupReport) {
    for entry in &report.pruned {
        println!("Removed old backup file: {}", entry.name);
    }
    println!(
        "The backup {} ({}) has been successfully uploaded to '{}'!",
        report.archive_name,
        format_size(report.size_bytes),
        report.folder.name
    );
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<BackupArgs, clap::Error> {
        BackupArgs::try_parse_from(std::iter::once("driveback").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_short_flags() {
        let args = parse(&["-s", "/srv/data", "-g", "Backups", "-f", "5"]).unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.folder_name(), "Backups");
        assert_eq!(config.retention().keep_count(), 5);
    }

    #[test]
    fn test_negative_keep_count_disables_pruning() {
        let args = parse(&["-s", "/srv/data", "-g", "Backups", "-f", "-2"]).unwrap();
        assert!(!args.to_config().unwrap().retention().is_pruning());
    }

    #[test]
    fn test_missing_folder_is_usage_error() {
        let args = parse(&["-s", "/srv/data"]).unwrap();
        assert!(args.to_config().unwrap_err().is_usage());
    }

    #[test]
    fn test_malformed_keep_count_rejected_by_parser() {
        assert!(parse(&["-s", "/srv", "-g", "B", "-f", "many"]).is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let args = parse(&["-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
