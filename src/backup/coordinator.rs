//! End-to-end backup sequencing

use crate::archive::{Archive, ArchiveProducer};
use crate::auth::SessionSource;
use crate::config::BackupConfig;
use crate::error::DrivebackResult;
use crate::remote::{RemoteConnector, RemoteEntry, RemoteFolder, RemoteStore};

use super::resolver::resolve_folder;
use super::retention::enforce_retention;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct BackupReport {
    /// Name of the uploaded archive
    pub archive_name: String,
    /// Archive size in bytes
    pub size_bytes: u64,
    /// Folder the archive went into
    pub folder: RemoteFolder,
    /// Entries removed by retention, oldest first
    pub pruned: Vec<RemoteEntry>,
    /// Id of the newly created remote entry
    pub uploaded_id: String,
}

/// Runs one backup: session, archive, resolve, prune, upload, clean up
pub struct UploadCoordinator<'a> {
    config: &'a BackupConfig,
    producer: ArchiveProducer,
}

impl<'a> UploadCoordinator<'a> {
    pub fn new(config: &'a BackupConfig, producer: ArchiveProducer) -> Self {
        Self { config, producer }
    }

    /// Execute the full sequence
    ///
    /// The local archive is removed once it has been produced, whatever the
    /// outcome of the remote steps.
    pub fn run<S, C>(&self, sessions: &mut S, connector: &C) -> DrivebackResult<BackupReport>
    where
        S: SessionSource + ?Sized,
        C: RemoteConnector,
    {
        let session = sessions.obtain_session()?;
        let store = connector.connect(&session)?;

        let archive = self.producer.produce(self.config.source())?;
        tracing::info!(
            archive = archive.name(),
            size_bytes = archive.size_bytes(),
            "Archive ready"
        );

        let shipped = self.ship(&store, &archive);

        match (shipped, archive.remove_local()) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(cleanup)) => Err(cleanup),
            (Err(e), cleanup) => {
                if let Err(cleanup) = cleanup {
                    tracing::warn!(error = %cleanup, "Could not remove local archive");
                }
                Err(e)
            }
        }
    }

    /// Remote part of the run: resolve, prune, upload
    fn ship<R: RemoteStore>(&self, store: &R, archive: &Archive) -> DrivebackResult<BackupReport> {
        let folder = resolve_folder(store, self.config.folder_name())?;
        let pruned = enforce_retention(store, &folder.id, self.config.retention())?;

        tracing::info!(archive = archive.name(), folder = %folder.name, "Uploading");
        let uploaded_id = store.upload(&folder.id, archive)?;

        Ok(BackupReport {
            archive_name: archive.name().to_string(),
            size_bytes: archive.size_bytes(),
            folder,
            pruned,
            uploaded_id,
        })
    }
}
