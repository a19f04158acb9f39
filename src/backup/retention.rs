//! Retention enforcement for the remote folder

use crate::config::RetentionPolicy;
use crate::error::DrivebackResult;
use crate::remote::{RemoteEntry, RemoteStore};

/// Delete the oldest archives in `folder_id` beyond the policy's keep count
///
/// Returns the deleted entries, oldest first. Deletions are independent calls:
/// a failure stops the sequence and leaves earlier deletions in place.
pub fn enforce_retention<S: RemoteStore + ?Sized>(
    store: &S,
    folder_id: &str,
    policy: RetentionPolicy,
) -> DrivebackResult<Vec<RemoteEntry>> {
    if !policy.is_pruning() {
        tracing::debug!("Retention disabled, skipping pruning");
        return Ok(Vec::new());
    }

    let mut entries = store.list_children(folder_id)?;
    // Stable: entries created at the same instant keep listing order
    entries.sort_by(|a, b| a.created_time.cmp(&b.created_time));

    let excess = policy.excess(entries.len());
    tracing::info!(
        existing = entries.len(),
        keep = policy.keep_count(),
        excess,
        "Enforcing retention"
    );

    let mut deleted = Vec::with_capacity(excess);
    for entry in entries.into_iter().take(excess) {
        tracing::info!(name = %entry.name, id = %entry.id, "Removing old backup");
        store.delete(&entry.id)?;
        deleted.push(entry);
    }

    Ok(deleted)
}
