//! Remote folder lookup by display name

use crate::error::{DrivebackError, DrivebackResult};
use crate::remote::{RemoteFolder, RemoteStore};

/// Find the folder whose name is exactly `folder_name`
///
/// Resolved fresh on every run since the remote may change out of band. When
/// several entries share the name, the first in listing order wins.
pub fn resolve_folder<S: RemoteStore + ?Sized>(
    store: &S,
    folder_name: &str,
) -> DrivebackResult<RemoteFolder> {
    let listing = store.list_all()?;

    if listing.is_empty() {
        tracing::warn!("Remote listing is empty");
        return Err(DrivebackError::folder_not_found(folder_name));
    }

    let mut matches = listing.into_iter().filter(|entry| entry.name == folder_name);
    let folder = matches
        .next()
        .ok_or_else(|| DrivebackError::folder_not_found(folder_name))?;

    let duplicates = matches.count();
    if duplicates > 0 {
        tracing::warn!(
            folder = folder_name,
            chosen_id = %folder.id,
            duplicates,
            "Several remote entries share this name, using the first one listed"
        );
    }

    tracing::debug!(folder = folder_name, id = %folder.id, "Resolved remote folder");
    Ok(folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;
    use crate::remote::RemoteEntry;

    struct Listing(Vec<(&'static str, &'static str)>);

    impl RemoteStore for Listing {
        fn list_all(&self) -> DrivebackResult<Vec<RemoteFolder>> {
            Ok(self
                .0
                .iter()
                .map(|(id, name)| RemoteFolder {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect())
        }

        fn list_children(&self, _parent_id: &str) -> DrivebackResult<Vec<RemoteEntry>> {
            unreachable!("resolver never lists children")
        }

        fn delete(&self, _entry_id: &str) -> DrivebackResult<()> {
            unreachable!("resolver never deletes")
        }

        fn upload(&self, _parent_id: &str, _archive: &Archive) -> DrivebackResult<String> {
            unreachable!("resolver never uploads")
        }
    }

    #[test]
    fn test_exact_match() {
        let store = Listing(vec![("1", "Photos"), ("2", "Backups"), ("3", "Docs")]);
        let folder = resolve_folder(&store, "Backups").unwrap();
        assert_eq!(folder.id, "2");
    }

    #[test]
    fn test_case_sensitive() {
        let store = Listing(vec![("1", "backups")]);
        let err = resolve_folder(&store, "Backups").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_folder() {
        let store = Listing(vec![("1", "Photos"), ("2", "Docs")]);
        let err = resolve_folder(&store, "Backups").unwrap_err();
        assert_eq!(err.to_string(), "Remote folder not found: Backups");
    }

    #[test]
    fn test_empty_listing() {
        let store = Listing(Vec::new());
        assert!(resolve_folder(&store, "Backups").unwrap_err().is_not_found());
    }

    #[test]
    fn test_first_match_wins() {
        let store = Listing(vec![("a", "Backups"), ("b", "Backups")]);
        assert_eq!(resolve_folder(&store, "Backups").unwrap().id, "a");
    }

    #[test]
    fn test_name_with_slash_matches_literally() {
        let store = Listing(vec![("a", "2024"), ("b", "2024/Q1")]);
        assert_eq!(resolve_folder(&store, "2024/Q1").unwrap().id, "b");
        assert!(resolve_folder(&store, "2024/Q2").unwrap_err().is_not_found());
    }
}
