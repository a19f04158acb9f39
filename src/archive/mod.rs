//! Archive production
//!
//! Each run snapshots its source into one gzip-compressed tarball staged in
//! the work directory. The file name comes from the local time
//! (`DD-MM-YYYY:HH:MM:SS.tar.gz` by default) and doubles as the name of the
//! remote entry.

mod producer;

pub use producer::{Archive, ArchiveProducer, ARCHIVE_EXTENSION};
