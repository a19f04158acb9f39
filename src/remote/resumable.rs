//! Header arithmetic for resumable uploads

use crate::error::{DrivebackError, DrivebackResult};

/// `Content-Range` value for bytes `start..=end` of a `total`-byte upload
pub fn content_range(start: u64, end: u64, total: u64) -> String {
    format!("bytes {}-{}/{}", start, end, total)
}

/// Offset to continue from after a `308 Resume Incomplete`
///
/// The server reports what it holds as `Range: bytes=0-N`; no header means it
/// has nothing yet.
pub fn resume_offset(range: Option<&str>) -> DrivebackResult<u64> {
    let Some(range) = range else {
        return Ok(0);
    };

    range
        .trim()
        .strip_prefix("bytes=")
        .and_then(|r| r.split_once('-'))
        .and_then(|(_, end)| end.trim().parse::<u64>().ok())
        .and_then(|end| end.checked_add(1))
        .ok_or_else(|| {
            DrivebackError::Transport(format!("Unexpected Range header in upload: {}", range))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_range() {
        assert_eq!(content_range(0, 262_143, 600_000), "bytes 0-262143/600000");
        assert_eq!(
            content_range(524_288, 599_999, 600_000),
            "bytes 524288-599999/600000"
        );
    }

    #[test]
    fn test_resume_offset() {
        assert_eq!(resume_offset(None).unwrap(), 0);
        assert_eq!(resume_offset(Some("bytes=0-262143")).unwrap(), 262_144);
        assert_eq!(resume_offset(Some(" bytes=0-99 ")).unwrap(), 100);
    }

    #[test]
    fn test_resume_offset_garbage() {
        let err = resume_offset(Some("items=3")).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_resume_offset_overflow() {
        let err = resume_offset(Some("bytes=0-18446744073709551615")).unwrap_err();
        assert!(err.is_transport());
    }
}
