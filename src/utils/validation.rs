//! Centralized validation of command inputs.
//!
//! Everything here runs before any log is parsed or any BAM is read, so a bad
//! invocation fails without doing work and without touching the output path.

use std::path::{Path, PathBuf};

/// Input validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Input file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Input path is not a file: {0}")]
    NotAFile(PathBuf),
    #[error("BAM index not found for {bam} (expected {expected}); run `samtools index` first")]
    MissingBamIndex { bam: PathBuf, expected: PathBuf },
    #[error("Jaccard threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("Output directory does not exist: {0}")]
    MissingOutputDir(PathBuf),
}

/// Check that `path` exists and is a regular file.
///
/// # Errors
///
/// Returns `ValidationError::MissingFile` or `ValidationError::NotAFile`.
pub fn ensure_readable(path: &Path) -> Result<(), ValidationError> {
    if !path.exists() {
        return Err(ValidationError::MissingFile(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ValidationError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Index locations noodles reads for a BAM file, in lookup order:
/// `<bam>.bai` then `<bam>.csi`
#[must_use]
pub fn bam_index_candidates(bam: &Path) -> [PathBuf; 2] {
    [push_ext(bam, "bai"), push_ext(bam, "csi")]
}

/// The first index file present next to `bam`
#[must_use]
pub fn find_bam_index(bam: &Path) -> Option<PathBuf> {
    bam_index_candidates(bam).into_iter().find(|p| p.is_file())
}

fn push_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Check that a BAM file and a BAI or CSI index noodles can open exist.
///
/// # Errors
///
/// Returns `ValidationError::MissingFile`/`NotAFile` for the BAM itself, or
/// `ValidationError::MissingBamIndex` if no index is found next to it.
pub fn ensure_indexed_bam(bam: &Path) -> Result<(), ValidationError> {
    ensure_readable(bam)?;

    if find_bam_index(bam).is_some() {
        Ok(())
    } else {
        let [expected, _] = bam_index_candidates(bam);
        Err(ValidationError::MissingBamIndex {
            bam: bam.to_path_buf(),
            expected,
        })
    }
}

/// Check that a Jaccard threshold lies in (0, 1].
///
/// # Errors
///
/// Returns `ValidationError::InvalidThreshold` otherwise (including NaN).
pub fn validate_threshold(threshold: f64) -> Result<f64, ValidationError> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(threshold)
    } else {
        Err(ValidationError::InvalidThreshold(threshold))
    }
}

/// Check that the directory an output file will be written to exists.
///
/// # Errors
///
/// Returns `ValidationError::MissingOutputDir` if the parent directory is
/// missing.
pub fn ensure_output_dir(output: &Path) -> Result<(), ValidationError> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ValidationError::MissingOutputDir(parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_readable() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("run.log");
        std::fs::write(&file, ">bundle chr1:1-2\n").unwrap();

        assert!(ensure_readable(&file).is_ok());
        assert!(matches!(
            ensure_readable(&dir.path().join("missing.log")),
            Err(ValidationError::MissingFile(_))
        ));
        assert!(matches!(
            ensure_readable(dir.path()),
            Err(ValidationError::NotAFile(_))
        ));
    }

    #[test]
    fn test_bam_index_candidates() {
        let [bai, csi] = bam_index_candidates(Path::new("/data/run1.bam"));
        assert_eq!(bai, PathBuf::from("/data/run1.bam.bai"));
        assert_eq!(csi, PathBuf::from("/data/run1.bam.csi"));
    }

    #[test]
    fn test_ensure_indexed_bam() {
        let dir = TempDir::new().unwrap();
        let bam = dir.path().join("sample.bam");
        std::fs::write(&bam, b"").unwrap();

        assert!(matches!(
            ensure_indexed_bam(&bam),
            Err(ValidationError::MissingBamIndex { .. })
        ));

        // noodles never opens `sample.bai`, so it must not satisfy the check
        std::fs::write(dir.path().join("sample.bai"), b"").unwrap();
        assert!(matches!(
            ensure_indexed_bam(&bam),
            Err(ValidationError::MissingBamIndex { .. })
        ));

        std::fs::write(dir.path().join("sample.bam.csi"), b"").unwrap();
        assert!(ensure_indexed_bam(&bam).is_ok());
        assert_eq!(find_bam_index(&bam), Some(dir.path().join("sample.bam.csi")));

        std::fs::write(dir.path().join("sample.bam.bai"), b"").unwrap();
        assert_eq!(find_bam_index(&bam), Some(dir.path().join("sample.bam.bai")));
    }

    #[test]
    fn test_validate_threshold() {
        assert_eq!(validate_threshold(0.1).unwrap(), 0.1);
        assert_eq!(validate_threshold(1.0).unwrap(), 1.0);
        assert!(validate_threshold(0.0).is_err());
        assert!(validate_threshold(-0.5).is_err());
        assert!(validate_threshold(1.01).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_ensure_output_dir() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_output_dir(&dir.path().join("out.csv")).is_ok());
        assert!(ensure_output_dir(Path::new("out.csv")).is_ok());
        assert!(matches!(
            ensure_output_dir(&dir.path().join("nope").join("out.csv")),
            Err(ValidationError::MissingOutputDir(_))
        ));
    }
}
