//! Safety checks for snapshot writing.
//!
//! Writing a catalog snapshot is the one place this tool replaces a file
//! wholesale, so the target is validated against the run's own input files
//! before anything touches the disk.

use anyhow::{bail, Result};
use std::path::Path;

/// Refuse a write target that aliases one of the run's input files.
pub fn validate_write_target(target: &Path, inputs: &[&Path]) -> Result<()> {
    for input in inputs {
        if target == *input {
            bail!(
                "Safety check failed: snapshot target '{}' is also an input file",
                target.display()
            );
        }
    }
    Ok(())
}

/// Refuse to replace an existing file unless `--force` was given.
pub fn check_overwrite(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        bail!(
            "Safety check failed: '{}' already exists; pass --force to overwrite it",
            target.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fresh_target_passes() {
        let target = PathBuf::from("/tmp/library.csv");
        let feed = PathBuf::from("/data/listens.csv");
        let corrections = PathBuf::from("/data/corrections.csv");
        assert!(validate_write_target(&target, &[&feed, &corrections]).is_ok());
    }

    #[test]
    fn test_target_aliasing_input_blocked() {
        let path = PathBuf::from("/data/listens.csv");
        let result = validate_write_target(&path, &[&path]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("is also an input file"));
    }

    #[test]
    fn test_existing_target_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("library.csv");
        std::fs::write(&target, "stale").unwrap();

        let result = check_overwrite(&target, false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("--force"));

        assert!(check_overwrite(&target, true).is_ok());
    }

    #[test]
    fn test_missing_target_never_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("library.csv");
        assert!(check_overwrite(&target, false).is_ok());
    }
}
