//! Removal of the files a build leaves behind.

use crate::{log, project::Project};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

/// File names present in the root before the build.
#[derive(Debug, Default)]
pub struct Listing(FxHashSet<OsString>);

impl Listing {
    pub fn capture(root: &Path) -> Result<Self> {
        let names = fs::read_dir(root)
            .with_context(|| format!("failed to list `{}`", root.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.file_name()))
            .collect();
        Ok(Self(names))
    }

    /// Delete every file created since [`Listing::capture`], except `keep`.
    ///
    /// Directories are left alone. Files that cannot be removed are
    /// reported and skipped. Returns the removed paths.
    pub fn remove_new(&self, project: &Project, keep: &Path) -> Result<Vec<PathBuf>> {
        let root = project.root();
        let mut removed = Vec::new();

        let entries = fs::read_dir(root)
            .with_context(|| format!("failed to list `{}`", root.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if self.0.contains(&entry.file_name()) || path == keep || !path.is_file() {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                Err(err) => log!("warn"; "could not remove `{}`: {err}", path.display()),
            }
        }

        log!("clean"; "removed {} file(s)", removed.len());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remove_new_keeps_document_and_old_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let project = Project::new(root, "doc");
        fs::write(root.join("doc.tex"), "").unwrap();
        fs::write(root.join("doc.bib"), "").unwrap();

        let listing = Listing::capture(root).unwrap();
        for name in ["doc.aux", "doc.log", "doc.toc", "doc.pdf"] {
            fs::write(root.join(name), "").unwrap();
        }
        fs::create_dir(root.join("_minted-doc")).unwrap();

        let mut removed = listing.remove_new(&project, &project.output(true)).unwrap();
        removed.sort();

        assert_eq!(
            removed,
            vec![root.join("doc.aux"), root.join("doc.log"), root.join("doc.toc")]
        );
        assert!(root.join("doc.tex").exists());
        assert!(root.join("doc.bib").exists());
        assert!(root.join("doc.pdf").exists());
        assert!(root.join("_minted-doc").is_dir());
    }

    #[test]
    fn test_remove_new_keeps_only_requested_format() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let project = Project::new(root, "doc");

        let listing = Listing::capture(root).unwrap();
        fs::write(root.join("doc.dvi"), "").unwrap();
        fs::write(root.join("doc.pdf"), "").unwrap();

        listing.remove_new(&project, &project.output(false)).unwrap();
        assert!(root.join("doc.dvi").exists());
        assert!(!root.join("doc.pdf").exists());
    }

    #[test]
    fn test_capture_missing_root() {
        let dir = tempdir().unwrap();
        assert!(Listing::capture(&dir.path().join("missing")).is_err());
    }
}
