use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::coords::ArtifactCoordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Extracted { dest: PathBuf, files: usize },
    AlreadyPresent { dest: PathBuf },
}

/// Unpacks the archive behind `coords` under `output_root`.
///
/// An existing destination directory counts as already extracted, whatever
/// its contents. On failure the partially written tree is left in place.
pub fn extract_artifact(coords: &ArtifactCoordinates, output_root: &Path) -> Result<ExtractOutcome> {
    let dest = output_root.join(coords.output_dir());
    if dest.exists() {
        return Ok(ExtractOutcome::AlreadyPresent { dest });
    }

    std::fs::create_dir_all(&dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let file = File::open(&coords.path)
        .with_context(|| format!("Failed to open archive: {}", coords.path.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap archive: {}", coords.path.display()))?;
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", coords.path.display()))?;

    let mut files = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let mut out = File::create(&target)
            .with_context(|| format!("Failed to create file: {}", target.display()))?;
        std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to inflate entry: {}", target.display()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode & 0o7777))
                .with_context(|| format!("Failed to set mode on: {}", target.display()))?;
        }

        files += 1;
    }

    Ok(ExtractOutcome::Extracted { dest, files })
}
