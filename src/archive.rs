//! JDK archive inspection and extraction.
//!
//! Archives come in two shapes: gzip-compressed tarballs on linux/macOS and
//! zip files on windows. The format is chosen from the file name alone.
//!
//! The directory an archive expands into is not part of the download
//! metadata, so it is predicted from the archive's first entry. This relies
//! on distributions packing the root directory first.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::Archive;

use crate::error::{Result, ToolchainError};

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.gz` / `.tgz`
    TarGz,
    /// Anything else is read as zip.
    Zip,
}

impl ArchiveFormat {
    /// Select the format from a file name suffix.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Zip
        }
    }

    /// Format of the archive at `path`.
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        Self::from_file_name(&name)
    }
}

/// Name of the top-level directory `archive` expands into.
///
/// Only the first entry is read, skipping tar global pax headers. Its
/// leading path component is returned, so both `jdk-17/` and
/// `jdk-17/bin/java` yield `jdk-17`.
pub fn top_level_entry_name(archive: &Path) -> Result<String> {
    let first = match ArchiveFormat::of(archive) {
        ArchiveFormat::TarGz => first_tar_entry(archive),
        ArchiveFormat::Zip => first_zip_entry(archive),
    }
    .map_err(|message| archive_error(archive, message))?;

    Path::new(&first)
        .components()
        .find_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .ok_or_else(|| archive_error(archive, format!("unusable first entry '{}'", first)))
}

/// Unpack `archive` into `dest`, overwriting existing files.
///
/// Directory structure and unix permission bits are kept so the result is
/// directly runnable.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    tracing::debug!("Extracting {} into {}", archive.display(), dest.display());

    match ArchiveFormat::of(archive) {
        ArchiveFormat::TarGz => extract_tar_gz(archive, dest),
        ArchiveFormat::Zip => extract_zip(archive, dest),
    }
    .map_err(|message| archive_error(archive, message))
}

fn archive_error(path: &Path, message: String) -> ToolchainError {
    ToolchainError::Archive {
        path: path.to_path_buf(),
        message,
    }
}

fn first_tar_entry(path: &Path) -> std::result::Result<String, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let entries = archive
        .entries()
        .map_err(|e| format!("Failed to read tar: {}", e))?;

    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read tar entry: {}", e))?;
        // global pax headers are metadata, not archive content
        if entry.header().entry_type().is_pax_global_extensions() {
            continue;
        }
        let name = entry
            .path()
            .map_err(|e| format!("Invalid path in tar: {}", e))?
            .to_string_lossy()
            .into_owned();
        return Ok(name);
    }
    Err("archive is empty".to_string())
}

fn first_zip_entry(path: &Path) -> std::result::Result<String, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| format!("Failed to open zip: {}", e))?;
    if archive.is_empty() {
        return Err("archive is empty".to_string());
    }
    let entry = archive
        .by_index(0)
        .map_err(|e| format!("Failed to read zip entry: {}", e))?;
    Ok(entry.name().to_string())
}

fn extract_tar_gz(path: &Path, dest: &Path) -> std::result::Result<(), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);
    archive
        .unpack(dest)
        .map_err(|e| format!("Failed to extract tar: {}", e))
}

fn extract_zip(path: &Path, dest: &Path) -> std::result::Result<(), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| format!("Failed to open zip: {}", e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read zip entry: {}", e))?;

        let outpath: PathBuf = match entry.enclosed_name() {
            Some(relative) => dest.join(relative),
            None => {
                tracing::warn!("Skipping zip entry with unsafe path: {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| e.to_string())?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let mut out = File::create(&outpath).map_err(|e| e.to_string())?;
        io::copy(&mut entry, &mut out).map_err(|e| e.to_string())?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}
