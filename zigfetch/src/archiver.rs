use crate::extension::Extension;
use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::Response;
use std::{
    fs::{self, File},
    io::{self, Write},
    path::Path,
    process::Command,
};
use zip::ZipArchive;

#[cfg(target_family = "unix")]
use std::fs::{set_permissions, Permissions};
#[cfg(target_family = "unix")]
use std::os::unix::fs::PermissionsExt;

/// How the downloaded archive gets unpacked. The variant is picked once,
/// from the extension the platform resolver chose, and both variants
/// expose the same save/extract contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Archiver {
    /// Zip files are read in-process.
    Zip,
    /// Tarballs are handed to the system `tar`, which also does the xz
    /// decompression.
    TarXz,
}

impl Archiver {
    pub(crate) fn for_extension(ext: Extension) -> Archiver {
        match ext {
            Extension::Zip => Archiver::Zip,
            Extension::TarXz => Archiver::TarXz,
        }
    }

    /// Streams the response body into a newly created file at
    /// `archive_path`, truncating anything already there, and returns the
    /// number of bytes written.
    pub(crate) async fn save(self, mut resp: Response, archive_path: &Path) -> Result<u64> {
        let mut file = File::create(archive_path).with_context(|| {
            format!(
                "failed to create file at {} for the downloaded archive",
                archive_path.display()
            )
        })?;
        let mut written = 0;
        while let Some(chunk) = resp
            .chunk()
            .await
            .context("failed to read chunk while downloading the archive")?
        {
            file.write_all(chunk.as_ref())
                .with_context(|| format!("failed to write chunk to {}", archive_path.display()))?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    /// Unpacks the archive at `archive_path` into `dest_dir` and returns
    /// the number of bytes written, or zero when the variant cannot count
    /// them. A failure part way through leaves whatever was already
    /// extracted in place.
    pub(crate) fn extract(self, archive_path: &Path, dest_dir: &Path) -> Result<u64> {
        match self {
            Archiver::Zip => extract_zip(archive_path, dest_dir),
            Archiver::TarXz => extract_tar_xz(archive_path, dest_dir),
        }
    }
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<u64> {
    debug!("extracting the zip file at {}", archive_path.display());

    let mut zip = ZipArchive::new(open_file(archive_path)?)
        .with_context(|| format!("failed to read {} as a zip file", archive_path.display()))?;
    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_string();
        // Entry names come straight from the archive, so refuse anything
        // that would land outside dest_dir.
        let Some(rel_path) = entry.enclosed_name() else {
            return Err(anyhow!(
                "the zip entry {name} would be extracted outside of {}",
                dest_dir.display()
            ));
        };
        let target = dest_dir.join(rel_path);
        debug!("writing zip entry {name} to {}", target.display());

        if entry.is_dir() {
            fs::create_dir_all(&target).with_context(|| {
                format!(
                    "failed to create directory {} for zip entry {name}",
                    target.display()
                )
            })?;
            set_entry_permissions(entry.unix_mode(), &target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create parent directory for zip entry {name}")
                })?;
            }
            let mode = entry.unix_mode();
            let mut file = File::create(&target).with_context(|| {
                format!("failed to create {} for zip entry {name}", target.display())
            })?;
            written += io::copy(&mut entry, &mut file)
                .with_context(|| format!("failed to write zip entry {name}"))?;
            set_entry_permissions(mode, &target)?;
        }
    }
    Ok(written)
}

#[cfg(target_family = "unix")]
fn set_entry_permissions(mode: Option<u32>, target: &Path) -> Result<()> {
    if let Some(mode) = mode {
        set_permissions(target, Permissions::from_mode(mode))
            .with_context(|| format!("failed to set permissions on {}", target.display()))?;
    }
    Ok(())
}

#[cfg(not(target_family = "unix"))]
fn set_entry_permissions(_mode: Option<u32>, _target: &Path) -> Result<()> {
    Ok(())
}

// There is no in-process xz handling. The system tar does both the
// decompression and the unpacking, which also means there is no byte
// count to report for this variant.
fn extract_tar_xz(archive_path: &Path, dest_dir: &Path) -> Result<u64> {
    debug!(
        "extracting the tarball at {} with the system tar",
        archive_path.display()
    );

    let output = Command::new("tar")
        .args(["-J", "-xf"])
        .arg(archive_path)
        .current_dir(dest_dir)
        .output()
        .with_context(|| format!("failed to run tar -J -xf {}", archive_path.display()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "tar -J -xf {} exited with {}: {}",
            archive_path.display(),
            output.status,
            stderr.trim()
        ));
    }
    Ok(0)
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open file at {}", path.display()))
}
