use crate::{archiver::Archiver, extension::Extension, index::BuildIndex, platform::Platform};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use reqwest::{
    header::{HeaderValue, ACCEPT},
    Client, Response,
};
use std::path::{Path, PathBuf};
use url::Url;

/// All published archives live under this path, keyed by file name.
pub(crate) const BUILDS_URL: &str = "https://ziglang.org/builds";

/// `ZigFetch` is the core of this library. It resolves the latest master
/// build, downloads the platform-appropriate archive, and can unpack it
/// afterwards. Use the [`ZigFetchBuilder`](crate::ZigFetchBuilder) struct
/// to create a `ZigFetch` instance.
#[derive(Debug)]
pub struct ZigFetch {
    index: BuildIndex,
    builds_url: Url,
    platform: Platform,
    download_dir: PathBuf,
    client: Client,
}

/// A downloaded archive, as returned by [`ZigFetch::download`]. Pass it
/// back to [`ZigFetch::extract`] to unpack it.
#[derive(Debug)]
pub struct DownloadedArchive {
    archiver: Archiver,
    extension: Extension,
    version: String,
    archive_path: PathBuf,
    bytes: u64,
}

impl DownloadedArchive {
    /// The version string of the downloaded build, exactly as the index
    /// reported it.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Where the archive file was written.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// How many bytes of archive were downloaded.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// The directory the archive unpacks into, which is the archive path
    /// with the archive suffix removed.
    #[must_use]
    pub fn unpacked_path(&self) -> PathBuf {
        let path = self.archive_path.to_string_lossy();
        match path.strip_suffix(self.extension.extension()) {
            Some(stripped) => PathBuf::from(stripped),
            None => self.archive_path.clone(),
        }
    }

    /// Whether [`ZigFetch::extract`] can report how many bytes it wrote
    /// for this archive. The tarball variant delegates to the system
    /// `tar`, which does not say.
    #[must_use]
    pub fn counts_bytes(&self) -> bool {
        match self.archiver {
            Archiver::Zip => true,
            Archiver::TarXz => false,
        }
    }
}

impl ZigFetch {
    pub(crate) fn new(
        index: BuildIndex,
        builds_url: Url,
        platform: Platform,
        download_dir: PathBuf,
        client: Client,
    ) -> ZigFetch {
        ZigFetch {
            index,
            builds_url,
            platform,
            download_dir,
            client,
        }
    }

    /// Downloads the latest master build for the configured platform into
    /// the download directory.
    ///
    /// This makes two HTTP requests, one for the index document and one
    /// for the archive itself, in that order. Neither request is retried,
    /// and a file that was partially written before a failure is left
    /// where it is.
    ///
    /// # Errors
    ///
    /// * Network errors on either request, or a non-success status.
    /// * The index document is not JSON or does not contain a master
    ///   version.
    /// * The archive file cannot be created or written.
    pub async fn download(&self) -> Result<DownloadedArchive> {
        let version = self.index.latest_master_version(&self.client).await?;
        info!("the latest master build is {version}");

        let name = self.archive_name(&version);
        let url = self.download_url(&name)?;
        let resp = self.request_archive(url).await?;

        let archive_path = self.download_dir.join(&name);
        let extension = self.platform.extension();
        let archiver = Archiver::for_extension(extension);
        let bytes = archiver.save(resp, &archive_path).await?;
        info!("downloaded the archive to {}", archive_path.display());

        Ok(DownloadedArchive {
            archiver,
            extension,
            version,
            archive_path,
            bytes,
        })
    }

    /// Unpacks a downloaded archive into the download directory and
    /// returns the number of bytes written, or zero when the archive
    /// variant cannot count them.
    ///
    /// # Errors
    ///
    /// * The archive cannot be opened or is corrupt.
    /// * An entry cannot be written, or its name points outside the
    ///   download directory.
    /// * The external `tar` is missing or exits with a failure.
    pub fn extract(&self, download: &DownloadedArchive) -> Result<u64> {
        download
            .archiver
            .extract(download.archive_path(), &self.download_dir)
    }

    fn archive_name(&self, version: &str) -> String {
        format!(
            "zig-{}-{}-{}{}",
            self.platform.os(),
            self.platform.arch(),
            version,
            self.platform.extension().extension(),
        )
    }

    fn download_url(&self, name: &str) -> Result<Url> {
        let mut url = self.builds_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("could not get path segments for {}", self.builds_url))?
            .push(name);
        Ok(url)
    }

    async fn request_archive(&self, url: Url) -> Result<Response> {
        debug!("downloading the archive from {url}");

        let req = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/octet-stream"))
            .build()
            .with_context(|| format!("failed to build HTTP request for {url}"))?;
        let resp = self
            .client
            .execute(req)
            .await
            .with_context(|| format!("failed to download the archive from {url}"))?;
        if !resp.status().is_success() {
            let mut msg = format!("error requesting {url}: {}", resp.status());
            if let Ok(t) = resp.text().await {
                msg.push('\n');
                msg.push_str(&t);
            }
            return Err(anyhow!(msg));
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use rstest::rstest;

    fn zigfetch_for(platform: Platform) -> ZigFetch {
        ZigFetch::new(
            BuildIndex::new(Url::parse(crate::index::INDEX_URL).unwrap()),
            Url::parse(BUILDS_URL).unwrap(),
            platform,
            PathBuf::from("/downloads"),
            Client::new(),
        )
    }

    #[rstest]
    #[case::windows(
        Platform::new(Os::Windows, Arch::X86_64),
        "zig-windows-x86_64-0.15.0-dev.233+7c85dc460.zip"
    )]
    #[case::linux(
        Platform::new(Os::Linux, Arch::Aarch64),
        "zig-linux-aarch64-0.15.0-dev.233+7c85dc460.tar.xz"
    )]
    #[case::macos(
        Platform::new(Os::MacOS, Arch::Aarch64),
        "zig-macos-aarch64-0.15.0-dev.233+7c85dc460.tar.xz"
    )]
    fn archive_names_follow_the_index_scheme(#[case] platform: Platform, #[case] expect: &str) {
        let zigfetch = zigfetch_for(platform);
        assert_eq!(zigfetch.archive_name("0.15.0-dev.233+7c85dc460"), expect);
    }

    #[test]
    fn download_urls_append_the_name_as_one_segment() {
        let zigfetch = zigfetch_for(Platform::new(Os::Linux, Arch::X86_64));
        let url = zigfetch
            .download_url("zig-linux-x86_64-0.15.0.tar.xz")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ziglang.org/builds/zig-linux-x86_64-0.15.0.tar.xz"
        );
    }

    #[test]
    fn unpacked_path_strips_the_archive_suffix() {
        let download = DownloadedArchive {
            archiver: Archiver::TarXz,
            extension: Extension::TarXz,
            version: "0.15.0-dev.233+7c85dc460".to_string(),
            archive_path: PathBuf::from("/downloads/zig-linux-x86_64-0.15.0-dev.233+7c85dc460.tar.xz"),
            bytes: 0,
        };
        assert_eq!(
            download.unpacked_path(),
            PathBuf::from("/downloads/zig-linux-x86_64-0.15.0-dev.233+7c85dc460")
        );
    }
}
