/// The `builder` module contains the `ZigFetchBuilder` struct which is
/// used to create a `ZigFetch` instance.
use crate::{
    index::{BuildIndex, INDEX_URL},
    platform::Platform,
    zigfetch::{ZigFetch, BUILDS_URL},
};
use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Client,
};
use std::{
    env,
    path::{Path, PathBuf},
};
use url::Url;

/// `ZigFetchBuilder` is used to create a [`ZigFetch`] instance.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ZigFetchBuilder<'a> {
    index_url: Option<&'a str>,
    builds_url: Option<&'a str>,
    download_dir: Option<PathBuf>,
    platform: Option<Platform>,
}

impl<'a> ZigFetchBuilder<'a> {
    /// Returns a new empty `ZigFetchBuilder`.
    #[must_use]
    pub fn new() -> Self {
        ZigFetchBuilder::default()
    }

    /// Set the URL of the JSON index document listing the published
    /// builds. This is useful for testing or if you want to use a mirror.
    #[must_use]
    pub fn index_url(mut self, url: &'a str) -> Self {
        self.index_url = Some(url);
        self
    }

    /// Set the base URL that archive file names are appended to when
    /// downloading. This is useful for testing or if you want to use a
    /// mirror.
    #[must_use]
    pub fn builds_url(mut self, url: &'a str) -> Self {
        self.builds_url = Some(url);
        self
    }

    /// Set the directory the archive is downloaded into and extracted
    /// under. If not set, this defaults to the current directory.
    #[must_use]
    pub fn download_dir<P: AsRef<Path>>(mut self, download_dir: P) -> Self {
        self.download_dir = Some(download_dir.as_ref().to_path_buf());
        self
    }

    /// Set the platform to download for. If not set it will be resolved
    /// from the current host's OS and architecture.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Builds a new [`ZigFetch`] instance and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error when the host platform is unsupported (and none
    /// was set explicitly), when a URL override cannot be parsed, or when
    /// the current directory cannot be determined.
    pub fn build(self) -> Result<ZigFetch> {
        let platform = match self.platform {
            Some(p) => p,
            None => Platform::from_host()?,
        };
        let index_url = Url::parse(self.index_url.unwrap_or(INDEX_URL))
            .context("failed to parse the index URL")?;
        let builds_url = Url::parse(self.builds_url.unwrap_or(BUILDS_URL))
            .context("failed to parse the builds URL")?;
        let download_dir = match self.download_dir {
            Some(d) => d,
            None => env::current_dir().context("failed to get the current working directory")?,
        };
        debug!("downloading into {}", download_dir.display());

        Ok(ZigFetch::new(
            BuildIndex::new(index_url),
            builds_url,
            platform,
            download_dir,
            reqwest_client()?,
        ))
    }
}

fn reqwest_client() -> Result<Client> {
    let builder = Client::builder().gzip(true);

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!("zigfetch version {}", super::VERSION))?,
    );
    Ok(builder.default_headers(headers).build()?)
}
