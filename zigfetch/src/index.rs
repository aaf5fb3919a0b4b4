use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::{
    header::{HeaderValue, ACCEPT},
    Client,
};
use serde::Deserialize;
use url::Url;

/// The index document listing every published build.
pub(crate) const INDEX_URL: &str = "https://ziglang.org/download/index.json";

/// A client for the download index. It makes exactly one request per
/// call and never retries.
#[derive(Debug)]
pub(crate) struct BuildIndex {
    url: Url,
}

#[derive(Debug, Deserialize)]
struct Index {
    master: MasterBuild,
}

#[derive(Debug, Deserialize)]
struct MasterBuild {
    version: String,
}

impl BuildIndex {
    pub(crate) fn new(url: Url) -> Self {
        BuildIndex { url }
    }

    /// Fetches the index document and returns the version string of the
    /// latest master build. The version is an opaque label as far as this
    /// tool is concerned.
    pub(crate) async fn latest_master_version(&self, client: &Client) -> Result<String> {
        debug!("fetching the build index from {}", self.url);

        let req = client
            .get(self.url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .build()
            .with_context(|| format!("failed to build HTTP request for {}", self.url))?;
        let resp = client
            .execute(req)
            .await
            .with_context(|| format!("failed to fetch the build index from {}", self.url))?;

        if !resp.status().is_success() {
            let mut msg = format!("error requesting {}: {}", self.url, resp.status());
            if let Ok(t) = resp.text().await {
                msg.push('\n');
                msg.push_str(&t);
            }
            return Err(anyhow!(msg));
        }

        let index = resp
            .json::<Index>()
            .await
            .with_context(|| format!("failed to parse the build index returned by {}", self.url))?;
        debug!("the latest master build is {}", index.master.version);
        Ok(index.master.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use test_log::test;

    const INDEX_PATH: &str = "/download/index.json";

    fn index_for(server: &Server) -> BuildIndex {
        BuildIndex::new(Url::parse(&format!("{}{INDEX_PATH}", server.url())).unwrap())
    }

    #[test(tokio::test)]
    async fn returns_the_master_version() -> Result<()> {
        let mut server = Server::new_async().await;
        let body = serde_json::json!({
            "master": {
                "version": "0.15.0-dev.233+7c85dc460",
                "date": "2026-08-01",
            },
            "0.14.1": {
                "version": "0.14.1",
                "date": "2025-05-21",
            },
        });
        let m = server
            .mock("GET", INDEX_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let version = index_for(&server)
            .latest_master_version(&Client::new())
            .await?;
        assert_eq!(version, "0.15.0-dev.233+7c85dc460");

        m.assert_async().await;
        Ok(())
    }

    #[test(tokio::test)]
    async fn errors_when_the_master_build_is_missing() -> Result<()> {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", INDEX_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"0.14.1": {"version": "0.14.1"}}"#)
            .create_async()
            .await;

        let err = index_for(&server)
            .latest_master_version(&Client::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse the build index"));

        m.assert_async().await;
        Ok(())
    }

    #[test(tokio::test)]
    async fn errors_on_a_body_that_is_not_json() -> Result<()> {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", INDEX_PATH)
            .with_status(200)
            .with_body("<html>not the index you are looking for</html>")
            .create_async()
            .await;

        let err = index_for(&server)
            .latest_master_version(&Client::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse the build index"));

        m.assert_async().await;
        Ok(())
    }

    #[test(tokio::test)]
    async fn errors_on_a_non_success_status() -> Result<()> {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", INDEX_PATH)
            .with_status(503)
            .with_body("upstream is sad")
            .create_async()
            .await;

        let err = index_for(&server)
            .latest_master_version(&Client::new())
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("503"), "error mentions the status: {msg}");
        assert!(msg.contains("upstream is sad"), "error carries the body: {msg}");

        m.assert_async().await;
        Ok(())
    }
}
