//! Minimal client for fetching the files of a gist.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Error};
use reqwest::blocking::Client;
use serde::Deserialize;

use eval_gist_exec::proto::SourceFile;

/// The gist evaluated when none is specified.
pub const DEFAULT_GIST_ID: &str = "4f1bae999b5fbea43624";

/// The base URL of the gist API.
const GIST_API_URL: &str = "https://api.github.com/gists";

/// How long to wait for the gist service.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The subset of the gist API response that is used.
#[derive(Debug, Deserialize)]
struct GistResponse {
    /// The identifier of the gist.
    id: String,
    /// The files of the gist, indexed by name.
    files: BTreeMap<String, GistFile>,
    /// The revisions of the gist, the latest first.
    #[serde(default)]
    history: Vec<GistRevision>,
}

/// A file of the gist.
#[derive(Debug, Deserialize)]
struct GistFile {
    /// The name of the file.
    filename: String,
    /// The content of the file, may be truncated for big files.
    #[serde(default)]
    content: Option<String>,
    /// Whether `content` is not complete.
    #[serde(default)]
    truncated: bool,
    /// Where to download the full content of the file.
    #[serde(default)]
    raw_url: Option<String>,
}

/// A revision of the gist.
#[derive(Debug, Deserialize)]
struct GistRevision {
    /// The hash of the revision.
    version: String,
}

/// Fetches the files of the gists.
#[derive(Debug, Clone)]
pub struct GistClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the API.
    api_url: String,
}

impl GistClient {
    /// Make a new client for the public gist API.
    pub fn new() -> Result<GistClient, Error> {
        let client = Client::builder()
            .user_agent(concat!("eval-gist/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(GistClient {
            client,
            api_url: GIST_API_URL.into(),
        })
    }

    /// Use a different base URL for the API.
    pub fn with_api_url<S: Into<String>>(mut self, api_url: S) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Download all the files of the gist, sorted by name. Each file keeps the gist identifier and
    /// the latest revision as provenance.
    pub fn fetch(&self, id: &str) -> Result<Vec<SourceFile>, Error> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), id);
        info!("Fetching gist from {}", url);
        let body = self
            .get(&url)
            .with_context(|| format!("Failed to fetch gist {id}"))?;
        let response = parse_gist(&body).with_context(|| format!("Invalid gist {id}"))?;
        let sha = response
            .history
            .first()
            .map(|rev| rev.version.clone())
            .unwrap_or_default();
        let mut files = vec![];
        for file in response.files.into_values() {
            let content = match (file.content, file.truncated, &file.raw_url) {
                (Some(content), false, _) => content,
                (_, _, Some(raw_url)) => {
                    debug!("Downloading full content of {}", file.filename);
                    self.get(raw_url)
                        .with_context(|| format!("Failed to download {}", file.filename))?
                }
                (content, _, None) => {
                    warn!("Content of {} may be incomplete", file.filename);
                    content.unwrap_or_default()
                }
            };
            files.push(
                SourceFile::new(file.filename, content).with_provenance(&response.id, &sha),
            );
        }
        Ok(files)
    }

    /// GET a URL returning its body, failing on non-success statuses.
    fn get(&self, url: &str) -> Result<String, Error> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}

/// Parse the JSON answer of the gist API.
fn parse_gist(body: &str) -> Result<GistResponse, Error> {
    Ok(serde_json::from_str(body)?)
}
