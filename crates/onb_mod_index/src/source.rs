//! Where the catalog and mod archives come from.
//!
//! The indexer talks to the outside world only through the [`ModSource`] trait so
//! the incremental logic can be driven by an in-memory source in tests. The crate
//! ships [`HttpModSource`], a blocking `reqwest` client for the live endpoints.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::io::Write;
use std::time::Duration;

/// Default location of the mod list.
pub const DEFAULT_CATALOG_URL: &str = "https://onb.keristero.com/mod_list/";

/// Default archive URL template; `{}` is replaced by the attachment ID.
pub const DEFAULT_DOWNLOAD_TEMPLATE: &str = "https://onb.keristero.com/mods/{}.zip";

/// Placeholder substituted with the attachment ID in download templates.
pub const ATTACHMENT_PLACEHOLDER: &str = "{}";

/// Access to the remote catalog and archives.
pub trait ModSource {
    /// Fetch the full catalog.
    ///
    /// Any error here is fatal for the run.
    fn fetch_catalog(&self) -> Result<Catalog>;

    /// Stream the archive for `attachment_id` into `sink`, returning the number
    /// of bytes written.
    ///
    /// A refused download is reported as [`Error::DownloadRejected`]. Partial
    /// data may already have been written to `sink` when an error is returned.
    fn download_archive(&self, attachment_id: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// Build the download URL for an attachment.
pub fn archive_url(template: &str, attachment_id: &str) -> String {
    template.replace(ATTACHMENT_PLACEHOLDER, attachment_id)
}

/// [`ModSource`] backed by the live HTTP endpoints.
pub struct HttpModSource {
    client: Client,
    catalog_url: String,
    download_template: String,
}

impl HttpModSource {
    /// Create a source for the given endpoints.
    ///
    /// # Arguments
    ///
    /// * `catalog_url` - URL answering with the catalog JSON object
    /// * `download_template` - archive URL with a `{}` placeholder for the attachment ID
    /// * `timeout` - per-request timeout; `None` keeps the client default
    pub fn new(
        catalog_url: impl Into<String>,
        download_template: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(format!(
            "onb-mod-index/{}",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            catalog_url: catalog_url.into(),
            download_template: download_template.into(),
        })
    }
}

impl ModSource for HttpModSource {
    fn fetch_catalog(&self) -> Result<Catalog> {
        tracing::info!("Fetching mod list from {}", self.catalog_url);

        let resp = self.client.get(&self.catalog_url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::CatalogStatus {
                url: self.catalog_url.clone(),
                status: status.as_u16(),
            });
        }

        match resp.json::<Value>()? {
            Value::Object(catalog) => Ok(catalog),
            other => Err(Error::InvalidCatalog(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn download_archive(&self, attachment_id: &str, sink: &mut dyn Write) -> Result<u64> {
        let url = archive_url(&self.download_template, attachment_id);
        tracing::info!("Downloading {}", url);

        let mut resp = self.client.get(&url).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::DownloadRejected {
                url,
                status: status.as_u16(),
            });
        }

        Ok(resp.copy_to(sink)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
