use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Check the path passed to --config, or omit it to use onb-mod-index.toml")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check your onb-mod-index.toml file for syntax errors and unknown keys")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid download template: {template}")]
    #[diagnostic(
        code(config::invalid_template),
        help("The download template must contain a {{}} placeholder for the attachment ID, e.g. https://onb.keristero.com/mods/{{}}.zip")
    )]
    InvalidDownloadTemplate { template: String },

    #[error("Failed to set up the HTTP client")]
    #[diagnostic(code(http::client_setup))]
    HttpClientSetup {
        #[source]
        source: onb_mod_index::Error,
    },

    #[error("Failed to fetch the mod list from {url}")]
    #[diagnostic(
        code(catalog::unavailable),
        help("Nothing was written. Check your network connection and the catalog_url setting")
    )]
    CatalogUnavailable {
        url: String,
        #[source]
        source: onb_mod_index::Error,
    },

    #[error("Status cache is unreadable: {path}")]
    #[diagnostic(
        code(cache::invalid),
        help("Nothing was written. Fix or delete the cache file; deleting it forces every mod to be downloaded again")
    )]
    CacheUnreadable {
        path: Utf8PathBuf,
        #[source]
        source: onb_mod_index::Error,
    },

    #[error("Failed to write index output")]
    #[diagnostic(
        code(fs::write_failed),
        help("Check file permissions and available disk space")
    )]
    OutputFailed {
        #[source]
        source: onb_mod_index::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn config_parse_error(path: Utf8PathBuf, source: toml::de::Error) -> Self {
        Self::ConfigParseError { path, source }
    }

    pub fn invalid_download_template(template: String) -> Self {
        Self::InvalidDownloadTemplate { template }
    }

    pub fn http_client_setup(source: onb_mod_index::Error) -> Self {
        Self::HttpClientSetup { source }
    }
}
