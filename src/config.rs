use std::{fs::read_to_string, path::Path, path::PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

pub const DEFAULT_ORG: &str = "mycompany";
const SESSION_FILE_NAME: &str = ".ppmpro.session";

/// Configuration for talking to a PPM Pro instance
#[derive(Clone)]
pub struct Config {
    pub org: String,
    pub cookie: String,
    pub proxy: Option<String>,
    /// Overrides the `https://<org>.ppmpro.com/api` base URL when set.
    pub base_url: Option<String>,
}

impl Config {
    pub fn new(org: impl Into<String>, cookie: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            cookie: cookie.into(),
            proxy: None,
            base_url: None,
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.ppmpro.com/api", self.org),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("org", &self.org)
            .field("cookie", &"<redacted>")
            .field("proxy", &self.proxy)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// `~/.ppmpro.session`, or a relative path if no home directory is known.
pub fn default_session_path() -> PathBuf {
    dirs::home_dir()
        .map(|dir| dir.join(SESSION_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SESSION_FILE_NAME))
}

/// Reads the session cookie from the first line of `path`.
pub fn load_cookie(path: &Path) -> Result<String> {
    debug!("Reading session cookie from {:?}", path);
    let contents = read_to_string(path).map_err(|source| Error::Credential {
        path: path.to_path_buf(),
        source,
    })?;

    let cookie = contents.lines().next().unwrap_or_default().trim();
    if cookie.is_empty() {
        return Err(Error::EmptyCredential {
            path: path.to_path_buf(),
        });
    }

    info!("Loaded session cookie ({} chars)", cookie.len());
    Ok(cookie.to_string())
}
