use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// One extra query parameter appended to every download URL.
///
/// Held as a list rather than a map so the configured order survives onto
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

/// Global configuration loaded from `~/.config/vdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VdlConfig {
    /// Scheme of the download endpoint (normally "https").
    pub download_url_scheme: String,
    /// Host (and optional port) of the download endpoint.
    pub download_url_authority: String,
    /// Base path of the download endpoint. The auth token, file id and
    /// version id are appended as further path segments.
    pub download_url_path: String,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Accept-Language header sent with every request.
    pub accept_language: String,
    /// Log the request URL (auth token included) and all response headers at
    /// debug level. Off by default.
    #[serde(default)]
    pub http_logging: bool,
    /// Extra query parameters appended to every download URL, in order.
    #[serde(default)]
    pub query_params: Vec<QueryParam>,
}

impl Default for VdlConfig {
    fn default() -> Self {
        Self {
            download_url_scheme: "https".to_string(),
            download_url_authority: "www.vaultstore.net".to_string(),
            download_url_path: "/api/1.0/download".to_string(),
            user_agent: format!("vdl/{}", env!("CARGO_PKG_VERSION")),
            accept_language: "en-US".to_string(),
            http_logging: false,
            query_params: Vec::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
