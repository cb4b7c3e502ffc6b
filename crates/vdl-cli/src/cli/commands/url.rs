//! `vdl url` – print the download URL without performing the request.
//!
//! The printed URL contains the auth token; treat shell history accordingly.

use anyhow::Result;

use vdl_core::config::{QueryParam, VdlConfig};
use vdl_core::request::{build_download_url, DownloadRequest};

pub async fn run_url(
    cfg: &VdlConfig,
    auth_token: String,
    file_id: u64,
    file_version: Option<u64>,
    params: Vec<QueryParam>,
) -> Result<()> {
    let mut request = DownloadRequest::new(&auth_token, file_id);
    request.version_id = file_version;
    request.query_params = params;
    let url = build_download_url(cfg, &request)?;
    println!("{url}");
    Ok(())
}
