//! `vdl get` – download a file to one or more local paths.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use vdl_core::config::{QueryParam, VdlConfig};
use vdl_core::download::FileDownload;
use vdl_core::outcome::DownloadStatus;
use vdl_core::progress::ProgressEvent;
use vdl_core::request::DownloadRequest;

pub async fn run_get(
    cfg: &VdlConfig,
    auth_token: String,
    file_id: u64,
    file_version: Option<u64>,
    params: Vec<QueryParam>,
    outputs: Vec<PathBuf>,
) -> Result<()> {
    let outputs = if outputs.is_empty() {
        vec![PathBuf::from(format!("{file_id}.bin"))]
    } else {
        outputs
    };

    let mut request = DownloadRequest::new(&auth_token, file_id);
    request.version_id = file_version;
    request.query_params = params;

    let mut sinks = Vec::with_capacity(outputs.len());
    for path in &outputs {
        let file =
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        sinks.push(BufWriter::new(file));
    }

    let mut engine = FileDownload::new(cfg.clone());
    let cancel = engine.cancel_token();

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressEvent>(16);
    engine.set_progress_sender(progress_tx);
    let printer = tokio::spawn(async move {
        let started = std::time::Instant::now();
        let mut printed = false;
        while let Some(event) = progress_rx.recv().await {
            let mib = event.bytes_transferred as f64 / 1_048_576.0;
            let elapsed = started.elapsed().as_secs_f64();
            let rate_mib = if elapsed > 0.0 { mib / elapsed } else { 0.0 };
            print!("\r  {:.1} MiB  {:.2} MiB/s  ", mib, rate_mib);
            let _ = std::io::stdout().flush();
            printed = true;
        }
        if printed {
            println!();
        }
    });

    let interrupt_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling download");
            interrupt_cancel.cancel();
        }
    });

    let result = tokio::task::spawn_blocking(move || {
        let mut sinks = sinks;
        engine.execute(&request, &mut sinks)
    })
    .await
    .context("download task failed")?;
    let _ = printer.await;

    let outcome = result.context("download aborted")?;
    match outcome.status {
        DownloadStatus::Ok => {
            println!("downloaded {} byte(s) to:", outcome.bytes_transferred);
            for path in &outputs {
                println!("  {}", path.display());
            }
            Ok(())
        }
        DownloadStatus::Cancelled => {
            bail!("cancelled after {} byte(s)", outcome.bytes_transferred)
        }
        DownloadStatus::WrongAuthToken => bail!("the server rejected the auth token"),
        DownloadStatus::Restricted => bail!("downloads of this file are restricted"),
        DownloadStatus::PermissionsError => bail!("permission denied (HTTP 403)"),
        DownloadStatus::ServiceUnavailable => bail!("service temporarily unavailable (HTTP 503)"),
        DownloadStatus::Failed => bail!("the server failed the download request"),
    }
}
