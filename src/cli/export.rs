use std::{path::PathBuf, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    acquisition::{DirectorySink, Orchestrator, ProgressReader, RetryPolicy, progress_channel},
    config, error, info,
    server::{ServerState, start_progress_server},
    service::{ServiceClient, acquire::endpoint_chain},
    success,
    types::{BatchReport, PlaylistInfo, ProgressState, Status},
    utils, warning,
};

pub async fn export(
    playlist_url: String,
    dest: Option<PathBuf>,
    strategies: Vec<String>,
    serve: bool,
) {
    let client = ServiceClient::from_env();
    let endpoints = if strategies.is_empty() {
        config::strategies()
    } else {
        strategies
    };
    let dest = dest.unwrap_or_else(config::download_dir);

    let chain = endpoint_chain(&client, &endpoints);
    if chain.is_empty() {
        error!("No acquisition endpoint configured. Set TRACKPORT_STRATEGIES or pass --strategy.");
    }

    let playlist = match client.playlist_info(&playlist_url).await {
        Ok(playlist) => {
            info!("{}", utils::playlist_heading(&playlist));
            Some(playlist)
        }
        Err(e) => {
            warning!("Cannot load playlist details: {}", e);
            None
        }
    };

    let (writer, reader) = progress_channel();
    let orchestrator = Orchestrator::new(
        chain,
        Arc::new(DirectorySink::new(dest.clone())),
        writer,
    )
    .with_policy(RetryPolicy::from_env())
    .with_pacing(config::pacing_delay());

    let cancel = orchestrator.cancel_token();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let shutdown = CancellationToken::new();
    if serve {
        let addr = config::server_addr();
        let state = ServerState {
            progress: reader.clone(),
            cancel: cancel.clone(),
        };
        let server_shutdown = shutdown.clone();
        info!("Progress available at http://{}/progress", addr);
        tokio::spawn(async move {
            if let Err(e) = start_progress_server(&addr, state, server_shutdown).await {
                warning!("Progress server stopped: {}", e);
            }
        });
    }

    info!(
        "Exporting to {} using {}",
        dest.display(),
        endpoints.join(" > ")
    );

    let pb = progress_bar();
    let renderer = tokio::spawn(render_progress(reader.clone(), pb.clone(), shutdown.clone()));

    let report = orchestrator
        .run_listed(client.list_batch(&playlist_url))
        .await;

    shutdown.cancel();
    let _ = renderer.await;
    pb.finish_and_clear();

    print_report(&report, &dest, playlist.as_ref());
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.green/white}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Polls the progress snapshot once per interval until the run reaches a
/// terminal status or `done` is cancelled.
async fn render_progress(reader: ProgressReader, pb: ProgressBar, done: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_millis(config::PROGRESS_POLL_MS));
    loop {
        let state = reader.snapshot();
        render(&state, &pb);
        if state.status.is_terminal() {
            return;
        }
        tokio::select! {
            _ = done.cancelled() => break,
            _ = interval.tick() => {}
        }
    }
    render(&reader.snapshot(), &pb);
}

fn render(state: &ProgressState, pb: &ProgressBar) {
    pb.set_length(state.total as u64);
    pb.set_position(state.current as u64);
    pb.set_message(status_text(state));
}

pub fn status_text(state: &ProgressState) -> String {
    match state.status {
        Status::Idle => "Idle".to_string(),
        Status::Starting => "Preparing download...".to_string(),
        Status::Downloading => match &state.current_track {
            Some(track) => format!("Downloading: {}", track),
            None => "Downloading tracks...".to_string(),
        },
        Status::Completed => format!("Completed! {} tracks downloaded.", state.successful),
        Status::Cancelled => "Download cancelled".to_string(),
        Status::Error => format!(
            "Download error: {}",
            state.error.as_deref().unwrap_or("Unknown error")
        ),
    }
}

fn print_report(report: &BatchReport, dest: &std::path::Path, playlist: Option<&PlaylistInfo>) {
    let source = playlist
        .map(|p| format!(" of {}", p.name))
        .unwrap_or_default();

    match report.status {
        Status::Error => error!(
            "Export failed: {}",
            report.error.as_deref().unwrap_or("Unknown error")
        ),
        Status::Cancelled => warning!(
            "Export{} cancelled after {}/{} tracks, {} saved.",
            source,
            report.processed,
            report.total,
            report.successful
        ),
        _ => success!(
            "Exported {}/{} tracks{} to {}",
            report.successful,
            report.total,
            source,
            dest.display()
        ),
    }

    if !report.failed.is_empty() {
        warning!(
            "{} track(s) could not be downloaded:",
            report.failed.len()
        );
        let table = Table::new(utils::failed_table_rows(&report.failed));
        println!("{table}\n");
    }
}
