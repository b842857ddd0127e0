use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config, error, info,
    service::{ServiceClient, auth::AuthPoller},
    success,
    types::AuthState,
    warning,
};

pub async fn auth() {
    let client = ServiceClient::from_env();

    match client.credentials_configured().await {
        Ok(true) => {}
        Ok(false) => error!(
            "The resolution service at {} has no API credentials configured. Set them on the service first.",
            client.base_url()
        ),
        Err(e) => error!(
            "Cannot reach the resolution service at {}: {}",
            client.base_url(),
            e
        ),
    }

    if let Ok(true) = client.is_authenticated().await {
        success!("Already authenticated.");
        return;
    }

    let poller = AuthPoller::new(Arc::new(client))
        .with_interval(config::auth_poll_interval())
        .with_timeout(config::auth_timeout());

    let cancel = poller.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message("Requesting authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let session = poller
        .begin_authorization(|url| {
            pb.suspend(|| {
                if webbrowser::open(url).is_err() {
                    warning!(
                        "Failed to open browser. Please navigate to the following URL manually:\n{}",
                        url
                    );
                } else {
                    info!("Opened the authorization page in your browser:\n{}", url);
                }
            });
            pb.set_message("Waiting for authorization...");
        })
        .await;

    pb.finish_and_clear();

    match session.state {
        AuthState::Authenticated => success!("Authentication successful!"),
        AuthState::Idle => warning!("Authentication cancelled."),
        _ => {
            if let Err(e) = session.into_result() {
                error!("{}", e);
            }
        }
    }
}
