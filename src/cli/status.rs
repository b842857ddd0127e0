use crate::{error, info, service::ServiceClient, success, warning};

pub async fn status() {
    let client = ServiceClient::from_env();
    info!("Resolution service: {}", client.base_url());

    match client.credentials_configured().await {
        Ok(true) => success!("Credentials are configured."),
        Ok(false) => {
            warning!("Credentials are not configured on the resolution service.");
            return;
        }
        Err(e) => error!("Cannot reach the resolution service: {}", e),
    }

    match client.is_authenticated().await {
        Ok(true) => success!("Authenticated."),
        Ok(false) => warning!("Not authenticated. Run trackport auth."),
        Err(e) => error!("Cannot check authentication status: {}", e),
    }
}
