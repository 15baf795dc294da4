use std::sync::Arc;

use qm_core::{config::Config, provider::MailProvider};
use qm_onesecmail::OneSecMailClient;

#[tokio::main]
async fn main() -> Result<(), qm_core::Error> {
    let cfg = Arc::new(Config::load()?);
    qm_core::logging::init("qm", &cfg.log_file)?;

    let client = OneSecMailClient::new(cfg.api_base_url.clone(), cfg.api_timeout)?;
    tracing::info!("Mail API: {}", client.base_url());
    let provider: Arc<dyn MailProvider> = Arc::new(client);

    qm_telegram::router::run_polling(cfg, provider)
        .await
        .map_err(|e| qm_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
