use std::sync::Arc;

use vigil_core::{
    alert::ConsoleAlertSink, config::Config, errlog::ErrorLog, registry::AccountRegistry,
    supervisor::Supervisor,
};
use vigil_telegram::TelegramConnector;

#[tokio::main]
async fn main() -> Result<(), vigil_core::Error> {
    vigil_core::logging::init("vigil")?;

    let cfg = Arc::new(Config::load()?);
    let errlog = Arc::new(ErrorLog::new(cfg.log_file.clone()));
    let registry = AccountRegistry::load(&cfg.accounts_file)?;

    println!(
        "vigil started: {} account(s), monitoring groups via {}",
        registry.len(),
        cfg.monitor_account
    );

    let sink = Arc::new(ConsoleAlertSink::new(errlog.clone()));
    let supervisor = Supervisor::new(cfg, Arc::new(TelegramConnector), sink, errlog.clone());

    if let Err(e) = supervisor.run(registry).await {
        // Interrupts end the run normally above; anything arriving here is a
        // genuine fatal and belongs in the log with its full chain.
        errlog.record(&format!("Fatal error: {e:?}"));
        return Err(e);
    }
    Ok(())
}
