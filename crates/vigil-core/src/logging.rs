use crate::Result;

/// Initialize tracing for the monitor binary.
///
/// Diagnostics default to warn-and-up so the console stays reserved for
/// status lines and alerts; override with `RUST_LOG` when debugging.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,{service_name}=info,vigil_core=info,vigil_telegram=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    Ok(())
}
