use hourglass_cli::{CliContext, logging, readline, respond};
use hourglass_core::{HourglassConfig, HourglassConfigExt};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), String> {
    let loaded = HourglassConfig::try_load();
    let debug_logging = loaded.as_ref().is_ok_and(|config| config.debug_logging);
    logging::init(debug_logging);

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Using default configuration");
        HourglassConfig::default()
    });
    tracing::info!(clock = config.clock.label(), "Starting hourglass");

    let ctx = CliContext::new(config).map_err(|e| e.to_string())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = readline(&mut lines).await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}
