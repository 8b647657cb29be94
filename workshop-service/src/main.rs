use workshop_service::{config::Config, services::metrics, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    service_core::observability::init_logging("info,workshop_service=debug", config.log.json);
    metrics::init_metrics();

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
