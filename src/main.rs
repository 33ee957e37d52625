use anyhow::Context;
use familien::configuration::get_configuration;
use familien::startup::Application;
use familien::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::get_subscriber("familien".into(), "info".into(), std::io::stdout);
    telemetry::init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration")?;

    tracing::info!(
        application_host = %configuration.application.host,
        application_port = configuration.application.port,
        environment = ?configuration.application.environment,
        "got configuration"
    );

    let application = Application::build(configuration)
        .await
        .context("Failed to build the application")?;
    application.run_until_stopped().await
}
