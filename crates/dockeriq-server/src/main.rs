use dockeriq_core::{App, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        logging::init_logging_json();
    } else {
        logging::init_logging();
    }

    let app = App::new().await?;
    tracing::info!(environment = %app.config.environment, "starting");
    app.run().await?;

    Ok(())
}
