use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ax = dogs_api::build(std::env::vars()).await?;
    let settings = dogs_api::Settings::from_app(&ax.app);

    tracing::info!(env = %settings.env, "starting dogs-api");

    ax.listen(settings.addr()).await?;

    Ok(())
}
