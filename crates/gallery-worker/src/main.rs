use gallery_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = gallery_worker::setup::initialize_app(config.clone()).await?;

    gallery_worker::setup::server::start_server(&config, router).await?;

    Ok(())
}
