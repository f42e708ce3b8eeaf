use anyhow::Context;
use jobboard_service::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config);

    let store = connect(&config.store)
        .await
        .context("failed to open document store")?;
    let state = AppState::new(config, store);
    let app = router(state.clone());

    Server::new(state).serve(app).await?;

    Ok(())
}
