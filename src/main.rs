use anyhow::Context;
use tagged_todos::config::Config;
use tagged_todos::http::routes::{self, AppState};
use tagged_todos::http::routing;
use tagged_todos::http::urls::UrlBuilder;
use tagged_todos::infrastructure::{seed, store::Store, tag_repo::SqliteTagRepository, todo_repo::SqliteTodoRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store = Store::connect(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    store.init().await.context("creating collections")?;
    seed::populate_if_empty(&store).await.context("seeding default todos")?;

    let state = AppState {
        todos: SqliteTodoRepository::new(store.clone()),
        tags: SqliteTagRepository::new(store.clone()),
        urls: UrlBuilder::new(&config.public_url),
    };
    let router = routing::app(routes::api(state));

    let addr = config.bind_addr;
    tracing::info!(%addr, public_url = %config.public_url, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
