use bbqjudge_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bbqjudge_observability::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let port = config.port;

    let app = bbqjudge_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap_or_else(|e| panic!("failed to bind 0.0.0.0:{port}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await?;
    Ok(())
}
