use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let practicum_token = std::env::var("PRACTICUM_TOKEN").unwrap_or_else(|_| "practicum".to_string());
    let telegram_token = std::env::var("TELEGRAM_TOKEN").unwrap_or_else(|_| "telegram".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, statuses = mock_review_api::STATUSES_PATH, "mock review API listening");
    mock_review_api::run(listener, mock_review_api::new_state(&practicum_token, &telegram_token)).await
}
