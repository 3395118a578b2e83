use std::sync::Arc;

use mock_server::{sample_movies, MockState, DEFAULT_API_KEY};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("MOCK_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}, api root http://{addr}/3");
    mock_server::run_with(listener, Arc::new(MockState::new(api_key, sample_movies()))).await
}
