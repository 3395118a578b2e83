//! Fetch one page of the discover listing and print it.
//! Usage:
//!   cargo run -p movies-core --features cli --bin discover -- [popular|top_rated]
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use movies_core::{
    CatalogScreen, CatalogView, ClientConfig, HttpFetcher, MovieCatalogService, SortOrder,
    TcpProbe,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = ClientConfig::from_env().context("reading configuration")?;
    let sort_order = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<SortOrder>()?,
        None => config.sort_order,
    };

    let urls = config.url_builder()?;
    let probe = TcpProbe::for_url(urls.endpoint())
        .context("API root has no host to probe")?;
    let service = MovieCatalogService::with_parts(urls, HttpFetcher::new(), probe);

    info!(sort_by = sort_order.query_value(), "fetching catalog");
    let mut screen = CatalogScreen::new();
    screen.refresh();
    screen.finish(service.fetch_catalog(sort_order, &config.api_key));

    match screen.view() {
        CatalogView::Movies(catalog) => {
            for (index, movie) in catalog.iter().enumerate() {
                println!(
                    "{:>2}. {} ({:.1}) {}",
                    index + 1,
                    movie.title,
                    movie.user_rating,
                    movie.release_date
                );
            }
        }
        view => {
            if let Some(message) = view.message() {
                println!("{message}");
            }
        }
    }
    Ok(())
}
