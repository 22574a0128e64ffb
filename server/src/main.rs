use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

mod handlers;
mod state;

use crate::handlers::index_handler;
use crate::state::AppState;

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

fn port_from(value: Option<String>) -> u16 {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn app(public_dir: PathBuf) -> Router {
    let state = AppState {
        index_file: public_dir.join("index.html"),
    };
    Router::new()
        .route("/", get(index_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    if !public_dir.is_dir() {
        log::warn!("Public dir {} does not exist", public_dir.display());
    }

    let port = port_from(std::env::var("PORT").ok());
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            log::error!("Failed to bind {addr}: {error}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Shapeboard running at http://localhost:{port} serving {}",
        public_dir.display()
    );
    if let Err(error) = axum::serve(listener, app(public_dir)).await {
        log::error!("Server stopped: {error}");
        std::process::exit(1);
    }
}
