//! Documentation of the Forsit inventory backend.
//!
//!
//!
//! # General Infrastructure
//! - Single axum server, JSON in and out
//! - Products and sales live in two flat JSON documents under the data directory
//! - Uploaded files live in the uploads directory and are served back from `/uploads`
//! - No database, no accounts, CORS open to any origin
//!
//!
//!
//! # Endpoints
//!
//! | method | path | result |
//! |---|---|---|
//! | GET | `/` | greeting |
//! | POST | `/upload-file` | stores multipart field `file` |
//! | POST | `/add-new-product` | appends a product, `201` |
//! | POST | `/add-new-sale` | appends a sale, `201` |
//! | GET | `/view-all-products` | products document |
//! | GET | `/view-all-sales?filter=&category=` | sales trend chart |
//! | GET | `/view-product/{id}` | one product or `404` |
//! | PUT | `/update-product/{id}` | shallow merge or `404` |
//! | DELETE | `/delete-product/{id}` | removed product or `404` |
//!
//!
//!
//! # Notes
//!
//! ## Trend filters
//! `filter` is one of `all`, `daily`, `weekly`, `monthly`, `annually`. Anything else is treated as
//! `all`. Weeks start on Sunday unless `WEEK_START=monday`.
//!
//! ## Concurrent writes
//! Each document has its own lock, so two sales posted at the same time both land. Another
//! process writing the same files is not coordinated with.
//!
//!
//!
//! # Setup
//!
//! Run the server.
//! ```sh
//! RUST_LOG=info cargo run -p backend
//! `````
//!
//! Back-fill a week of sales either side of today.
//! ```sh
//! cargo run -p seed -- 7 7
//! `````
//!
//! Environment.
//! ```sh
//! RUST_PORT=3000
//! DATA_DIR=data
//! UPLOADS_DIR=uploads
//! SERVER_URL=http://localhost:3000
//! WEEK_START=sunday
//! MAX_UPLOAD_BYTES=10485760
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::{delete, get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod utils;

use routes::{
    add_product_handler, add_sale_handler, delete_product_handler, root_handler,
    update_product_handler, upload_handler, view_all_products_handler, view_all_sales_handler,
    view_product_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shut down");
}

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root_handler))
        .route("/upload-file", post(upload_handler))
        .route("/add-new-product", post(add_product_handler))
        .route("/add-new-sale", post(add_sale_handler))
        .route("/view-all-products", get(view_all_products_handler))
        .route("/view-all-sales", get(view_all_sales_handler))
        .route("/view-product/{id}", get(view_product_handler))
        .route("/update-product/{id}", put(update_product_handler))
        .route("/delete-product/{id}", delete(delete_product_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
