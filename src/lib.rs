//! A synchronization backend for a shared shopping list.
//!
//! Clients fetch the unchecked items and change them (add, check off, delete,
//! change quantity) through a single JSON endpoint selected by an `action`
//! field. Everything is stored in one SQLite database file.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod action;
mod api;
mod app_state;
mod category;
mod db;
mod endpoints;
mod error;
mod item;
mod logging;
mod routing;
#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{CategoryName, get_all_categories};
pub use db::{DEFAULT_BUSY_TIMEOUT, initialize as initialize_db, open as open_db};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_SIZE, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
