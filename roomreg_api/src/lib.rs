//! REST surface of the user/room/message store.

mod error;
mod messages;
mod rooms;
mod users;


use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use roomreg_storage::{RoomStorage, UserStorage};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::ApiError;

#[derive(Clone)]
pub struct ApiState {
    pub users: Arc<dyn UserStorage>,
    pub rooms: Arc<dyn RoomStorage>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::upsert_user))
        .route("/users/{telegram_id}", get(users::get_user))
        .route("/rooms", post(rooms::create_room).get(rooms::list_rooms))
        .route("/rooms/{room_id}/members", post(rooms::add_member))
        .route(
            "/messages",
            post(messages::post_message).get(messages::list_messages),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Serves the store until `shutdown` is cancelled.
pub async fn serve(
    addr: SocketAddr,
    state: ApiState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Store API listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    log::info!("Store API stopped");
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    log::info!("{method} {uri} -> {}", response.status());

    response
}
