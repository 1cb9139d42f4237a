use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use snafu::{ensure, ResultExt, Snafu};
use tower_http::trace::TraceLayer;

use crate::models::{ErrorMessage, Image, ImageTag};
use crate::service::ReleaseService;

/// Errors surfaced by the http api. Each one is answered with a status code
/// and a json body of the form `{"message": "..."}`.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum ApiError {
    #[snafu(display("malformed request parameters: {reason}"))]
    BadRequest { reason: String },
    #[snafu(display("{source}"))]
    Catalog { source: crate::error::Error },
    #[snafu(display("failed to set tag: {source}"))]
    Release { source: crate::error::Error },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Catalog { .. } | Self::Release { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            warn!(target: "server", "{}", message);
        }
        (status, Json(ErrorMessage { message })).into_response()
    }
}

/// Routes of the release api, bound to `service`
pub fn router(service: ReleaseService) -> Router {
    Router::new()
        .route("/images", get(get_images).post(post_images))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(service))
}

/// Serve the release api on `addr` until ctrl-c is received
pub async fn serve(service: ReleaseService, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        target: "server",
        "serving {} on http://{}",
        service.registry().address(),
        listener.local_addr()?
    );
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target: "server", "shutting down"),
        Err(e) => error!(target: "server", "failed to listen for ctrl-c: {}", e),
    }
}

async fn get_images(
    State(service): State<Arc<ReleaseService>>,
) -> Result<Json<Vec<Image>>, ApiError> {
    let images = service.images().await.context(CatalogSnafu)?;
    Ok(Json(images))
}

async fn post_images(
    State(service): State<Arc<ReleaseService>>,
    body: Result<Json<ImageTag>, JsonRejection>,
) -> Result<Json<Vec<Image>>, ApiError> {
    let Json(image_tag) = body.map_err(|e| ApiError::BadRequest {
        reason: e.body_text(),
    })?;
    ensure!(
        !image_tag.tag.is_empty(),
        BadRequestSnafu {
            reason: "tag must not be empty",
        }
    );
    service
        .release(&image_tag.tag)
        .await
        .context(ReleaseSnafu)?;
    let images = service.images().await.context(CatalogSnafu)?;
    Ok(Json(images))
}
