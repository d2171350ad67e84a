pub mod api;
pub mod collab;
pub mod config;
pub mod history;
pub mod pair;
pub mod registry;
pub mod relay;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: config::Config,
    pub history: history::HistoryStore,
    pub registry: Arc<registry::ConnectionRegistry>,
    pub collab: collab::Clients,
}

pub type AppResult<T> = Result<T, AppError>;
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}\n\n{}", self.0, self.0.backtrace()),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
