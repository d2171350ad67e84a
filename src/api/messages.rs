use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{AppResult, config::Config, history::{HistoryStore, StoredMessage}};

#[derive(Deserialize)]
pub(crate) struct HistoryQuery {
    pair_id: String,
    limit: Option<i64>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn get_messages(
    State(history): State<HistoryStore>,
    State(config): State<Config>,

    Query(HistoryQuery { pair_id, limit }): Query<HistoryQuery>,
) -> AppResult<Json<Vec<StoredMessage>>> {
    let limit = limit.unwrap_or(config.history_limit);
    Ok(Json(history.read(&pair_id, limit).await?))
}
