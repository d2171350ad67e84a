mod frame;
mod msg;
mod ws;

use axum::{Router, routing::get};

use crate::AppState;

pub use frame::{Frame, Message};
pub use msg::{Outcome, PONG, handle_frame};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws/{client_id}", get(ws::pair_ws))
}
