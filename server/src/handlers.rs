use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

use crate::state::AppState;

pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::read_to_string(&state.index_file).await {
        Ok(contents) => Html(contents).into_response(),
        Err(error) => {
            log::error!(
                "Failed to read {}: {error}",
                state.index_file.display()
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
