use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::{Display, Error};
use serde::Serialize;
use tracing::{error, warn};

use tak_core::{StoreError, TakError};

#[derive(Serialize)]
pub struct ErrorModel {
    pub detail: String,
}

/// Everything a request can fail with.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    /// The engine rejected the action.
    #[display("{source}")]
    Rule { source: TakError },

    #[display("{source}")]
    Store { source: StoreError },

    #[display("missing X-Player header")]
    MissingPlayer,

    #[display("it is not {player}'s turn")]
    NotYourTurn { player: String },

    #[display("{player} may not view game {id}")]
    Forbidden { player: String, id: String },

    #[display("Problem with game ID '{id}'")]
    BadGameId { id: String },

    #[display("could not read request body: {message}")]
    BadBody { message: String },
}

impl From<TakError> for ApiError {
    fn from(source: TakError) -> Self {
        ApiError::Rule { source }
    }
}

impl From<StoreError> for ApiError {
    fn from(source: StoreError) -> Self {
        ApiError::Store { source }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rule { .. } => StatusCode::CONFLICT,
            ApiError::Store {
                source: StoreError::GameNotFound { .. } | StoreError::PlayerNotFound { .. },
            } => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingPlayer => StatusCode::UNAUTHORIZED,
            ApiError::NotYourTurn { .. } | ApiError::BadGameId { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::BadBody { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }
        (
            status,
            Json(ErrorModel {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
