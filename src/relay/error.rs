//! See [`Error`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Any failure handling a relay request. Every variant is answered with the relay's JSON error
/// envelope, so no failure escapes the handler without a structured response.
#[derive(Error, Debug)]
#[non_exhaustive]
pub(crate) enum Error {
    /// The Trello key or token isn't configured.
    #[error("Missing env vars (TRELLO_KEY/TRELLO_TOKEN)")]
    MissingCredentials,

    /// A card can't be created because neither the request nor the configuration names a list.
    #[error("Missing listId (provide body.listId or set TRELLO_LIST_ID)")]
    MissingListId,

    /// Required fields were absent from the request body.
    #[error("Missing {}", .0.join(" and "))]
    MissingFields(Vec<&'static str>),

    /// The request body's `action` wasn't recognized.
    #[error("Unknown action")]
    UnknownAction,

    /// Trello answered with an unsuccessful status.
    #[error("Trello responded with {status}")]
    Upstream {
        /// The status Trello responded with.
        status: StatusCode,

        /// Trello's raw response text.
        body: String,
    },

    /// The request body was the JSON value `null`, which has no fields to read.
    #[error("request body is null")]
    NullBody,

    /// A JSON document couldn't be parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An attachment's payload wasn't valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The request to Trello couldn't be completed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The request body couldn't be read.
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
}

impl Error {
    /// Gets the HTTP status code corresponding to the error.
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::UnknownAction => StatusCode::BAD_REQUEST,
            Self::MissingCredentials
            | Self::MissingListId
            | Self::Upstream { .. }
            | Self::NullBody
            | Self::Json(_)
            | Self::Base64(_)
            | Self::Http(_)
            | Self::Body(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::Upstream { status, body } => {
                tracing::warn!(%status, "Trello rejected relayed request");

                ErrorBody {
                    ok: false,
                    error: None,
                    http: Some(status.as_u16()),
                    resp: Some(body),
                }
            }
            error => {
                if status.is_server_error() {
                    tracing::error!(%error, "relay request failed");
                }

                ErrorBody {
                    ok: false,
                    error: Some(error.to_string()),
                    http: None,
                    resp: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// The JSON envelope for an unsuccessful response.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub(crate) struct ErrorBody {
    /// Always `false`.
    pub(crate) ok: bool,

    /// A description of what went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,

    /// The status code Trello responded with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) http: Option<u16>,

    /// Trello's raw response text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) resp: Option<String>,
}
