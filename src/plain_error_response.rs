//! See [`PlainErrorResponse`].

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// The methods the relay accepts, as listed in an `Allow` header.
pub(crate) const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// An error which implements [`IntoResponse`] by generating a `text/plain` response containing only
/// the associated status code's canonical reason text (e.g. `Method Not Allowed`).
///
/// This is for rejections that happen before a request is understood well enough to answer in the
/// relay's JSON format.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct PlainErrorResponse {
    /// The [`StatusCode`] to generate the [`Response`] from.
    status: StatusCode,
}

impl PlainErrorResponse {
    /// Get the [`StatusCode`] associated with this response.
    pub(crate) fn status(self) -> StatusCode {
        self.status
    }
}

impl From<StatusCode> for PlainErrorResponse {
    fn from(status: StatusCode) -> Self {
        Self { status }
    }
}

impl IntoResponse for PlainErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain");

        if status == StatusCode::METHOD_NOT_ALLOWED {
            response = response.header(header::ALLOW, ALLOWED_METHODS);
        }

        response
            .body(Body::from(status.canonical_reason().unwrap_or_default()))
            .expect("response should be valid")
    }
}
