//! The relay's one endpoint, which forwards browser requests to Trello with the server's
//! credentials attached.

mod action;
mod error;

use std::sync::Arc;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json, Router,
};
use axum_macros::debug_handler;
use serde::Serialize;
use tower_http::set_header::SetResponseHeaderLayer;

pub(crate) use self::error::Error;
use self::action::{Action, AttachBase64Request, CreateCardRequest, Payload};
use crate::{
    config::{Config, Credentials},
    plain_error_response::{PlainErrorResponse, ALLOWED_METHODS},
    trello::{NewCard, TrelloClient},
};

/// A successful relay response, or an error to respond with instead.
type RelayResult<T> = Result<(StatusCode, Json<T>), Error>;

/// The state shared by every relay request.
#[derive(Clone, Debug)]
pub(crate) struct Relay {
    /// The relay's configuration.
    config: Arc<Config>,

    /// The client requests are forwarded through.
    trello: TrelloClient,
}

impl Relay {
    /// Constructs a new [`Relay`] from its configuration.
    pub(crate) fn new(config: Config) -> Self {
        let trello = TrelloClient::new(config.api_base.clone());

        Self {
            config: Arc::new(config),
            trello,
        }
    }
}

/// Builds the relay's service. It answers every path, and every response carries the same permissive
/// CORS headers so browser scripts on any origin can call it.
pub(crate) fn router(relay: Relay) -> Router {
    Router::new()
        .fallback(handler)
        .with_state(relay)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
}

/// The handler for all incoming requests.
#[debug_handler]
async fn handler(State(relay): State<Relay>, request: Request) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    if request.method() != Method::POST {
        return PlainErrorResponse::from(StatusCode::METHOD_NOT_ALLOWED).into_response();
    }

    match relay.relay(request.into_body()).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

impl Relay {
    /// Parses a `POST` body and performs the action it asks for.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    async fn relay(&self, body: Body) -> Result<Response, Error> {
        let body = body::to_bytes(body, self.config.body_limit).await?;
        let payload = Payload::from_body(&body)?;

        let credentials = self
            .config
            .credentials()
            .ok_or(Error::MissingCredentials)?;

        let response = match payload.into_action()? {
            Action::CreateCard(request) => self
                .create_card(credentials, &request)
                .await?
                .into_response(),
            Action::AttachBase64(request) => self
                .attach_base64(credentials, &request)
                .await?
                .into_response(),
            Action::Unknown => return Err(Error::UnknownAction),
        };

        Ok(response)
    }

    /// Creates a card in the requested list, or in the default list if none was requested.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    async fn create_card(
        &self,
        credentials: Credentials<'_>,
        request: &CreateCardRequest,
    ) -> RelayResult<CreateCardResponse> {
        let list_id = request
            .list_id()
            .or(self.config.default_list_id.as_deref());

        tracing::info!(?list_id, body_list_id = ?request.list_id(), "creating card");

        let Some(list_id) = list_id else {
            return Err(Error::MissingListId);
        };

        let card = self
            .trello
            .create_card(
                credentials,
                NewCard {
                    id_list: list_id,
                    name: request.name(),
                    desc: request.desc(),
                    id_labels: request.labels(),
                },
            )
            .await?;

        Ok((
            StatusCode::OK,
            Json(CreateCardResponse {
                ok: true,
                card_id: card.id,
                card_url: card.url,
            }),
        ))
    }

    /// Uploads a base64-encoded file as an attachment on a card.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    async fn attach_base64(
        &self,
        credentials: Credentials<'_>,
        request: &AttachBase64Request,
    ) -> RelayResult<AttachResponse> {
        let (card_id, file) = request.card_and_file()?;
        let file_name = request.file_name();

        tracing::info!(card_id, file_name, size = file.len(), "attaching file");

        self.trello
            .attach_file(credentials, card_id, file_name, file)
            .await?;

        Ok((StatusCode::OK, Json(AttachResponse { ok: true })))
    }
}

/// A `create_card` response body.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCardResponse {
    /// Always `true`.
    pub(crate) ok: bool,

    /// The new card's ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) card_id: Option<String>,

    /// The URL to view the new card at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) card_url: Option<String>,
}

/// An `attach_base64` response body.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttachResponse {
    /// Always `true`.
    pub(crate) ok: bool,
}
