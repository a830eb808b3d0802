//! A minimal client for the parts of the [Trello REST API](https://developer.atlassian.com/cloud/trello/rest/)
//! the relay forwards to.

use reqwest::{
    multipart::{Form, Part},
    RequestBuilder,
};
use serde::{Deserialize, Serialize};

use crate::{config::Credentials, percent_encoding, relay::Error};

/// A client for the Trello REST API.
#[derive(Clone, Debug)]
pub(crate) struct TrelloClient {
    /// The underlying HTTP client, shared so connections are pooled between requests.
    http: reqwest::Client,

    /// The API base URL, without a trailing slash.
    base_url: String,
}

/// The form fields for creating a card.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewCard<'a> {
    /// The list to create the card in.
    pub(crate) id_list: &'a str,

    /// The card's name.
    pub(crate) name: &'a str,

    /// The card's description.
    pub(crate) desc: &'a str,

    /// Comma-separated label IDs. Left out of the form entirely when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id_labels: Option<&'a str>,
}

/// The form fields for creating a card, along with the credentials to authorize it.
#[derive(Serialize)]
struct NewCardForm<'a> {
    /// The Trello API key.
    key: &'a str,

    /// The Trello API token.
    token: &'a str,

    /// The card's fields.
    #[serde(flatten)]
    card: NewCard<'a>,
}

/// The fields of a Trello card the relay reports back.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
pub(crate) struct Card {
    /// The card's ID.
    #[serde(default)]
    pub(crate) id: Option<String>,

    /// The URL to view the card at.
    #[serde(default)]
    pub(crate) url: Option<String>,
}

impl TrelloClient {
    /// Constructs a new [`TrelloClient`] for the API at the specified base URL.
    pub(crate) fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Creates a card.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] if Trello rejects the card, or an error if the request can't be
    /// completed or the created card can't be parsed.
    pub(crate) async fn create_card(
        &self,
        credentials: Credentials<'_>,
        card: NewCard<'_>,
    ) -> Result<Card, Error> {
        let form = NewCardForm {
            key: credentials.key,
            token: credentials.token,
            card,
        };

        let request = self
            .http
            .post(format!("{}/cards", self.base_url))
            .form(&form);

        let text = send(request).await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Uploads a file as an attachment on an existing card.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] if Trello rejects the attachment, or an error if the request
    /// can't be completed.
    pub(crate) async fn attach_file(
        &self,
        credentials: Credentials<'_>,
        card_id: &str,
        file_name: &str,
        file: Vec<u8>,
    ) -> Result<(), Error> {
        let file_part = Part::bytes(file)
            .file_name(file_name.to_owned())
            .mime_str("application/octet-stream")?;

        let form = Form::new()
            .text("key", credentials.key.to_owned())
            .text("token", credentials.token.to_owned())
            .part("file", file_part)
            .text("name", file_name.to_owned());

        let request = self
            .http
            .post(format!(
                "{}/cards/{}/attachments",
                self.base_url,
                percent_encoding::path_segment(card_id),
            ))
            .multipart(form);

        // The attachment's metadata isn't needed.
        send(request).await?;

        Ok(())
    }
}

/// Sends a request to Trello, returning the response text if the response status is successful.
///
/// # Errors
///
/// Returns [`Error::Upstream`] with Trello's raw response text if the status is unsuccessful, or
/// [`Error::Http`] if the request can't be completed.
async fn send(request: RequestBuilder) -> Result<String, Error> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(Error::Upstream { status, body: text });
    }

    Ok(text)
}
