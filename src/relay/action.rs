//! The actions a relay request can ask for, parsed from its JSON body.

use std::num::FpCategory;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::relay::Error;

/// The card name used when a request doesn't provide one.
pub(crate) const DEFAULT_CARD_NAME: &str = "Bug report";

/// The attachment file name used when a request doesn't provide one.
pub(crate) const DEFAULT_FILE_NAME: &str = "attachment.bin";

/// Decoding settings accepting payloads with or without padding.
const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Decodes the standard base64 alphabet.
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Decodes the URL-safe base64 alphabet.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// A relay request body whose `action` has been read, but whose other fields haven't been
/// interpreted yet.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct Payload {
    /// The action the body asks for.
    tag: ActionTag,

    /// The body's JSON value, including the `action` field.
    fields: Value,
}

/// The recognized values of a request body's `action` field.
#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
enum ActionTag {
    /// See [`Action::CreateCard`].
    CreateCard,

    /// See [`Action::AttachBase64`].
    AttachBase64,

    /// See [`Action::Unknown`].
    #[serde(other)]
    Unknown,
}

impl Payload {
    /// Parses a request body. An empty body counts as an empty object, and a body without a
    /// string `action` is an unknown action.
    ///
    /// # Errors
    ///
    /// Fails if the body isn't valid JSON or is `null`.
    pub(crate) fn from_body(body: &[u8]) -> Result<Self, Error> {
        if body.is_empty() {
            return Ok(Self {
                tag: ActionTag::Unknown,
                fields: Value::Object(serde_json::Map::new()),
            });
        }

        let fields: Value = serde_json::from_slice(body)?;

        let tag = match &fields {
            Value::Null => return Err(Error::NullBody),
            Value::Object(object) => match object.get("action") {
                Some(tag @ Value::String(_)) => ActionTag::deserialize(tag)?,
                _ => ActionTag::Unknown,
            },
            _ => ActionTag::Unknown,
        };

        Ok(Self { tag, fields })
    }

    /// Interprets the rest of the body's fields according to its action.
    ///
    /// # Errors
    ///
    /// Fails only if the body doesn't have the shape of an object, which an action with a known
    /// tag always does.
    pub(crate) fn into_action(self) -> Result<Action, Error> {
        Ok(match self.tag {
            ActionTag::CreateCard => Action::CreateCard(serde_json::from_value(self.fields)?),
            ActionTag::AttachBase64 => Action::AttachBase64(serde_json::from_value(self.fields)?),
            ActionTag::Unknown => Action::Unknown,
        })
    }
}

/// A relay request, selected by its body's `action` field.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) enum Action {
    /// Creates a card.
    CreateCard(CreateCardRequest),

    /// Uploads a base64-encoded file as an attachment on a card.
    AttachBase64(AttachBase64Request),

    /// Any action this relay doesn't know.
    Unknown,
}

/// A `create_card` request body.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCardRequest {
    /// The card's name.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) name: Option<String>,

    /// The card's description.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) desc: Option<String>,

    /// Comma-separated IDs of labels to put on the card.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) labels: Option<String>,

    /// The list to create the card in, overriding the configured default.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) list_id: Option<String>,
}

impl CreateCardRequest {
    /// Gets the card name, or [`DEFAULT_CARD_NAME`] if none was given.
    pub(crate) fn name(&self) -> &str {
        provided(self.name.as_deref()).unwrap_or(DEFAULT_CARD_NAME)
    }

    /// Gets the card description, which is empty if none was given.
    pub(crate) fn desc(&self) -> &str {
        self.desc.as_deref().unwrap_or_default()
    }

    /// Gets the label IDs, if any were given.
    pub(crate) fn labels(&self) -> Option<&str> {
        provided(self.labels.as_deref())
    }

    /// Gets the requested list ID, if one was given.
    pub(crate) fn list_id(&self) -> Option<&str> {
        provided(self.list_id.as_deref())
    }
}

/// An `attach_base64` request body.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttachBase64Request {
    /// The card to attach the file to.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) card_id: Option<String>,

    /// The attachment's file name.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) file_name: Option<String>,

    /// The file's contents in base64.
    #[serde(default, deserialize_with = "loose_string")]
    pub(crate) file_base64: Option<String>,
}

impl AttachBase64Request {
    /// Checks the required fields are present, returning the card ID and the decoded file.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingFields`] naming every absent field, or with [`Error::Base64`] if
    /// the file isn't valid base64.
    pub(crate) fn card_and_file(&self) -> Result<(&str, Vec<u8>), Error> {
        let card_id = provided(self.card_id.as_deref());
        let file_base64 = provided(self.file_base64.as_deref());

        let (Some(card_id), Some(file_base64)) = (card_id, file_base64) else {
            let mut missing = Vec::new();

            if card_id.is_none() {
                missing.push("cardId");
            }
            if file_base64.is_none() {
                missing.push("fileBase64");
            }

            return Err(Error::MissingFields(missing));
        };

        Ok((card_id, decode_base64(file_base64)?))
    }

    /// Gets the file name, or [`DEFAULT_FILE_NAME`] if none was given.
    pub(crate) fn file_name(&self) -> &str {
        provided(self.file_name.as_deref()).unwrap_or(DEFAULT_FILE_NAME)
    }
}

/// Deserializes a text field the way browser scripts tend to send it. Numbers and `true` become
/// their string forms, arrays are joined with commas, and `0`, `false`, `null`, and objects count
/// as absent.
fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;

    Ok(match &value {
        Value::Null | Value::Object(_) | Value::Bool(false) => None,
        Value::Number(number) if number.as_f64().map(f64::classify) == Some(FpCategory::Zero) => {
            None
        }
        _ => Some(to_text(&value)),
    })
}

/// Converts a JSON value to text like JavaScript's `String` does.
fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(bool) => bool.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(string) => string.clone(),
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

/// Filters out empty strings, which clients send for fields they mean to leave out.
fn provided(field: Option<&str>) -> Option<&str> {
    field.filter(|value| !value.is_empty())
}

/// Decodes base64 the way browsers tend to produce it: padded or not, in either the standard or
/// URL-safe alphabet, and possibly wrapped across lines.
///
/// # Errors
///
/// Fails if the input isn't valid in either alphabet.
pub(crate) fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|char| !char.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(&compact)
        .or_else(|error| URL_SAFE.decode(&compact).map_err(|_| error))
}
