//! See [`Config`].

use std::fmt;

/// The Trello API base URL used when `TRELLO_API_BASE` isn't set.
pub(crate) const DEFAULT_API_BASE: &str = "https://api.trello.com/1";

/// The inbound body size limit used when `BODY_LIMIT` isn't set. This matches the request size limit
/// of common serverless platforms.
pub(crate) const DEFAULT_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// The relay's process-wide configuration, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Config {
    /// The Trello API key. Requests fail if this is unset.
    pub(crate) key: Option<String>,

    /// The Trello API token. Requests fail if this is unset.
    pub(crate) token: Option<String>,

    /// The list new cards go into when a request doesn't name one.
    pub(crate) default_list_id: Option<String>,

    /// The base URL of the Trello REST API, without a trailing slash.
    pub(crate) api_base: String,

    /// The maximum number of bytes accepted in a request body.
    pub(crate) body_limit: usize,
}

/// An error loading a [`Config`].
#[derive(thiserror::Error, Debug)]
pub(crate) enum ConfigError {
    /// `BODY_LIMIT` wasn't a valid byte count.
    #[error("environment variable `BODY_LIMIT` should be a number of bytes: {0}")]
    BodyLimit(#[from] std::num::ParseIntError),
}

impl Config {
    /// Loads the configuration from the environment, including any `.env` file.
    ///
    /// Missing credentials aren't an error here, since each request reports them instead.
    ///
    /// # Errors
    ///
    /// Returns an error if an optional setting is present but invalid.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        let body_limit = match var("BODY_LIMIT") {
            Some(limit) => limit.parse()?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(Self {
            key: var("TRELLO_KEY"),
            token: var("TRELLO_TOKEN"),
            default_list_id: var("TRELLO_LIST_ID"),
            api_base: var("TRELLO_API_BASE")
                .map_or_else(|| DEFAULT_API_BASE.to_owned(), |base| {
                    base.trim_end_matches('/').to_owned()
                }),
            body_limit,
        })
    }

    /// Gets the API key and token, if both are set.
    pub(crate) fn credentials(&self) -> Option<Credentials<'_>> {
        Some(Credentials {
            key: self.key.as_deref()?,
            token: self.token.as_deref()?,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// Hides a secret while still showing whether it's set.
        fn redact(secret: Option<&String>) -> Option<&'static str> {
            secret.map(|_| "<redacted>")
        }

        f.debug_struct("Config")
            .field("key", &redact(self.key.as_ref()))
            .field("token", &redact(self.token.as_ref()))
            .field("default_list_id", &self.default_list_id)
            .field("api_base", &self.api_base)
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

/// The credentials Trello requires on every API call.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Credentials<'a> {
    /// The Trello API key.
    pub(crate) key: &'a str,

    /// The Trello API token.
    pub(crate) token: &'a str,
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

/// Reads an environment variable, treating an empty or unreadable value as unset.
fn var(name: &str) -> Option<String> {
    dotenvy::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a config with every field set.
    fn full_config() -> Config {
        Config {
            key: Some("the-key".into()),
            token: Some("the-token".into()),
            default_list_id: Some("list".into()),
            api_base: DEFAULT_API_BASE.into(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    #[test]
    fn credentials_need_key_and_token() {
        let config = full_config();
        let credentials = config.credentials().expect("credentials should be set");

        assert_eq!(credentials.key, "the-key", "key should come from config");
        assert_eq!(credentials.token, "the-token", "token should come from config");

        let no_token = Config {
            token: None,
            ..full_config()
        };
        assert!(no_token.credentials().is_none(), "token is required");

        let no_key = Config {
            key: None,
            ..full_config()
        };
        assert!(no_key.credentials().is_none(), "key is required");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = full_config();
        let output = format!("{config:?} {:?}", config.credentials());

        assert!(!output.contains("the-key"), "key leaked: {output}");
        assert!(!output.contains("the-token"), "token leaked: {output}");
        assert!(output.contains("list"), "list id should be shown: {output}");
    }
}
