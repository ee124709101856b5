use std::collections::HashMap;

use reqwest::blocking::Response;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{Error, Result, TokenReaderError, TokenReaderResult, OAUTH_CALLBACK_KEY};

const OAUTH_TOKEN_KEY: &str = "oauth_token";

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Request token plus the URL the user must visit to authorize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationTokens {
    pub oauth_token: String,
    pub oauth_token_secret: String,
    pub auth_url: String,
    /// Other contents, e.g. `oauth_callback_confirmed`
    pub remain: HashMap<String, String>,
}

impl AuthenticationTokens {
    pub(crate) fn new(tokens: TokenResponse, authorize_url: &str, callback: Option<&str>) -> Self {
        let auth_url = build_auth_url(authorize_url, &tokens.oauth_token, callback);
        AuthenticationTokens {
            oauth_token: tokens.oauth_token,
            oauth_token_secret: tokens.oauth_token_secret,
            auth_url,
            remain: tokens.remain,
        }
    }
}

/// Add parse_oauth_token feature to reqwest::blocking::Response.
pub trait TokenReader: private::Sealed {
    /// Reads a url-encoded token body. `stage` names the token kind in errors.
    fn parse_oauth_token(self, stage: &'static str) -> Result<TokenResponse>;
}

impl TokenReader for Response {
    fn parse_oauth_token(self, stage: &'static str) -> Result<TokenResponse> {
        let status = self.status();
        let text = self.text()?;
        if status != StatusCode::OK {
            log::warn!("{} token request rejected with {}", stage, status);
            return Err(Error::Auth {
                message: format!(
                    "Seems something couldn't be verified with your OAuth junk. Error: {}, Message: {}",
                    status.as_u16(),
                    text
                ),
                status_code: Some(status.as_u16()),
            });
        }
        Ok(read_oauth_token(stage, text)?)
    }
}

/// Authorize endpoint plus `oauth_token` and, when given, `oauth_callback`.
pub fn build_auth_url(authorize_url: &str, oauth_token: &str, callback: Option<&str>) -> String {
    let mut query = vec![(OAUTH_TOKEN_KEY, oauth_token)];
    if let Some(callback) = callback {
        query.push((OAUTH_CALLBACK_KEY, callback));
    }
    // serializing a list of string pairs cannot fail
    let encoded = serde_urlencoded::to_string(&query).unwrap_or_default();
    format!("{}?{}", authorize_url, encoded)
}

fn read_oauth_token(stage: &'static str, text: String) -> TokenReaderResult<TokenResponse> {
    let mut destructured = url::form_urlencoded::parse(text.as_bytes())
        .into_owned()
        .collect::<HashMap<String, String>>();
    if destructured.is_empty() {
        return Err(TokenReaderError::Empty(stage));
    }
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

mod private {
    use reqwest::blocking::Response;

    pub trait Sealed {}
    impl Sealed for Response {}
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn parse_response_typical() {
        let resp_str_sample = "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&oauth_callback_confirmed=true";
        for parsed in &[
            read_oauth_token("request", resp_str_sample.to_string()).unwrap(),
            serde_urlencoded::from_str::<TokenResponse>(resp_str_sample).unwrap(),
        ] {
            assert_eq!(
                parsed.oauth_token,
                "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik"
            );
            assert_eq!(
                parsed.oauth_token_secret,
                "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM"
            );
            assert_eq!(parsed.remain.len(), 1);
            let oauth_callback_confirmed = parsed.remain.get("oauth_callback_confirmed").unwrap();
            assert_eq!(oauth_callback_confirmed, "true");
        }
    }

    #[test]
    fn parse_percent_encoded_values() {
        let parsed = read_oauth_token(
            "access",
            "oauth_token=a%2Fb&oauth_token_secret=c+d".to_string(),
        )
        .unwrap();
        assert_eq!(parsed.oauth_token, "a/b");
        assert_eq!(parsed.oauth_token_secret, "c d");
    }

    #[test]
    fn parse_minimal() {
        let resp_str_sample = "oauth_token&oauth_token_secret";
        let parsed = read_oauth_token("request", resp_str_sample.to_string()).unwrap();
        assert_eq!(parsed.oauth_token, "");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 0);
    }

    #[test]
    fn parse_empty_body() {
        match read_oauth_token("authorized", String::new()) {
            Err(TokenReaderError::Empty(stage)) => assert_eq!(stage, "authorized"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_token_notfound() {
        let resp_str_sample = "oauth_token_secret=";
        match read_oauth_token("request", resp_str_sample.to_string()) {
            Err(TokenReaderError::TokenKeyNotFound(key, resp_str)) => {
                assert_eq!(key, OAUTH_TOKEN_KEY);
                assert_eq!(resp_str, resp_str_sample)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_token_secret_notfound() {
        let resp_str_sample = "oauth_token=";
        match read_oauth_token("request", resp_str_sample.to_string()) {
            Err(TokenReaderError::TokenKeyNotFound(key, resp_str)) => {
                assert_eq!(key, OAUTH_TOKEN_SECRET_KEY);
                assert_eq!(resp_str, resp_str_sample)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn auth_url_carries_token_and_callback() {
        assert_eq!(
            build_auth_url("https://www.tumblr.com/oauth/authorize", "ABC", Some("https://cb")),
            "https://www.tumblr.com/oauth/authorize?oauth_token=ABC&oauth_callback=https%3A%2F%2Fcb"
        );
        assert_eq!(
            build_auth_url("https://www.tumblr.com/oauth/authorize", "ABC", None),
            "https://www.tumblr.com/oauth/authorize?oauth_token=ABC"
        );
    }
}
