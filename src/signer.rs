use std::borrow::Cow;

use crate::SecretsProvider;
use http::Method;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use url::Url;

const OAUTH_IDENTIFIER: &str = "oauth_";
const REALM_IDENTIFIER: &str = "realm";

/// Produces `Authorization` header values for one request.
#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a>,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: OAuthParameters<'a>) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Signs `method url` carrying `params`, which travel either in the query
    /// string (`is_url_query`) or in a url-encoded form body.
    ///
    /// Returns `None` when the secrets hold no consumer pair.
    /// Keys prefixed with `oauth_` are never signed as plain parameters; they
    /// belong in [`OAuthParameters`]. [`RequestBuilder`](crate::RequestBuilder)
    /// refuses to send such keys.
    pub fn generate_signature(
        self,
        method: &Method,
        url: Url,
        params: &[(String, String)],
        is_url_query: bool,
    ) -> Option<String> {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair()?;
        let (token, token_secret) = self.secrets.get_token_option_pair();
        let options = self.parameters.build_options(token);

        // sort by key and split around the position of the oauth_* block
        let mut sorted: Vec<(Cow<str>, Cow<str>)> = params
            .iter()
            .map(|(k, v)| (Cow::from(k.as_str()), Cow::from(v.as_str())))
            .collect();
        sorted.push((Cow::from(OAUTH_IDENTIFIER), Cow::from("")));
        sorted.sort();

        let mut divided = sorted.splitn(2, |(k, _)| k == OAUTH_IDENTIFIER);
        let query_before_oauth = divided.next().unwrap_or_default();
        let query_after_oauth = divided.next().unwrap_or_default();

        let mut signer = if is_url_query {
            OAuthSigner::with_signature_method(
                HmacSha1,
                method.as_str(),
                url,
                consumer_secret,
                token_secret,
            )
        } else {
            OAuthSigner::form_with_signature_method(
                HmacSha1,
                method.as_str(),
                url,
                consumer_secret,
                token_secret,
            )
        };

        for (key, value) in query_before_oauth {
            if !key.starts_with(OAUTH_IDENTIFIER) {
                signer.parameter(key, value);
            }
        }
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        for (key, value) in query_after_oauth {
            if !key.starts_with(OAUTH_IDENTIFIER) {
                signer.parameter(key, value);
            }
        }

        let sign = signer.finish().authorization;

        Some(match self.parameters.realm {
            // OAuth oauth_...,realm="realm"
            Some(realm) => format!("{},{}=\"{}\"", sign, REALM_IDENTIFIER, realm.as_ref()),
            None => sign,
        })
    }
}

/// Per-request OAuth protocol parameters that are not part of the credentials.
#[derive(Debug, Clone, Default)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// `oauth_callback`, sent while requesting a request token.
    pub fn callback<T: Into<Cow<'a, str>>>(mut self, callback: T) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Fixed `oauth_nonce`; a random one is generated when unset.
    pub fn nonce<T: Into<Cow<'a, str>>>(mut self, nonce: T) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn realm<T: Into<Cow<'a, str>>>(mut self, realm: T) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Fixed `oauth_timestamp`; the current time is used when unset.
    pub fn timestamp<T: Into<u64>>(mut self, timestamp: T) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// `oauth_verifier`, sent while exchanging a request token.
    pub fn verifier<T: Into<Cow<'a, str>>>(mut self, verifier: T) -> Self {
        self.verifier = Some(verifier.into());
        self
    }

    /// When `true`, `oauth_version="1.0"` is included in the request.
    pub fn version(mut self, version: bool) -> Self {
        self.version = version;
        self
    }

    fn build_options(&'a self, token: Option<&'a str>) -> Options<'a> {
        let mut options = Options::new();
        // alphabetical order
        if let Some(callback) = self.callback.as_deref() {
            options.callback(callback);
        }
        if let Some(nonce) = self.nonce.as_deref() {
            options.nonce(nonce);
        }
        if let Some(timestamp) = self.timestamp {
            options.timestamp(timestamp);
        }
        if let Some(token) = token {
            options.token(token);
        }
        if let Some(verifier) = self.verifier.as_deref() {
            options.verifier(verifier);
        }
        options.version(self.version);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Credentials;

    fn extract_param(auth_header: &str, name: &str) -> Option<String> {
        let content = auth_header.strip_prefix("OAuth ")?;
        content
            .split(',')
            .filter_map(|item| {
                let mut kv = item.splitn(2, '=');
                Some((kv.next()?, kv.next()?))
            })
            .find(|(k, _)| *k == name)
            .map(|(_, v)| {
                percent_encoding::percent_decode_str(v.trim_matches('"'))
                    .decode_utf8_lossy()
                    .to_string()
            })
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn sign_initiate_with_callback() {
        // https://tools.ietf.org/html/rfc5849
        let url = Url::parse("https://photos.example.net/initiate").unwrap();
        let secrets = Credentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let params = OAuthParameters::new()
            .nonce("wIjqoS")
            .timestamp(137_131_200u64)
            .callback("http://printer.example.com/ready")
            .realm("photos");

        let header = Signer::new(&secrets, params)
            .generate_signature(&Method::POST, url, &[], false)
            .unwrap();

        assert_eq!(
            extract_param(&header, "oauth_signature").unwrap(),
            "74KNZJeDHnMBp0EMJ9ZHt/XKycU="
        );
        assert_eq!(extract_param(&header, "realm").unwrap(), "photos");
    }

    #[test]
    fn sign_get_query() {
        // https://tools.ietf.org/html/rfc5849
        let url = Url::parse("http://photos.example.net/photos").unwrap();
        let secrets = Credentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let params = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .realm("Photos");

        let header = Signer::new(&secrets, params)
            .generate_signature(
                &Method::GET,
                url,
                &pairs(&[("size", "original"), ("file", "vacation.jpg")]),
                true,
            )
            .unwrap();

        assert_eq!(
            extract_param(&header, "oauth_signature").unwrap(),
            "MdpQcU8iPSUjWoN/UDMsK2sui9I="
        );
        assert_eq!(
            extract_param(&header, "oauth_token").unwrap(),
            "nnch734d00sl2jdk"
        );
    }

    #[test]
    fn sign_post_body() {
        // https://developer.twitter.com/ja/docs/basics/authentication/guides/creating-a-signature
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap();
        let secrets = Credentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let params = OAuthParameters::new()
            .nonce("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .timestamp(1_318_622_958u64)
            .version(true);

        let header = Signer::new(&secrets, params)
            .generate_signature(
                &Method::POST,
                url,
                &pairs(&[
                    ("include_entities", "true"),
                    (
                        "status",
                        "Hello Ladies + Gentlemen, a signed OAuth request!",
                    ),
                ]),
                false,
            )
            .unwrap();

        assert_eq!(
            extract_param(&header, "oauth_signature").unwrap(),
            "hCtSmYh+iHYCEqBWrE7C7hYmtUk="
        );
    }

    #[test]
    fn verifier_and_callback_travel_in_header() {
        let url = Url::parse("https://www.tumblr.com/oauth/access_token").unwrap();
        let secrets = Credentials::new("ck", "cs").token("rt", "rs");
        let params = OAuthParameters::new().verifier("v3r1f13r");

        let header = Signer::new(&secrets, params)
            .generate_signature(&Method::GET, url, &[], true)
            .unwrap();

        assert_eq!(extract_param(&header, "oauth_verifier").unwrap(), "v3r1f13r");
        assert_eq!(extract_param(&header, "oauth_consumer_key").unwrap(), "ck");
        assert!(extract_param(&header, "realm").is_none());
    }

    #[test]
    fn anonymous_secrets_do_not_sign() {
        let url = Url::parse("https://api.tumblr.com/v2/tagged").unwrap();
        let secrets = Credentials::anonymous();
        let header = Signer::new(&secrets, OAuthParameters::new()).generate_signature(
            &Method::GET,
            url,
            &[],
            true,
        );
        assert!(header.is_none());
    }
}
