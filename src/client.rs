use std::fmt;
use std::time::Duration;

use http::Method;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::response::{normalize, RawResponse, AVATAR_ENDPOINT};
use crate::url_builder::{build_url, API_ROOT, API_VERSION};
use crate::{
    classify, AuthenticationTokens, Credentials, Error, OAuthParameters, Params, RequestBuilder,
    RequestSpec, Result, SecretsProvider, SigningMode, TokenReader, TokenResponse,
};

/// Request-token endpoint of the platform.
pub const REQUEST_TOKEN_URL: &str = "https://www.tumblr.com/oauth/request_token";
/// Access-token endpoint of the platform.
pub const ACCESS_TOKEN_URL: &str = "https://www.tumblr.com/oauth/access_token";
/// Page the user visits to authorize a request token.
pub const AUTHORIZE_URL: &str = "https://www.tumblr.com/oauth/authorize";

/// Avatar size used by [`Client::get_avatar_url`] callers that have no preference.
pub const DEFAULT_AVATAR_SIZE: u32 = 64;

const API_KEY: &str = "api_key";

#[derive(Debug, Clone)]
struct Endpoints {
    api_root: String,
    api_version: String,
    request_token_url: String,
    access_token_url: String,
    authorize_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            api_root: API_ROOT.to_string(),
            api_version: API_VERSION.to_string(),
            request_token_url: REQUEST_TOKEN_URL.to_string(),
            access_token_url: ACCESS_TOKEN_URL.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
        }
    }
}

/// Configures and builds a [`Client`].
#[must_use]
#[derive(Debug)]
pub struct ClientBuilder {
    credentials: Credentials,
    user_agent: String,
    headers: Vec<(String, String)>,
    proxy: Option<String>,
    timeout: Option<Duration>,
    endpoints: Endpoints,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        ClientBuilder {
            credentials: Credentials::anonymous(),
            user_agent: format!("reqwest-tumblr v{}", env!("CARGO_PKG_VERSION")),
            headers: Vec::new(),
            proxy: None,
            timeout: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn credentials(self, credentials: Credentials) -> Self {
        ClientBuilder {
            credentials,
            ..self
        }
    }

    /// Replaces the default `User-Agent`.
    pub fn user_agent<T: Into<String>>(self, user_agent: T) -> Self {
        ClientBuilder {
            user_agent: user_agent.into(),
            ..self
        }
    }

    /// Adds a header sent with every request. Overrides the default `User-Agent`
    /// when named so.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Routes all traffic through the proxy at `url`.
    pub fn proxy<T: Into<String>>(self, url: T) -> Self {
        ClientBuilder {
            proxy: Some(url.into()),
            ..self
        }
    }

    /// Total timeout for each request. Unset means no timeout.
    pub fn timeout(self, timeout: Duration) -> Self {
        ClientBuilder {
            timeout: Some(timeout),
            ..self
        }
    }

    pub fn api_root<T: Into<String>>(mut self, api_root: T) -> Self {
        self.endpoints.api_root = api_root.into();
        self
    }

    pub fn api_version<T: Into<String>>(mut self, api_version: T) -> Self {
        self.endpoints.api_version = api_version.into();
        self
    }

    pub fn request_token_url<T: Into<String>>(mut self, url: T) -> Self {
        self.endpoints.request_token_url = url.into();
        self
    }

    pub fn access_token_url<T: Into<String>>(mut self, url: T) -> Self {
        self.endpoints.access_token_url = url.into();
        self
    }

    pub fn authorize_url<T: Into<String>>(mut self, url: T) -> Self {
        self.endpoints.authorize_url = url.into();
        self
    }

    pub fn build(self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Error::generic(format!("invalid header name {} : {}", name, err)))?;
            headers.insert(name, header_value(value)?);
        }

        let mut http = HttpClient::builder()
            .redirect(Policy::none())
            .default_headers(headers);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(ref proxy) = self.proxy {
            http = http.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Client {
            http: http.build()?,
            credentials: self.credentials,
            endpoints: self.endpoints,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|err| Error::generic(format!("invalid header value {:?} : {}", value, err)))
}

/// Blocking client for the v2 REST API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    credentials: Credentials,
    endpoints: Endpoints,
}

impl Client {
    /// Constructs a client with default settings for `credentials`.
    pub fn new(credentials: Credentials) -> Result<Self> {
        ClientBuilder::new().credentials(credentials).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn signing_mode(&self) -> SigningMode {
        self.credentials.signing_mode()
    }

    /// Returns a client with the same configuration that signs with the given
    /// user token. Use it with a request token before
    /// [`get_authorized_tokens`](Self::get_authorized_tokens), or with an
    /// access token for regular API calls.
    pub fn with_token<TKey, TSecret>(&self, token: TKey, token_secret: TSecret) -> Client
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Client {
            http: self.http.clone(),
            credentials: self.credentials.clone().token(token, token_secret),
            endpoints: self.endpoints.clone(),
        }
    }

    /// Step 1 of the OAuth dance: fetches a request token and the URL the
    /// user has to visit (`auth_url`).
    ///
    /// Needs consumer credentials and no user token.
    pub fn get_authentication_tokens(
        &self,
        callback_url: Option<&str>,
    ) -> Result<AuthenticationTokens> {
        if self.signing_mode() != SigningMode::ConsumerOnly {
            return Err(Error::auth(
                "Requesting authentication tokens needs a consumer key and secret and no user token",
            ));
        }

        let mut parameters = OAuthParameters::new();
        if let Some(callback_url) = callback_url {
            parameters = parameters.callback(callback_url);
        }
        let tokens = RequestBuilder::new(
            &self.http,
            Method::GET,
            &self.endpoints.request_token_url,
            &self.credentials,
        )?
        .oauth_parameters(parameters)
        .send()?
        .parse_oauth_token("request")?;

        Ok(AuthenticationTokens::new(
            tokens,
            &self.endpoints.authorize_url,
            callback_url,
        ))
    }

    /// Step 2 of the OAuth dance: exchanges the verifier for long-lived tokens.
    ///
    /// The client must carry the request token from step 1
    /// (see [`with_token`](Self::with_token)). `oauth_verifier` travels as a
    /// signed OAuth protocol parameter in the `Authorization` header, not in
    /// the query string (RFC 5849 §3.5 allows either).
    pub fn get_authorized_tokens(&self, oauth_verifier: &str) -> Result<TokenResponse> {
        if self.signing_mode() != SigningMode::Full {
            return Err(Error::auth(
                "Requesting authorized tokens needs the request token and secret",
            ));
        }

        RequestBuilder::new(
            &self.http,
            Method::GET,
            &self.endpoints.access_token_url,
            &self.credentials,
        )?
        .oauth_parameters(OAuthParameters::new().verifier(oauth_verifier))
        .send()?
        .parse_oauth_token("authorized")
    }

    /// Sends `spec` and returns the unwrapped `response` payload.
    pub fn request(&self, spec: RequestSpec) -> Result<Value> {
        if spec.method != Method::GET && spec.method != Method::POST {
            return Err(Error::generic("Method must be of GET or POST"));
        }
        let consumer_key = match self.credentials.consumer_key() {
            Some(key) => key,
            None => {
                return Err(Error::auth(
                    "API calls need at least a consumer key (api_key)",
                ))
            }
        };

        let url = build_url(
            &self.endpoints.api_root,
            &self.endpoints.api_version,
            &spec.endpoint,
            spec.blog_url.as_deref(),
            &spec.extra_segments,
        );
        let params = classify(spec.params)?;

        let response = RequestBuilder::new(&self.http, spec.method, &url, &self.credentials)?
            .params(params)
            .field(API_KEY, consumer_key)
            .send()?;
        let raw = RawResponse::read(response)?;
        log::trace!("{} answered {} with {:?}", url, raw.status, raw.headers);

        normalize(raw.status, &raw.headers, &raw.body, &spec.endpoint)
    }

    pub fn get(
        &self,
        endpoint: &str,
        blog_url: Option<&str>,
        extra_segments: &[&str],
        params: Params,
    ) -> Result<Value> {
        self.request(spec_for(Method::GET, endpoint, blog_url, extra_segments, params))
    }

    /// Files are passed as [`Upload`](crate::Upload) values inside `params`.
    pub fn post(
        &self,
        endpoint: &str,
        blog_url: Option<&str>,
        extra_segments: &[&str],
        params: Params,
    ) -> Result<Value> {
        self.request(spec_for(Method::POST, endpoint, blog_url, extra_segments, params))
    }

    /// Returns `{"url": ...}` pointing at the blog's avatar of `size` pixels.
    pub fn get_avatar_url(&self, blog_url: &str, size: u32) -> Result<Value> {
        let size = size.to_string();
        self.get(AVATAR_ENDPOINT, Some(blog_url), &[size.as_str()], Params::new())
    }
}

fn spec_for(
    method: Method,
    endpoint: &str,
    blog_url: Option<&str>,
    extra_segments: &[&str],
    params: Params,
) -> RequestSpec {
    let mut spec = RequestSpec::new(method, endpoint).params(params);
    if let Some(blog_url) = blog_url {
        spec = spec.blog(blog_url);
    }
    extra_segments
        .iter()
        .fold(spec, |spec, segment| spec.segment(*segment))
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("consumer_key", &self.credentials.consumer_key())
            .field("mode", &self.signing_mode())
            .finish()
    }
}
