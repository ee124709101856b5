/*!
reqwest-tumblr: the Tumblr v2 REST API over reqwest and oauth1-request.

# Overview

This library signs calls to the Tumblr v2 API with OAuth 1.0a, sends them
through a blocking [reqwest](https://crates.io/crates/reqwest) client and hands
back the `response` part of the JSON envelope, or a typed [`Error`].

# How to use

## Basic usecase 1 - Acquiring OAuth token & secret

```no_run
use std::io;
use reqwest_tumblr::{Client, Credentials};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let client = Client::new(Credentials::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]"))?;

// step 1: acquire request token & token secret
let auth = client.get_authentication_tokens(Some("https://example.com/callback"))?;
println!("please access to: {}", auth.auth_url);

// step 2: the user comes back with a verifier
let mut user_input = String::new();
io::stdin().read_line(&mut user_input)?;
let verifier = user_input.trim();

// step 3: acquire access token
let tokens = client
    .with_token(auth.oauth_token, auth.oauth_token_secret)
    .get_authorized_tokens(verifier)?;
println!(
    "your token and secret is: \n token: {}\n secret: {}",
    tokens.oauth_token, tokens.oauth_token_secret
);
# Ok(())
# }
```

## Basic usecase 2 - posting with a photo

```no_run
use reqwest_tumblr::{Client, Credentials, Params, Upload};

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let credentials = Credentials::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");
let client = Client::new(credentials)?;

let blogs = client.get("user/info", None, &[], Params::new())?;
println!("{}", blogs["user"]["blogs"][0]["url"]);

let params = Params::new()
    .insert("type", "photo")
    .insert("caption", "Hello, Tumblr!")
    .insert("data", Upload::from_path("photo.jpg")?);
client.post("post", Some("example.tumblr.com"), &[], params)?;

let avatar = client.get_avatar_url("example.tumblr.com", 128)?;
println!("{}", avatar["url"]);
# Ok(())
# }
```
*/
mod client;
mod error;
mod params;
mod request;
pub mod response;
mod secrets;
mod signer;
mod token_reader;
pub mod url_builder;

// exposed to external program
pub use client::{
    Client, ClientBuilder, ACCESS_TOKEN_URL, AUTHORIZE_URL, DEFAULT_AVATAR_SIZE,
    REQUEST_TOKEN_URL,
};
pub use error::{
    Error, ErrorKind, Result, TokenReaderError, TokenReaderResult, STATUS_RATE_LIMITED,
    STATUS_UNAUTHORIZED,
};
pub use http::Method;
pub use params::{classify, ClassifiedParams, ParamValue, Params, Upload};
pub use request::{RequestBuilder, RequestSpec};
pub use secrets::{Credentials, SecretsProvider, SigningMode};
pub use signer::{OAuthParameters, Signer};
pub use token_reader::{build_auth_url, AuthenticationTokens, TokenReader, TokenResponse};

/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
