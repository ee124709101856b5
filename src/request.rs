use std::collections::BTreeMap;

use http::{header::AUTHORIZATION, Method};
use reqwest::blocking::{
    multipart, Client as HttpClient, RequestBuilder as ReqwestRequestBuilder, Response,
};
use url::Url;

use crate::{
    ClassifiedParams, Error, OAuthParameters, Params, Result, SecretsProvider, Signer, Upload,
};

const RESERVED_PREFIX: &str = "oauth_";

/// One API call: endpoint, method, optional blog and path segments, parameters.
#[derive(Debug)]
pub struct RequestSpec {
    pub endpoint: String,
    pub method: Method,
    pub blog_url: Option<String>,
    pub extra_segments: Vec<String>,
    pub params: Params,
}

impl RequestSpec {
    pub fn new<E: Into<String>>(method: Method, endpoint: E) -> Self {
        RequestSpec {
            endpoint: endpoint.into(),
            method,
            blog_url: None,
            extra_segments: Vec::new(),
            params: Params::new(),
        }
    }

    pub fn get<E: Into<String>>(endpoint: E) -> Self {
        RequestSpec::new(Method::GET, endpoint)
    }

    pub fn post<E: Into<String>>(endpoint: E) -> Self {
        RequestSpec::new(Method::POST, endpoint)
    }

    pub fn blog<B: Into<String>>(self, blog_url: B) -> Self {
        RequestSpec {
            blog_url: Some(blog_url.into()),
            ..self
        }
    }

    /// Appends one path segment after the endpoint name.
    pub fn segment<S: Into<String>>(mut self, segment: S) -> Self {
        self.extra_segments.push(segment.into());
        self
    }

    pub fn params(self, params: Params) -> Self {
        RequestSpec { params, ..self }
    }
}

/// Builds and sends one signed request.
///
/// Plain fields travel in the query string for `GET`, in a url-encoded body
/// for `POST`, and in both the query string and the multipart body for `POST`
/// with files. Only plain fields are covered by the OAuth signature; file
/// parts never are.
pub struct RequestBuilder<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    http: &'a HttpClient,
    method: Method,
    url: Url,
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a>,
    fields: Vec<(String, String)>,
    files: BTreeMap<String, Upload>,
}

impl<'a, TSecretsProvider> RequestBuilder<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    /// Starts a request to `url`. Any query already present on `url` is
    /// moved into the signed fields.
    pub fn new(
        http: &'a HttpClient,
        method: Method,
        url: &str,
        secrets: &'a TSecretsProvider,
    ) -> Result<Self> {
        let mut url = Url::parse(url)
            .map_err(|err| Error::generic(format!("invalid url {} : {}", url, err)))?;
        let fields = url
            .query_pairs()
            .into_owned()
            .collect::<Vec<(String, String)>>();
        url.set_query(None);
        Ok(RequestBuilder {
            http,
            method,
            url,
            secrets,
            parameters: OAuthParameters::new(),
            fields,
            files: BTreeMap::new(),
        })
    }

    /// Sets the per-request OAuth protocol parameters (callback, verifier, ...).
    pub fn oauth_parameters(self, parameters: OAuthParameters<'a>) -> Self {
        RequestBuilder { parameters, ..self }
    }

    /// Adds classified parameters to the request.
    pub fn params(mut self, params: ClassifiedParams) -> Self {
        self.fields.extend(params.fields.into_iter());
        self.files.extend(params.files.into_iter());
        self
    }

    /// Adds (or replaces) a single plain field.
    pub fn field<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        let key = key.into();
        self.fields.retain(|(k, _)| *k != key);
        self.fields.push((key, value.into()));
        self
    }

    /// Sends the request. Redirects are reported, not followed.
    pub fn send(self) -> Result<Response> {
        let method = self.method.clone();
        let url = self.url.clone();
        let request = self.generate_signature()?;
        log::debug!("sending {} request to {}", method, url);
        request.send().map_err(|err| {
            log::debug!("{} {} failed: {}", method, url, err);
            Error::Request(err)
        })
    }

    /// Encodes the parameters and attaches the `Authorization` header.
    ///
    /// Fields prefixed with `oauth_` are rejected: the signer leaves them out
    /// of the base string, so sending them would break the signature. Protocol
    /// values go through [`OAuthParameters`] instead.
    pub fn generate_signature(self) -> Result<ReqwestRequestBuilder> {
        log::trace!(
            "fields: {:?}, files: {:?}",
            self.fields,
            self.files.keys().collect::<Vec<_>>()
        );
        if let Some((key, _)) = self
            .fields
            .iter()
            .find(|(key, _)| key.starts_with(RESERVED_PREFIX))
        {
            return Err(Error::generic(format!(
                "Parameter {:?} uses the reserved {} prefix",
                key, RESERVED_PREFIX
            )));
        }
        let (inner, is_url_query) = match self.method {
            Method::GET => {
                if !self.files.is_empty() {
                    return Err(Error::generic("Files can only be sent with POST"));
                }
                let inner = self.http.get(self.url.clone()).query(&self.fields);
                (inner, true)
            }
            Method::POST if self.files.is_empty() => {
                let inner = self.http.post(self.url.clone()).form(&self.fields);
                (inner, false)
            }
            Method::POST => {
                let mut form = multipart::Form::new();
                for (key, value) in &self.fields {
                    form = form.text(key.clone(), value.clone());
                }
                for (key, upload) in self.files {
                    let (reader, file_name) = upload.into_parts();
                    let mut part = multipart::Part::reader(reader);
                    if let Some(file_name) = file_name {
                        part = part.file_name(file_name);
                    }
                    form = form.part(key, part);
                }
                // the multipart body is opaque to the signer, so the plain
                // fields are repeated in the query where they get signed
                let inner = self
                    .http
                    .post(self.url.clone())
                    .query(&self.fields)
                    .multipart(form);
                (inner, true)
            }
            _ => return Err(Error::generic("Method must be of GET or POST")),
        };

        let signature = Signer::new(self.secrets, self.parameters).generate_signature(
            &self.method,
            self.url,
            &self.fields,
            is_url_query,
        );
        Ok(match signature {
            Some(signature) => inner.header(AUTHORIZATION, signature),
            None => inner,
        })
    }
}
