//! REST transport for the Privileged Access Manager v1 JSON API.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::TlsConfig;
use crate::error::ErrorKind;
use crate::transport::traits::{
    CreateGrantRequest, GrantTransitionRequest, GrantTransport, ListGrantsRequest,
    ListGrantsResponse, Transport,
};
use crate::types::{GrantResource, Justification, Operation, Status, format_duration_secs};
use crate::user_agent;
use crate::Error;

const API_VERSION: &str = "v1";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the identity-agnostic HTTP client shared by every transport a
/// connector creates.
pub(crate) fn build_http_client(
    tls_config: &TlsConfig,
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client, Error> {
    let mut client_builder = reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .user_agent(user_agent::user_agent());

    if tls_config.skip_verification {
        client_builder = client_builder.danger_accept_invalid_certs(true);
    }

    for pem in tls_config.ca_certificates_pem()? {
        let certs = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
            Error::configuration(format!("invalid CA certificate: {}", e)).with_source(e)
        })?;
        if certs.is_empty() {
            return Err(Error::configuration("CA certificate material contains no certificates"));
        }
        for cert in certs {
            client_builder = client_builder.add_root_certificate(cert);
        }
    }

    client_builder.build().map_err(|e| {
        Error::client_initialization(format!("failed to create HTTP client: {}", e)).with_source(e)
    })
}

/// Builds a sensitive `Authorization` header value.
pub(crate) fn authorization_header(value: &str) -> Result<HeaderValue, Error> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        Error::client_initialization("access token contains characters not allowed in a header")
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// REST transport bound to a single identity.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct RestTransport {
    http: reqwest::Client,
    base_url: Url,
    authorization: HeaderValue,
}

impl std::fmt::Debug for RestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl RestTransport {
    pub(crate) fn new(http: reqwest::Client, base_url: Url, authorization: HeaderValue) -> Self {
        Self { http, base_url, authorization }
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `v1/{name}{suffix}`, percent-encoding each name segment.
    fn resource_url(&self, name: &str, suffix: &str) -> Result<Url, Error> {
        let encoded: Vec<_> = name.split('/').map(urlencoding::encode).collect();
        let path = format!("{}/{}{}", API_VERSION, encoded.join("/"), suffix);
        Ok(self.base_url.join(&path)?)
    }

    async fn execute<R>(&self, request: reqwest::RequestBuilder) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let response = request
            .header(AUTHORIZATION, self.authorization.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            let request_id = response
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();

            let mut err = map_status_error(status.as_u16(), &body);
            if let Some(delay) = retry_after {
                err = err.with_retry_after(delay);
            }
            if let Some(id) = request_id {
                err = err.with_request_id(id);
            }
            return Err(err);
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body).map_err(|e| {
            Error::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateGrantBody {
    requested_duration: String,
    justification: Justification,
}

#[derive(Debug, Serialize)]
struct TransitionBody<'a> {
    reason: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListGrantsBody {
    #[serde(default)]
    grants: Vec<GrantResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Status,
}

#[async_trait::async_trait]
impl GrantTransport for RestTransport {
    async fn list_grants(&self, request: ListGrantsRequest) -> Result<ListGrantsResponse, Error> {
        let mut url = self.resource_url(&request.parent, "/grants")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(size) = request.page_size {
                query.append_pair("pageSize", &size.to_string());
            }
            if let Some(ref token) = request.page_token {
                query.append_pair("pageToken", token);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let body: ListGrantsBody = self.execute(self.http.get(url)).await?;
        Ok(ListGrantsResponse {
            grants: body.grants,
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn create_grant(&self, request: CreateGrantRequest) -> Result<GrantResource, Error> {
        let url = self.resource_url(&request.parent, "/grants")?;
        let body = CreateGrantBody {
            requested_duration: format_duration_secs(request.requested_duration_secs),
            justification: Justification::unstructured(request.justification),
        };
        self.execute(self.http.post(url).json(&body)).await
    }

    async fn approve_grant(&self, request: GrantTransitionRequest) -> Result<GrantResource, Error> {
        let url = self.resource_url(&request.name, ":approve")?;
        let body = TransitionBody { reason: &request.reason };
        self.execute(self.http.post(url).json(&body)).await
    }

    async fn revoke_grant(&self, request: GrantTransitionRequest) -> Result<Operation, Error> {
        let url = self.resource_url(&request.name, ":revoke")?;
        let body = TransitionBody { reason: &request.reason };
        self.execute(self.http.post(url).json(&body)).await
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, Error> {
        let url = self.resource_url(name, "")?;
        self.execute(self.http.get(url)).await
    }

    fn transport_type(&self) -> Transport {
        Transport::Http
    }
}

/// Maps reqwest errors to crate errors.
fn map_reqwest_error(e: reqwest::Error) -> Error {
    let kind = if e.is_timeout() {
        ErrorKind::Timeout
    } else if e.is_connect() {
        ErrorKind::Connection
    } else if e.is_decode() {
        ErrorKind::InvalidResponse
    } else if e.is_builder() {
        ErrorKind::ClientInitialization
    } else {
        ErrorKind::Connection
    };
    Error::new(kind, format!("HTTP request failed: {}", e)).with_source(e)
}

/// Maps a non-success HTTP response to a crate error.
///
/// The canonical status name in the JSON error body wins over the HTTP code.
fn map_status_error(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);

    let (message, status_name) = match parsed {
        Some(err) if !err.message.is_empty() || err.status.is_some() => (err.message, err.status),
        _ if body.is_empty() => (format!("HTTP {}", status), None),
        _ => (body.to_string(), None),
    };

    let kind = status_name
        .as_deref()
        .and_then(ErrorKind::from_rpc_status)
        .unwrap_or_else(|| ErrorKind::from_http_status(status));

    let err = Error::new(kind, message);
    match status_name {
        Some(name) => err.with_backend_status(name),
        None => err,
    }
}
