// Vendor open API HTTP client
//
// Wraps `reqwest::Client` with URL construction, request signing and
// envelope unwrapping. Endpoint modules (token, devices, logs) add inherent
// methods from separate files so this module stays focused on transport.

use reqwest::Method;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::VendorResponse;
use crate::sign::RequestSigner;
use crate::transport::TransportConfig;

/// Raw HTTP client for the vendor open API.
///
/// Every request is signed with the configured [`RequestSigner`]. All
/// methods return the unwrapped `result` payload; the envelope is stripped
/// before the caller sees it.
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    signer: RequestSigner,
    timeout_secs: u64,
}

impl CloudClient {
    /// Create a client for `base_url` (e.g. `https://openapi.tuyaeu.com`).
    pub fn new(
        base_url: Url,
        signer: RequestSigner,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            signer,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, signer: RequestSigner) -> Self {
        Self {
            http,
            base_url,
            signer,
            timeout_secs: TransportConfig::default().timeout.as_secs(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute API path (with optional query) onto the base URL.
    pub(crate) fn api_url(&self, path_and_query: &str) -> Result<Url, Error> {
        let full = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path_and_query
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a signed GET and unwrap the envelope.
    ///
    /// `access_token` is `None` only for the token grant itself.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        access_token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let url = self.api_url(path_and_query)?;
        debug!("GET {}", url);

        // The signature covers the path and query exactly as sent.
        let signed_path = &url[url::Position::BeforePath..];
        let headers = self
            .signer
            .sign(&Method::GET, signed_path, b"", access_token)?;

        let resp = headers
            .apply(self.http.get(url.clone()))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        self.parse_envelope(resp).await
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Parse the `{ success, result, code, msg }` envelope, returning
    /// `result` on success or an `Error::Vendor` otherwise.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "request rejected with HTTP 401".into(),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;

        let envelope: VendorResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("HTTP {status}: {e}"),
                body: body.clone(),
            })?;

        if !envelope.success {
            return Err(Error::Vendor {
                code: envelope.code.unwrap_or_default(),
                message: envelope
                    .msg
                    .unwrap_or_else(|| format!("request failed with HTTP {status}")),
            });
        }

        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "successful response carried no result".into(),
            body,
        })
    }
}
