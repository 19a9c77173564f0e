// Request signing for the vendor open API.
//
// Every call carries an HMAC-SHA256 signature over the client id, the
// (optional) access token, a millisecond timestamp, a one-shot nonce and a
// canonical description of the request. The token grant is the only call
// signed without an access token.

use std::fmt;

use hmac::{Hmac, Mac};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Value of the `sign_method` header.
pub const SIGN_METHOD: &str = "HMAC-SHA256";

/// Computes vendor signatures for outbound requests.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    client_id: String,
    client_secret: SecretString,
}

impl RequestSigner {
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Sign a request using the current wall-clock time and a fresh nonce.
    ///
    /// `path` is the request path including its query string, exactly as
    /// sent. Pass `access_token = None` for the token grant.
    pub fn sign(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
        access_token: Option<&SecretString>,
    ) -> Result<SignedHeaders, Error> {
        let t = chrono::Utc::now().timestamp_millis();
        let nonce = Uuid::new_v4().simple().to_string();
        self.sign_at(method, path, body, access_token, t, &nonce)
    }

    /// Deterministic signing with an explicit timestamp (ms) and nonce.
    pub fn sign_at(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
        access_token: Option<&SecretString>,
        t: i64,
        nonce: &str,
    ) -> Result<SignedHeaders, Error> {
        let t = t.to_string();
        let canonical = string_to_sign(method, body, path);

        let mut input = String::with_capacity(
            self.client_id.len() + t.len() + nonce.len() + canonical.len() + 64,
        );
        input.push_str(&self.client_id);
        if let Some(token) = access_token {
            input.push_str(token.expose_secret());
        }
        input.push_str(&t);
        input.push_str(nonce);
        input.push_str(&canonical);

        let mut mac = HmacSha256::new_from_slice(self.client_secret.expose_secret().as_bytes())
            .map_err(|e| Error::Authentication {
                message: format!("unusable client secret: {e}"),
            })?;
        mac.update(input.as_bytes());
        let sign = hex::encode_upper(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            client_id: self.client_id.clone(),
            access_token: access_token.cloned(),
            sign,
            t,
            nonce: nonce.to_owned(),
        })
    }
}

/// `METHOD \n sha256(body) \n \n path` -- the canonical request description.
///
/// The vendor's header-signing slot (third line) is always empty here.
pub fn string_to_sign(method: &Method, body: &[u8], path: &str) -> String {
    format!("{}\n{}\n\n{}", method.as_str(), sha256_hex(body), path)
}

fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    format!("{digest:x}")
}

/// The header set attached to a signed request.
#[derive(Clone)]
pub struct SignedHeaders {
    pub client_id: String,
    pub access_token: Option<SecretString>,
    pub sign: String,
    pub t: String,
    pub nonce: String,
}

impl SignedHeaders {
    /// Attach every signing header to a request builder.
    pub fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .header("client_id", &self.client_id)
            .header("sign", &self.sign)
            .header("t", &self.t)
            .header("nonce", &self.nonce)
            .header("sign_method", SIGN_METHOD);
        match &self.access_token {
            Some(token) => builder.header("access_token", token.expose_secret()),
            None => builder,
        }
    }
}

impl fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedHeaders")
            .field("client_id", &self.client_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("sign", &self.sign)
            .field("t", &self.t)
            .field("nonce", &self.nonce)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn signer() -> RequestSigner {
        RequestSigner::new("client-abc", SecretString::from("s3cr3t".to_string()))
    }

    #[test]
    fn empty_body_hashes_the_empty_string() {
        let s = string_to_sign(&Method::GET, b"", "/v1.0/token?grant_type=1");
        assert_eq!(s, format!("GET\n{EMPTY_SHA256}\n\n/v1.0/token?grant_type=1"));
    }

    #[test]
    fn signature_is_reproducible_for_fixed_inputs() {
        let token = SecretString::from("tok-1".to_string());
        let a = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", Some(&token), 1_700_000_000_000, "n1")
            .unwrap();
        let b = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", Some(&token), 1_700_000_000_000, "n1")
            .unwrap();
        assert_eq!(a.sign, b.sign);
        assert_eq!(a.sign.len(), 64);
        assert_eq!(a.sign, a.sign.to_uppercase());
    }

    #[test]
    fn nonce_or_timestamp_changes_the_signature() {
        let base = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", None, 1_700_000_000_000, "n1")
            .unwrap();
        let other_nonce = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", None, 1_700_000_000_000, "n2")
            .unwrap();
        let other_time = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", None, 1_700_000_000_001, "n1")
            .unwrap();
        assert_ne!(base.sign, other_nonce.sign);
        assert_ne!(base.sign, other_time.sign);
    }

    #[test]
    fn access_token_is_part_of_the_signature() {
        let token = SecretString::from("tok-1".to_string());
        let anon = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", None, 1, "n")
            .unwrap();
        let authed = signer()
            .sign_at(&Method::GET, "/v1.0/x", b"", Some(&token), 1, "n")
            .unwrap();
        assert_ne!(anon.sign, authed.sign);
        assert!(anon.access_token.is_none());
        assert!(authed.access_token.is_some());
    }

    #[test]
    fn matches_manual_hmac_computation() {
        let canonical = string_to_sign(&Method::GET, b"", "/v1.0/token?grant_type=1");
        let input = format!("client-abc1700000000000n1{canonical}");
        let mut mac = HmacSha256::new_from_slice(b"s3cr3t").unwrap();
        mac.update(input.as_bytes());
        let expected = hex::encode_upper(mac.finalize().into_bytes());

        let headers = signer()
            .sign_at(
                &Method::GET,
                "/v1.0/token?grant_type=1",
                b"",
                None,
                1_700_000_000_000,
                "n1",
            )
            .unwrap();
        assert_eq!(headers.sign, expected);
        assert_eq!(headers.t, "1700000000000");
    }

    #[test]
    fn fresh_signatures_use_distinct_nonces() {
        let a = signer().sign(&Method::GET, "/v1.0/x", b"", None).unwrap();
        let b = signer().sign(&Method::GET, "/v1.0/x", b"", None).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(a.nonce.len(), 32);
    }

    #[test]
    fn debug_redacts_access_token() {
        let token = SecretString::from("super-secret-token".to_string());
        let headers = signer()
            .sign_at(&Method::GET, "/", b"", Some(&token), 1, "n")
            .unwrap();
        let rendered = format!("{headers:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
