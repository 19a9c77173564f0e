// Token grant endpoint

use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;
use crate::models::TokenGrant;

const TOKEN_PATH: &str = "/v1.0/token?grant_type=1";

impl CloudClient {
    /// Request a fresh access token with the client credentials.
    ///
    /// `GET /v1.0/token?grant_type=1`, signed without an access token. Any
    /// vendor-level failure is reported as [`Error::Authentication`].
    pub async fn request_token(&self) -> Result<TokenGrant, Error> {
        debug!(client_id = self.signer().client_id(), "requesting access token");
        self.get::<TokenGrant>(TOKEN_PATH, None)
            .await
            .map_err(|e| match e {
                Error::Vendor { code, message } => Error::Authentication {
                    message: format!("token grant refused (code {code}): {message}"),
                },
                other => other,
            })
    }
}
