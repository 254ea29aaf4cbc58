//! Request signing for Bybit V5 private endpoints.
//!
//! Signature = hex(HMAC-SHA256(secret, timestamp + api_key + recv_window + payload))
//! where payload is the query string for GET and the raw JSON body for POST.

use std::fmt;

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use sha2::Sha256;
use zeroize::Zeroizing;

use sigex_executor::{GatewayError, GatewayResult};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_API_KEY: &str = "x-bapi-api-key";
pub const HEADER_TIMESTAMP: &str = "x-bapi-timestamp";
pub const HEADER_RECV_WINDOW: &str = "x-bapi-recv-window";
pub const HEADER_SIGN: &str = "x-bapi-sign";
pub const HEADER_SIGN_TYPE: &str = "x-bapi-sign-type";

/// HMAC signature type.
const SIGN_TYPE_HMAC: &str = "2";

/// API key pair. The secret is wiped on drop and never printed.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Signs private requests.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    recv_window_ms: u64,
}

impl RequestSigner {
    pub fn new(credentials: Credentials, recv_window_ms: u64) -> Self {
        Self {
            credentials,
            recv_window_ms,
        }
    }

    pub fn recv_window_ms(&self) -> u64 {
        self.recv_window_ms
    }

    /// Hex-encoded signature of `payload` at `timestamp_ms`.
    pub fn sign(&self, timestamp_ms: u64, payload: &str) -> GatewayResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.api_secret.as_bytes())
            .map_err(|e| GatewayError::Config(format!("Invalid API secret: {e}")))?;
        mac.update(timestamp_ms.to_string().as_bytes());
        mac.update(self.credentials.api_key.as_bytes());
        mac.update(self.recv_window_ms.to_string().as_bytes());
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Authentication headers for one request.
    pub fn headers(&self, timestamp_ms: u64, payload: &str) -> GatewayResult<HeaderMap> {
        let signature = self.sign(timestamp_ms, payload)?;

        let mut headers = HeaderMap::new();
        headers.insert(HEADER_API_KEY, header_value(&self.credentials.api_key)?);
        headers.insert(HEADER_TIMESTAMP, header_value(&timestamp_ms.to_string())?);
        headers.insert(
            HEADER_RECV_WINDOW,
            header_value(&self.recv_window_ms.to_string())?,
        );
        headers.insert(HEADER_SIGN, header_value(&signature)?);
        headers.insert(HEADER_SIGN_TYPE, HeaderValue::from_static(SIGN_TYPE_HMAC));
        Ok(headers)
    }
}

fn header_value(value: &str) -> GatewayResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| GatewayError::Config(format!("Invalid header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> RequestSigner {
        RequestSigner::new(Credentials::new("test-key", "test-secret"), 20_000)
    }

    #[test]
    fn test_sign_known_vector() {
        let sig = signer()
            .sign(1_700_000_000_000, "category=linear&symbol=BTCUSDT")
            .unwrap();
        assert_eq!(
            sig,
            "b7686e57485ae5d4895913d48d838f7fc9a530fe957be6a3918f39543a0563d5"
        );
    }

    #[test]
    fn test_signature_depends_on_timestamp() {
        let s = signer();
        let a = s.sign(1_700_000_000_000, "{}").unwrap();
        let b = s.sign(1_700_000_000_001, "{}").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_headers() {
        let headers = signer().headers(1_700_000_000_000, "").unwrap();
        assert_eq!(headers[HEADER_API_KEY], "test-key");
        assert_eq!(headers[HEADER_TIMESTAMP], "1700000000000");
        assert_eq!(headers[HEADER_RECV_WINDOW], "20000");
        assert_eq!(headers[HEADER_SIGN_TYPE], "2");
        assert_eq!(headers[HEADER_SIGN].len(), 64);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", Credentials::new("k", "very-secret"));
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_incomplete_credentials() {
        assert!(!Credentials::new("", "s").is_complete());
        assert!(!Credentials::new("k", "").is_complete());
        assert!(Credentials::new("k", "s").is_complete());
    }
}
