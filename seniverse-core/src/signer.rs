//! Request authentication for `/weather/daily.json`.
//!
//! The provider accepts either the private key in clear (`key=...`) or a
//! query signed with HMAC-SHA1 under the private key and identified by the
//! public key. The signed form must reproduce the provider's canonical
//! string exactly, otherwise every request is rejected.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha1::Sha1;
use thiserror::Error;

use crate::model::CityId;

type HmacSha1 = Hmac<Sha1>;

pub const DAILY_PATH: &str = "/weather/daily.json";

/// Lifetime of a signed URL, in seconds.
pub const SIGNATURE_TTL: u64 = 60;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

/// Query parameters of one daily forecast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub location: CityId,
    pub start: u32,
    pub days: u32,
}

impl RequestParams {
    pub fn new(location: CityId, days: u32) -> Self {
        Self { location, start: 0, days }
    }
}

/// A request ready to be sent. Carries credentials, so `Debug` redacts them.
#[derive(Clone, PartialEq, Eq)]
pub enum SignedRequest {
    /// Complete URL including `sig`.
    Signed(Url),
    /// Endpoint plus a parameter bag holding the private key in clear.
    Keyed {
        endpoint: Url,
        params: Vec<(&'static str, String)>,
    },
}

impl SignedRequest {
    pub fn endpoint(&self) -> &Url {
        match self {
            Self::Signed(url) => url,
            Self::Keyed { endpoint, .. } => endpoint,
        }
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut endpoint = self.endpoint().clone();
        endpoint.set_query(None);
        match self {
            Self::Signed(_) => f.debug_tuple("Signed").field(&endpoint.as_str()).finish(),
            Self::Keyed { .. } => f
                .debug_struct("Keyed")
                .field("endpoint", &endpoint.as_str())
                .field("params", &"<redacted>")
                .finish(),
        }
    }
}

/// `{base_url}/weather/daily.json`, ignoring one trailing slash on the base.
pub fn endpoint_url(base_url: &str) -> Result<Url, SignError> {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let joined = format!("{base}{DAILY_PATH}");
    Url::parse(&joined).map_err(|e| SignError::InvalidEndpoint {
        reason: e.to_string(),
        url: joined,
    })
}

/// Private-key scheme: the key travels as a plain query parameter.
pub fn sign_private(endpoint: Url, private_key: &str, params: &RequestParams) -> SignedRequest {
    SignedRequest::Keyed {
        endpoint,
        params: vec![
            ("key", private_key.to_string()),
            ("location", params.location.to_string()),
            ("start", params.start.to_string()),
            ("days", params.days.to_string()),
        ],
    }
}

/// Public-key scheme: HMAC-SHA1 over the canonical query, appended as `sig`.
pub fn sign_public(
    endpoint: Url,
    private_key: &str,
    public_key: &str,
    params: &RequestParams,
    ts: i64,
) -> SignedRequest {
    let pairs = [
        ("ttl", SIGNATURE_TTL.to_string()),
        ("ts", ts.to_string()),
        ("public_key", public_key.to_string()),
        ("location", params.location.to_string()),
        ("start", params.start.to_string()),
        ("days", params.days.to_string()),
    ];
    SignedRequest::Signed(sign_url(endpoint, private_key, &pairs))
}

/// Set every pair on `endpoint` and append the matching `sig`.
pub fn sign_url(mut endpoint: Url, secret: &str, pairs: &[(&str, String)]) -> Url {
    let sig = signature(secret, &canonical_query(pairs));

    endpoint.set_query(None);
    endpoint
        .query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .append_pair("sig", &sig);
    endpoint
}

/// Pairs rendered as `key=value`, sorted by that rendered string, joined by `&`.
///
/// Values are not percent-encoded here; the provider signs the raw text.
pub fn canonical_query(pairs: &[(&str, String)]) -> String {
    let mut rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    rendered.sort();
    rendered.join("&")
}

/// Base64 HMAC-SHA1 of `message` keyed with `secret`.
pub fn signature(secret: &str, message: &str) -> String {
    // HMAC pads or hashes the key to the block size, so no length is rejected.
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
