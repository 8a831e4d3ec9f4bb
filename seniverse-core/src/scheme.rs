use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// How requests are authenticated against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// HMAC-signed query identified by the public key.
    #[serde(alias = "公钥")]
    Public,
    /// Private key sent as a plain `key` parameter.
    #[default]
    #[serde(alias = "私钥")]
    Private,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Public => "public",
            AuthScheme::Private => "private",
        }
    }

    pub const fn all() -> &'static [AuthScheme] {
        &[AuthScheme::Public, AuthScheme::Private]
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuthScheme {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "public" | "公钥" => Ok(AuthScheme::Public),
            "private" | "私钥" => Ok(AuthScheme::Private),
            _ => Err(anyhow::anyhow!(
                "Unknown auth scheme '{value}'. Supported schemes: public, private."
            )),
        }
    }
}
