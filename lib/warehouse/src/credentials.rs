use bqsearch_core::{Error, Result};
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google service-account key file, as downloaded from the cloud console
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Load and validate a key file. Any failure here is meant to stop startup.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::Credentials(format!("cannot read key file {}: {}", path.display(), e))
        })?;
        Self::from_json(&data)
            .map_err(|e| Error::Credentials(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(data)
            .map_err(|e| Error::Credentials(format!("malformed key file: {}", e)))?;
        key.validate()?;
        Ok(key)
    }

    fn validate(&self) -> Result<()> {
        if let Some(kind) = self.key_type.as_deref() {
            if kind != "service_account" {
                return Err(Error::Credentials(format!(
                    "expected a service_account key, got '{}'",
                    kind
                )));
            }
        }
        if self.client_email.trim().is_empty() {
            return Err(Error::Credentials("client_email is empty".to_string()));
        }
        self.encoding_key()?;
        Ok(())
    }

    /// RSA signing key for JWT assertions
    pub fn encoding_key(&self) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| Error::Credentials(format!("invalid private_key: {}", e)))
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
