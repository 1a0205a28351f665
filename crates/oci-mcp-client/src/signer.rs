//! OCI HTTP request signatures (draft-cavage, `rsa-sha256`).
//!
//! Every request signs `date`, `(request-target)` and `host`. Requests with a
//! body additionally sign `content-length`, `content-type` and
//! `x-content-sha256`.

use crate::error::ClientError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use oci_mcp_core::Profile;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::{Digest, Sha256};
use std::fs;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Signs requests with a profile's API key.
#[derive(Clone)]
pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Load the key file named by a profile.
    pub fn from_profile(profile: &Profile) -> Result<Self, ClientError> {
        let pem = fs::read_to_string(&profile.key_file).map_err(|e| {
            ClientError::Auth(format!(
                "cannot read key file {}: {}",
                profile.key_file.display(),
                e
            ))
        })?;
        Self::from_pem(profile.key_id(), &pem)
    }

    /// Build a signer from a PEM-encoded RSA key (PKCS#8 or PKCS#1).
    pub fn from_pem(key_id: impl Into<String>, pem: &str) -> Result<Self, ClientError> {
        if pem.contains("ENCRYPTED") {
            return Err(ClientError::Auth(
                "encrypted private keys are not supported; decrypt the key file first".to_string(),
            ));
        }
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| ClientError::Auth(format!("invalid RSA private key: {}", e)))?;

        Ok(Self {
            key_id: key_id.into(),
            signing_key: SigningKey::<Sha256>::new(key),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Headers to attach to a request, `Authorization` included.
    ///
    /// `target` is the path plus query string exactly as sent. `date` must be
    /// an RFC 7231 date and is echoed back as the `date` header.
    pub fn sign(
        &self,
        method: &str,
        host: &str,
        target: &str,
        body: Option<&[u8]>,
        date: &str,
    ) -> Vec<(&'static str, String)> {
        let mut headers: Vec<(&'static str, String)> = vec![
            ("date", date.to_string()),
            (
                "(request-target)",
                format!("{} {}", method.to_lowercase(), target),
            ),
            ("host", host.to_string()),
        ];

        if let Some(body) = body {
            headers.push(("content-length", body.len().to_string()));
            headers.push(("content-type", CONTENT_TYPE_JSON.to_string()));
            headers.push(("x-content-sha256", STANDARD.encode(Sha256::digest(body))));
        }

        let signing_string = headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n");
        let signed_names = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(" ");

        let signature = self.signing_key.sign(signing_string.as_bytes());
        let authorization = format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            signed_names,
            STANDARD.encode(signature.to_bytes())
        );

        // (request-target) is a pseudo header and never sent.
        headers.retain(|(name, _)| *name != "(request-target)");
        headers.push(("authorization", authorization));
        headers
    }
}

/// Current time formatted for the `date` header.
pub fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
