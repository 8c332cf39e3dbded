//! Random byte sourcing for Stranger Q.
//!
//! Byte requests prefer the ANU quantum random number service and transparently
//! substitute the operating system CSPRNG whenever the remote call fails in any
//! way (network error, timeout, bad status, malformed payload). Callers always
//! receive usable bytes; the [`Provenance`] tag on the result records which
//! branch produced them so surfaces can display how a value was generated.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default remote endpoint (ANU QRNG JSON API).
pub const DEFAULT_ENDPOINT: &str = "https://qrng.anu.edu.au/API/jsonI.php";

/// Upper bound on bytes per request, keeping any single remote call small.
pub const MAX_REQUEST_BYTES: usize = 256;

/// Default bound on the remote attempt. A hung service must never block a
/// caller longer than this; past it we fall back locally.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Contract violations only. Remote-source failures are recovered internally
/// and never reach the caller as errors.
#[derive(Debug, Error)]
pub enum EntropyError {
    #[error("byte count must be between 1 and {max} (got {count})")]
    InvalidCount { count: usize, max: usize },
}

/// Which source actually produced a byte sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Bytes came from the remote true-random service.
    Quantum,
    /// Bytes came from the local CSPRNG after a failed remote attempt.
    Fallback,
}

impl Provenance {
    pub fn is_quantum(self) -> bool {
        matches!(self, Provenance::Quantum)
    }

    /// Short entropy-class label used in API responses.
    pub fn entropy_label(self) -> &'static str {
        match self {
            Provenance::Quantum => "quantum",
            Provenance::Fallback => "csprng",
        }
    }

    /// Human-readable source name used in API responses.
    pub fn source_label(self) -> &'static str {
        match self {
            Provenance::Quantum => "Stranger Q",
            Provenance::Fallback => "CSPRNG fallback",
        }
    }
}

/// A fresh byte sequence plus the provenance of the source that produced it.
/// Immutable once returned; never cached or persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomDraw {
    pub bytes: Vec<u8>,
    pub provenance: Provenance,
}

impl RandomDraw {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Render the bytes as lowercase hex for dashboards / API payloads.
    pub fn as_hex(&self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut out = String::with_capacity(self.bytes.len() * 2);
        for byte in &self.bytes {
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0xF) as usize] as char);
        }
        out
    }
}

/// Remote-source configuration.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint parses"),
            timeout: DEFAULT_TIMEOUT,
            max_bytes: MAX_REQUEST_BYTES,
        }
    }
}

/// Seam for anything that can supply tagged random bytes. The HTTP layer is
/// written against this trait so tests can inject a deterministic source.
#[async_trait]
pub trait RandomSource: Send + Sync {
    /// Return exactly `count` bytes. Must not fail for remote-source reasons;
    /// only `count` outside `1..=max` is an error.
    async fn fetch(&self, count: usize) -> Result<RandomDraw, EntropyError>;
}

/// Provider backed by the ANU QRNG service with local CSPRNG fallback.
pub struct QuantumSource {
    config: SourceConfig,
    client: reqwest::Client,
}

impl QuantumSource {
    pub fn new(config: SourceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("http client builds");
        Self { config, client }
    }

    pub fn with_defaults() -> Self {
        Self::new(SourceConfig::default())
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn try_remote(&self, count: usize) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .client
            .get(self.config.endpoint.clone())
            .query(&[("length", count.to_string()), ("type", "uint8".into())])
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let payload: QrngResponse = response.json().await?;
        accept_payload(payload, count)
    }
}

#[async_trait]
impl RandomSource for QuantumSource {
    async fn fetch(&self, count: usize) -> Result<RandomDraw, EntropyError> {
        if count < 1 || count > self.config.max_bytes {
            return Err(EntropyError::InvalidCount {
                count,
                max: self.config.max_bytes,
            });
        }

        match self.try_remote(count).await {
            Ok(bytes) => {
                tracing::debug!(count, "fetched quantum random bytes");
                Ok(RandomDraw {
                    bytes,
                    provenance: Provenance::Quantum,
                })
            }
            Err(error) => {
                tracing::warn!(%error, count, "QRNG unavailable, falling back to CSPRNG");
                Ok(RandomDraw {
                    bytes: fallback_bytes(count),
                    provenance: Provenance::Fallback,
                })
            }
        }
    }
}

/// Draw `count` bytes from the operating system CSPRNG.
pub fn fallback_bytes(count: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; count];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[derive(Debug, Error)]
enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Payload(&'static str),
}

#[derive(Debug, Deserialize)]
struct QrngResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<i64>,
}

/// Validate the remote payload shape: declared success, at least `count`
/// values, every value a byte. Anything else triggers fallback.
fn accept_payload(payload: QrngResponse, count: usize) -> Result<Vec<u8>, RemoteError> {
    if !payload.success {
        return Err(RemoteError::Payload("success flag not set"));
    }
    if payload.data.len() < count {
        return Err(RemoteError::Payload("fewer values than requested"));
    }
    let mut bytes = Vec::with_capacity(count);
    for value in payload.data.into_iter().take(count) {
        if !(0..=255).contains(&value) {
            return Err(RemoteError::Payload("value outside byte range"));
        }
        bytes.push(value as u8);
    }
    Ok(bytes)
}
