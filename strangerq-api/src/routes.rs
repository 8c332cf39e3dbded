//! Endpoint handlers. Each one clamps its length parameter to the tool's
//! cap, draws bytes through the provider, and applies a keygen transform.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use strangerq_keygen::{
    bytes_to_bits, bytes_to_key, bytes_to_otp, bytes_to_password, bytes_to_token,
    bytes_to_uuid_v4, password_strength, pick as pick_items, AlphabetSpec, OtpStyle, Strength,
};

const OTP_MAX_LENGTH: usize = 20;
const PASSWORD_MAX_LENGTH: usize = 128;
const TOKEN_MAX_LENGTH: usize = 256;
const KEY_MAX_LENGTH: usize = 64;
const MAX_PICK_ITEMS: usize = 256;

/// Clamp a requested length to a tool cap; lengths below one are the
/// caller's error, lengths above the cap are quietly reduced.
fn clamp_length(requested: usize, cap: usize) -> Result<usize, ApiError> {
    if requested < 1 {
        return Err(ApiError::Invalid(
            "length must be at least 1".to_string(),
        ));
    }
    Ok(requested.min(cap))
}

#[derive(Debug, Deserialize)]
pub struct OtpQuery {
    length: Option<usize>,
    #[serde(rename = "type")]
    style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OtpResponse {
    otp: String,
    length: usize,
    #[serde(rename = "type")]
    style: &'static str,
    entropy: &'static str,
    source: &'static str,
}

pub async fn otp(
    State(state): State<AppState>,
    Query(query): Query<OtpQuery>,
) -> Result<Json<OtpResponse>, ApiError> {
    let length = clamp_length(query.length.unwrap_or(6), OTP_MAX_LENGTH)?;
    let style = OtpStyle::from_query(query.style.as_deref().unwrap_or("numeric"));
    let draw = state.source.fetch(length).await?;
    let otp = bytes_to_otp(&draw.bytes, length, style)?;
    Ok(Json(OtpResponse {
        otp,
        length,
        style: style.label(),
        entropy: draw.provenance.entropy_label(),
        source: draw.provenance.source_label(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PasswordQuery {
    length: Option<usize>,
    uppercase: Option<bool>,
    lowercase: Option<bool>,
    numbers: Option<bool>,
    symbols: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PasswordResponse {
    password: String,
    strength: Strength,
    length: usize,
    entropy: &'static str,
    source: &'static str,
}

pub async fn password(
    State(state): State<AppState>,
    Query(query): Query<PasswordQuery>,
) -> Result<Json<PasswordResponse>, ApiError> {
    let length = clamp_length(query.length.unwrap_or(16), PASSWORD_MAX_LENGTH)?;
    let spec = AlphabetSpec {
        uppercase: query.uppercase.unwrap_or(true),
        lowercase: query.lowercase.unwrap_or(true),
        digits: query.numbers.unwrap_or(true),
        symbols: query.symbols.unwrap_or(true),
    };
    let draw = state.source.fetch(length).await?;
    let password = bytes_to_password(&draw.bytes, &spec.charset())?;
    let strength = password_strength(&password);
    Ok(Json(PasswordResponse {
        password,
        strength,
        length,
        entropy: draw.provenance.entropy_label(),
        source: draw.provenance.source_label(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UuidQuery {
    format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UuidResponse {
    id: String,
    format: String,
    entropy: &'static str,
    source: &'static str,
}

pub async fn uuid(
    State(state): State<AppState>,
    Query(query): Query<UuidQuery>,
) -> Result<Json<UuidResponse>, ApiError> {
    let draw = state.source.fetch(16).await?;
    let bytes: [u8; 16] = draw
        .bytes
        .as_slice()
        .try_into()
        .map_err(|_| ApiError::Internal("provider returned wrong byte count".to_string()))?;
    Ok(Json(UuidResponse {
        id: bytes_to_uuid_v4(bytes),
        format: query.format.unwrap_or_else(|| "uuid-v4".to_string()),
        entropy: draw.provenance.entropy_label(),
        source: draw.provenance.source_label(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    length: Option<usize>,
    prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    token: String,
    /// Total length including the prefix.
    length: usize,
    entropy: &'static str,
    source: &'static str,
}

pub async fn token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, ApiError> {
    let length = clamp_length(query.length.unwrap_or(32), TOKEN_MAX_LENGTH)?;
    let prefix = query.prefix.unwrap_or_default();
    let draw = state.source.fetch(length).await?;
    let token = bytes_to_token(&draw.bytes, &prefix)?;
    let total = token.chars().count();
    Ok(Json(TokenResponse {
        token,
        length: total,
        entropy: draw.provenance.entropy_label(),
        source: draw.provenance.source_label(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PickRequest {
    #[serde(default)]
    items: Vec<String>,
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PickResponse {
    selected: Vec<String>,
    count: usize,
    entropy: &'static str,
    source: &'static str,
}

pub async fn pick(
    State(state): State<AppState>,
    Json(request): Json<PickRequest>,
) -> Result<Json<PickResponse>, ApiError> {
    if request.items.is_empty() {
        return Err(ApiError::Invalid(
            "items must contain at least one candidate".to_string(),
        ));
    }
    if request.items.len() > MAX_PICK_ITEMS {
        return Err(ApiError::Invalid(format!(
            "at most {MAX_PICK_ITEMS} candidates are supported"
        )));
    }
    let count = request.count.unwrap_or(1);
    if count < 1 {
        return Err(ApiError::Invalid("count must be at least 1".to_string()));
    }
    let draw = state.source.fetch(request.items.len()).await?;
    let selected = pick_items(&request.items, count, &draw.bytes)?;
    Ok(Json(PickResponse {
        count: selected.len(),
        selected,
        entropy: draw.provenance.entropy_label(),
        source: draw.provenance.source_label(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    key: String,
    hex: String,
    bits: String,
    length: usize,
    entropy: &'static str,
    source: &'static str,
}

/// The interactive quantum-key pipeline: hex -> binary -> 6-bit chunks ->
/// Base62, exposed with its intermediate representations so clients can
/// show the conversion.
pub async fn key(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<KeyResponse>, ApiError> {
    let length = clamp_length(query.length.unwrap_or(12), KEY_MAX_LENGTH)?;
    // Fewest bytes whose bit expansion yields `length` 6-bit chunks.
    let byte_count = (length * 6 + 7) / 8;
    let draw = state.source.fetch(byte_count).await?;
    let key = bytes_to_key(&draw.bytes, length)?;
    Ok(Json(KeyResponse {
        key,
        hex: draw.as_hex(),
        bits: bytes_to_bits(&draw.bytes),
        length,
        entropy: draw.provenance.entropy_label(),
        source: draw.provenance.source_label(),
    }))
}

pub async fn unknown_action() -> ApiError {
    ApiError::UnknownAction
}
