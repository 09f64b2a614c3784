//! `Authorization` header parsing.
//!
//! Only the shape is checked here (`<scheme> <credential>`); whether the
//! credential is any good is up to the token services.

use axum::http::{HeaderMap, header};
use thiserror::Error;

use crate::services::auth::error::AuthError;

pub const BEARER: &str = "Bearer";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("missing authorization header")]
    Missing,

    #[error("malformed authorization header")]
    Malformed,
}

impl From<BearerError> for AuthError {
    fn from(e: BearerError) -> Self {
        match e {
            BearerError::Missing => AuthError::MissingCredential,
            BearerError::Malformed => AuthError::MalformedCredential,
        }
    }
}

/// Extract the token from `Bearer <token>`.
///
/// Any run of whitespace separates the two fields, and surrounding whitespace
/// is ignored. The scheme name is case-sensitive.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, BearerError> {
    extract_scheme(header, BEARER)
}

/// Same contract as [`extract_bearer`] for an arbitrary scheme name.
pub fn extract_scheme<'a>(header: Option<&'a str>, scheme: &str) -> Result<&'a str, BearerError> {
    let value = header.ok_or(BearerError::Missing)?;

    let mut fields = value.split_whitespace();
    let (Some(found_scheme), credential, None) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(BearerError::Malformed);
    };

    if found_scheme != scheme {
        return Err(BearerError::Malformed);
    }

    match credential {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(BearerError::Malformed),
    }
}

/// Read the `Authorization` header and extract a bearer token from it.
pub fn token_from_headers(headers: &HeaderMap) -> Result<&str, BearerError> {
    extract_bearer(authorization(headers)?)
}

/// Raw `Authorization` value. Non-UTF-8 values are malformed, absence is `Ok(None)`.
pub fn authorization(headers: &HeaderMap) -> Result<Option<&str>, BearerError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| BearerError::Malformed))
        .transpose()
}
