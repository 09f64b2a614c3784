//! Short-lived signed access tokens (HS256 JWT).
//!
//! Nothing is persisted: a token is valid iff its signature checks out against
//! the standing secret and its `exp` has not passed.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SigningSecret;
use crate::services::auth::error::AuthError;

pub const TOKEN_ISSUER: &str = "content-api";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessTokenError {
    #[error("signature does not match")]
    BadSignature,

    #[error("token is not a well-formed JWT")]
    BadFormat,

    #[error("token expired")]
    Expired,

    #[error("subject is not a user id")]
    BadSubject,

    #[error("ttl must be positive")]
    InvalidTtl,

    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<AccessTokenError> for AuthError {
    fn from(e: AccessTokenError) -> Self {
        match e {
            AccessTokenError::BadSignature => AuthError::BadSignature,
            AccessTokenError::Expired => AuthError::Expired,
            AccessTokenError::BadFormat | AccessTokenError::BadSubject => {
                AuthError::MalformedCredential
            }
            AccessTokenError::InvalidTtl | AccessTokenError::Signing(_) => {
                AuthError::Internal(e.to_string())
            }
        }
    }
}

/// Mint a token for `user_id` valid for `ttl` from now.
pub fn issue(
    user_id: Uuid,
    secret: &SigningSecret,
    ttl: Duration,
) -> Result<String, AccessTokenError> {
    issue_at(user_id, secret, ttl, Utc::now())
}

/// [`issue`] with an explicit clock.
pub fn issue_at(
    user_id: Uuid,
    secret: &SigningSecret,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, AccessTokenError> {
    if ttl <= Duration::zero() {
        return Err(AccessTokenError::InvalidTtl);
    }

    let iat = now.timestamp();
    // whole seconds; a sub-second ttl would otherwise produce exp == iat
    let exp = iat + ttl.num_seconds().max(1);

    let claims = AccessTokenClaims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat,
        exp,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AccessTokenError::Signing(e.to_string()))
}

/// Check a token and return the user id it was minted for.
pub fn validate(token: &str, secret: &SigningSecret) -> Result<Uuid, AccessTokenError> {
    validate_at(token, secret, Utc::now())
}

/// [`validate`] with an explicit clock.
///
/// Order: structure, signature, claims, expiry, subject.
pub fn validate_at(
    token: &str,
    secret: &SigningSecret,
    now: DateTime<Utc>,
) -> Result<Uuid, AccessTokenError> {
    check_structure(token)?;

    let mut validation = Validation::new(Algorithm::HS256);
    // expiry is compared against the injected clock below, without leeway
    validation.validate_exp = false;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let data = jsonwebtoken::decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        // header and payload already decoded, so a base64 error is the signature's
        ErrorKind::InvalidSignature | ErrorKind::Base64(_) => AccessTokenError::BadSignature,
        _ => AccessTokenError::BadFormat,
    })?;

    let claims = data.claims;
    if now.timestamp() > claims.exp {
        return Err(AccessTokenError::Expired);
    }

    Uuid::parse_str(&claims.sub).map_err(|_| AccessTokenError::BadSubject)
}

// Three segments, with a decodable header and payload. The signature segment
// is left to the verifier so any damage there reads as a bad signature.
fn check_structure(token: &str) -> Result<(), AccessTokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(AccessTokenError::BadFormat);
    };

    let header = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AccessTokenError::BadFormat)?;
    serde_json::from_slice::<Header>(&header).map_err(|_| AccessTokenError::BadFormat)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AccessTokenError::BadFormat)?;
    serde_json::from_slice::<AccessTokenClaims>(&payload)
        .map_err(|_| AccessTokenError::BadFormat)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn secret(s: &str) -> SigningSecret {
        SigningSecret::new(s).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn decode_claims(token: &str, key: &SigningSecret) -> AccessTokenClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(key.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn issued_token_validates_to_same_user() {
        let key = secret("top-secret");
        let user_id = Uuid::new_v4();

        let token = issue(user_id, &key, Duration::hours(1)).unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(validate(&token, &key).unwrap(), user_id);
    }

    #[test]
    fn claims_carry_issuer_and_future_expiry() {
        let key = secret("top-secret");
        let user_id = Uuid::new_v4();

        let token = issue_at(user_id, &key, Duration::seconds(60), t0()).unwrap();
        let claims = decode_claims(&token, &key);

        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iat, t0().timestamp());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_bad_signature() {
        let token = issue(Uuid::new_v4(), &secret("right"), Duration::hours(1)).unwrap();

        assert_eq!(
            validate(&token, &secret("wrong")),
            Err(AccessTokenError::BadSignature)
        );
    }

    fn replace_char(token: &str, at: usize, with: char) -> String {
        let mut out = token.to_string();
        out.replace_range(at..at + 1, &with.to_string());
        out
    }

    #[test]
    fn altered_signature_is_bad_signature() {
        let key = secret("top-secret");
        let token = issue(Uuid::new_v4(), &key, Duration::hours(1)).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for at in sig_start..token.len() {
            let original = token.as_bytes()[at];
            let swapped = if original == b'A' { 'B' } else { 'A' };

            // in-alphabet swap (the last char only carries padding bits for some swaps)
            assert_eq!(
                validate(&replace_char(&token, at, swapped), &key),
                Err(AccessTokenError::BadSignature),
                "swap at {at}"
            );
            // outside the base64url alphabet
            assert_eq!(
                validate(&replace_char(&token, at, '*'), &key),
                Err(AccessTokenError::BadSignature),
                "'*' at {at}"
            );
        }
    }

    #[test]
    fn damaged_payload_segment_is_bad_format() {
        let key = secret("top-secret");
        let token = issue(Uuid::new_v4(), &key, Duration::hours(1)).unwrap();
        let payload_start = token.find('.').unwrap() + 1;

        assert_eq!(
            validate(&replace_char(&token, payload_start, '*'), &key),
            Err(AccessTokenError::BadFormat)
        );
    }

    #[test]
    fn expiry_boundary() {
        let key = secret("top-secret");
        let user_id = Uuid::new_v4();
        let token = issue_at(user_id, &key, Duration::seconds(60), t0()).unwrap();

        let just_before = t0() + Duration::seconds(59);
        let exactly = t0() + Duration::seconds(60);
        let after = t0() + Duration::seconds(61);

        assert_eq!(validate_at(&token, &key, just_before), Ok(user_id));
        assert_eq!(validate_at(&token, &key, exactly), Ok(user_id));
        assert_eq!(
            validate_at(&token, &key, after),
            Err(AccessTokenError::Expired)
        );
    }

    #[test]
    fn non_uuid_subject_is_bad_subject() {
        let key = secret("top-secret");
        let claims = AccessTokenClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: "not-a-uuid".to_string(),
            iat: t0().timestamp(),
            exp: (t0() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            validate_at(&token, &key, t0()),
            Err(AccessTokenError::BadSubject)
        );
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let key = secret("top-secret");
        let claims = AccessTokenClaims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: t0().timestamp(),
            exp: (t0() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            validate_at(&token, &key, t0()),
            Err(AccessTokenError::BadFormat)
        );
    }

    #[test]
    fn garbage_is_bad_format() {
        let key = secret("top-secret");

        for token in ["", "abc", "abc.def", "a.b.c.d", "not a token"] {
            assert_eq!(
                validate(token, &key),
                Err(AccessTokenError::BadFormat),
                "token: {token:?}"
            );
        }
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let key = secret("top-secret");

        assert_eq!(
            issue(Uuid::new_v4(), &key, Duration::zero()),
            Err(AccessTokenError::InvalidTtl)
        );
        assert_eq!(
            issue(Uuid::new_v4(), &key, Duration::seconds(-5)),
            Err(AccessTokenError::InvalidTtl)
        );
    }
}
