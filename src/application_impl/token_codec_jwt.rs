use crate::application_port::*;
use crate::domain_model::UserId;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretSlice};
use serde::{Deserialize, Serialize};

/// `iss` claim stamped on and required from every access token.
pub const TOKEN_ISSUER: &str = "ika-access";

const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
const ACCEPTED_ALGORITHM_NAMES: [&str; 3] = ["HS256", "HS384", "HS512"];

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    iss: String,
    sub: String, // user id as string
    #[serde(default)]
    iat: i64,
    exp: i64,
    #[serde(default)]
    jti: String,
}

/// Sign a token for `subject` that expires `ttl` from now. A negative `ttl`
/// yields an already expired token.
pub fn issue_token(
    subject: UserId,
    secret: &[u8],
    ttl: Duration,
) -> Result<IssuedAccessToken, TokenError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + ttl;
    let claims = AccessClaims {
        iss: TOKEN_ISSUER.to_string(),
        sub: subject.to_string(),
        iat: iat_dt.timestamp(),
        exp: exp_dt.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok(IssuedAccessToken {
        token: AccessToken(token),
        expires_at: exp_dt,
    })
}

/// Check signature, algorithm family, issuer and expiry, then return the subject.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<UserId, TokenError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    v.validate_exp = true;
    v.leeway = 0;
    v.set_issuer(&[TOKEN_ISSUER]);
    v.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(secret), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::UnexpectedAlgorithm,
            _ => match declared_algorithm(token) {
                Some(alg) if !ACCEPTED_ALGORITHM_NAMES.contains(&alg.as_str()) => {
                    TokenError::UnexpectedAlgorithm
                }
                _ => TokenError::Malformed,
            },
        })?;

    // jsonwebtoken only rejects `exp < now`; a token is dead from its exp second on.
    if data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    data.claims
        .sub
        .parse::<UserId>()
        .map_err(|_| TokenError::MalformedSubject)
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// The `alg` a token claims, read straight from its header segment. jsonwebtoken
/// refuses to parse headers naming `none` or an unknown algorithm.
fn declared_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes).ok()?.alg
}

pub struct JwtHs256Codec {
    signing_key: SecretSlice<u8>,
    access_ttl: Duration,
}

impl JwtHs256Codec {
    pub fn new(signing_key: SecretSlice<u8>, access_ttl: Duration) -> Self {
        JwtHs256Codec {
            signing_key,
            access_ttl,
        }
    }
}

impl TokenCodec for JwtHs256Codec {
    fn issue_access_token(&self, subject: UserId) -> Result<IssuedAccessToken, TokenError> {
        issue_token(subject, self.signing_key.expose_secret(), self.access_ttl)
    }

    fn verify_access_token(&self, token: &str) -> Result<UserId, TokenError> {
        verify_token(token, self.signing_key.expose_secret())
    }
}
