//! JWT token handling

use crate::config::JwtConfig;
use crate::domain::{Role, StringUuid};
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Claims carried by both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// `None` only for platform super admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub role: Role,
    /// Token type discriminator (prevents token confusion attacks)
    #[serde(default)]
    pub token_type: String,
    pub iss: String,
    /// Unique token id, so pairs issued within the same second still differ
    #[serde(default)]
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Who a token pair is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: StringUuid,
    pub email: String,
    pub tenant_id: Option<StringUuid>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT token manager. Access and refresh tokens are signed with distinct
/// secrets and carry distinct expirations.
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    access: std::sync::Arc<KeyPair>,
    refresh: std::sync::Arc<KeyPair>,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let access = std::sync::Arc::new(KeyPair::from_secret(&config.access_secret));
        let refresh = std::sync::Arc::new(KeyPair::from_secret(&config.refresh_secret));
        Self {
            config,
            access,
            refresh,
        }
    }

    /// Create a Validation with a strict leeway (5 seconds) instead of the default 60 seconds.
    fn strict_validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 5;
        v.set_issuer(&[&self.config.issuer]);
        v.set_required_spec_claims(&["exp", "iss", "sub"]);
        v
    }

    fn sign(
        &self,
        subject: &TokenSubject,
        token_type: &str,
        ttl_secs: i64,
        key: &EncodingKey,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_secs);

        let claims = Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            tenant_id: subject.tenant_id.map(|t| t.to_string()),
            role: subject.role,
            token_type: token_type.to_string(),
            iss: self.config.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| AppError::Internal(e.into()))
    }

    fn verify(&self, token: &str, expected_type: &str, key: &DecodingKey) -> Result<Claims> {
        let token_data = decode::<Claims>(token, key, &self.strict_validation())?;
        if token_data.claims.token_type != expected_type {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }
        Ok(token_data.claims)
    }

    /// Issue a fresh access/refresh pair
    pub fn issue_token_pair(&self, subject: &TokenSubject) -> Result<TokenPair> {
        let access_token = self.sign(
            subject,
            ACCESS_TOKEN_TYPE,
            self.config.access_token_ttl_secs,
            &self.access.encoding,
        )?;
        let refresh_token = self.sign(
            subject,
            REFRESH_TOKEN_TYPE,
            self.config.refresh_token_ttl_secs,
            &self.refresh.encoding,
        )?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        self.verify(token, ACCESS_TOKEN_TYPE, &self.access.decoding)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims> {
        self.verify(token, REFRESH_TOKEN_TYPE, &self.refresh.decoding)
    }

    pub fn access_token_ttl(&self) -> i64 {
        self.config.access_token_ttl_secs
    }
}
