//! Signed bearer tokens for logged-in users.

use cardvault_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scheme name returned by the login endpoint.
pub const TOKEN_TYPE: &str = "Bearer";

/// Payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Database id of the user.
    pub sub: DbId,
    pub username: String,
    pub role: String,
    /// Unix seconds.
    pub exp: i64,
    /// Unix seconds.
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl_secs` from now, with a fresh `jti`.
    pub fn for_user(user_id: DbId, username: &str, role: &str, ttl_secs: i64) -> Self {
        let issued_at = chrono::Utc::now().timestamp();
        Self {
            sub: user_id,
            username: username.to_owned(),
            role: role.to_owned(),
            exp: issued_at + ttl_secs,
            iat: issued_at,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// HS256 signing secret and token lifetime.
///
/// Loaded by `ServerConfig::from_env` from `JWT_SECRET` and
/// `JWT_ACCESS_EXPIRY_MINS`.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_mins: i64,
}

impl JwtConfig {
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_mins * 60
    }

    /// Sign an access token for the given account.
    pub fn issue(
        &self,
        user_id: DbId,
        username: &str,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims::for_user(user_id, username, role, self.ttl_secs());
        self.sign(&claims)
    }

    /// Decode `token`, rejecting bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &key, &Validation::default()).map(|data| data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            ttl_mins: 15,
        }
    }

    #[test]
    fn issued_token_carries_the_account() {
        let jwt = config("unit-test-signing-secret-0123456789");
        let token = jwt.issue(42, "admin", "admin").expect("issue");

        let claims = jwt.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn each_token_gets_its_own_jti() {
        let first = Claims::for_user(1, "user", "user", 60);
        let second = Claims::for_user(1, "user", "user", 60);
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn lapsed_token_is_rejected() {
        let jwt = config("unit-test-signing-secret-0123456789");
        // Negative lifetime puts `exp` beyond the 60 s validation leeway.
        let token = jwt
            .sign(&Claims::for_user(1, "user", "user", -300))
            .expect("sign");

        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn secret_mismatch_is_rejected() {
        let token = config("signer-a").issue(1, "user", "user").expect("issue");
        assert!(config("signer-b").verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(config("any").verify("not.a.jwt").is_err());
    }
}
