//! Google Sign-In ID token verification.
//!
//! ID tokens are RS256 JWTs signed with Google's rotating keys. Keys are
//! fetched from the JWKS endpoint, cached, and refetched when a token names
//! an unknown key id.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use quill_core::ports::{AuthError, IdentityVerifier, VerifiedIdentity};

const DEFAULT_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const KEYS_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client id; ID tokens must name it as their audience.
    pub client_id: String,
    pub certs_url: String,
    pub timeout: Duration,
}

impl GoogleConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            certs_url: DEFAULT_CERTS_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// `None` when `GOOGLE_CLIENT_ID` is unset or empty.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())?;
        let mut config = Self::new(client_id.trim());
        if let Ok(url) = std::env::var("GOOGLE_CERTS_URL") {
            if !url.is_empty() {
                config.certs_url = url;
            }
        }
        Some(config)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: String,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Option<Instant>,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        match self.fetched_at {
            Some(at) => at.elapsed() < KEYS_TTL,
            // Pinned keys never expire.
            None => true,
        }
    }
}

pub struct GoogleIdTokenVerifier {
    client: reqwest::Client,
    config: GoogleConfig,
    keys: RwLock<Option<CachedKeys>>,
    pinned: bool,
}

impl GoogleIdTokenVerifier {
    pub fn new(config: GoogleConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            config,
            keys: RwLock::new(None),
            pinned: false,
        })
    }

    /// Verifier that trusts a fixed key set and never goes to the network.
    pub fn with_keys(config: GoogleConfig, keys: JwkSet) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            keys: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: None,
            })),
            pinned: true,
        }
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.config.certs_url)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Fetching sign-in keys failed");
            return Err(AuthError::ProviderUnavailable(format!(
                "key endpoint returned {status}"
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))
    }

    /// Decoding key for `kid`, refreshing the cache when stale or when the
    /// key id is unknown.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cached = self.keys.read().await;
            if let Some(cached) = cached.as_ref().filter(|c| c.is_fresh()) {
                if let Some(jwk) = cached.keys.find(kid) {
                    return DecodingKey::from_jwk(jwk)
                        .map_err(|e| AuthError::InvalidToken(e.to_string()));
                }
            }
        }

        if self.pinned {
            return Err(AuthError::InvalidToken("Unknown signing key".to_string()));
        }

        let keys = self.fetch_keys().await?;
        tracing::debug!(count = keys.keys.len(), "Refreshed sign-in keys");
        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        *self.keys.write().await = Some(CachedKeys {
            keys,
            fetched_at: Some(Instant::now()),
        });

        key.ok_or_else(|| AuthError::InvalidToken("Unknown signing key".to_string()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.client_id]);
        validation.set_issuer(&ISSUERS);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(id_token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("ID token has no key id".to_string()))?;
        let key = self.decoding_key(&kid).await?;

        let data = decode::<GoogleClaims>(id_token, &key, &self.validation()).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if !claims.email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        Ok(VerifiedIdentity {
            email: claims.email.trim().to_lowercase(),
            name: claims.name.filter(|n| !n.trim().is_empty()),
            picture: claims.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const CLIENT_ID: &str = "quill-web.apps.googleusercontent.com";

    fn verifier() -> GoogleIdTokenVerifier {
        let modulus = include_str!("testdata/rs256_modulus.txt").trim();
        let keys: JwkSet = serde_json::from_value(json!({
            "keys": [{
                "kty": "RSA",
                "kid": "test-key",
                "alg": "RS256",
                "use": "sig",
                "n": modulus,
                "e": "AQAB"
            }]
        }))
        .unwrap();
        GoogleIdTokenVerifier::with_keys(GoogleConfig::new(CLIENT_ID), keys)
    }

    fn sign(claims: serde_json::Value, kid: &str) -> String {
        let key = EncodingKey::from_rsa_pem(include_bytes!("testdata/rs256_private.pem")).unwrap();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, &claims, &key).unwrap()
    }

    fn claims(aud: &str, verified: bool, exp_offset: i64) -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": "https://accounts.google.com",
            "aud": aud,
            "sub": "1098765",
            "email": "Writer@Clavr.me",
            "email_verified": verified,
            "name": "Wren Writer",
            "picture": "https://example.com/w.png",
            "iat": now,
            "exp": now + exp_offset
        })
    }

    #[tokio::test]
    async fn test_valid_token_yields_identity() {
        let token = sign(claims(CLIENT_ID, true, 3600), "test-key");
        let identity = verifier().verify(&token).await.unwrap();

        assert_eq!(identity.email, "writer@clavr.me");
        assert_eq!(identity.name.as_deref(), Some("Wren Writer"));
        assert_eq!(identity.picture.as_deref(), Some("https://example.com/w.png"));
    }

    #[tokio::test]
    async fn test_token_for_another_client_is_rejected() {
        let token = sign(claims("someone-else", true, 3600), "test-key");
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_unverified_email_is_rejected() {
        let token = sign(claims(CLIENT_ID, false, 3600), "test-key");
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::EmailNotVerified)
        ));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let token = sign(claims(CLIENT_ID, true, -3600), "test-key");
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_unknown_key_id_is_rejected() {
        let token = sign(claims(CLIENT_ID, true, 3600), "rotated-away");
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_hmac_token_is_rejected() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("test-key".to_string());
        let token = encode(
            &header,
            &claims(CLIENT_ID, true, 3600),
            &EncodingKey::from_secret(b"shared"),
        )
        .unwrap();
        assert!(verifier().verify(&token).await.is_err());
    }
}
