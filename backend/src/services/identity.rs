use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::constants::{SECURETOKEN_ISSUER_PREFIX, SECURETOKEN_JWKS_URL};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid identity token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token has no usable key id")]
    MissingKeyId,

    #[error("token key id {0} not present in the provider key set")]
    UnknownKeyId(String),

    #[error("token has no subject")]
    MissingSubject,

    #[error("failed to fetch provider keys")]
    KeyFetch(#[from] reqwest::Error),
}

/// Subject and profile claims of a verified identity token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// One RSA public key of the provider's JWK set.
#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// Verifies externally issued RS256 ID tokens against one identity project.
///
/// Two instances run in the app: one trusting the end-user project and one
/// trusting the administrator project, so the two credential populations
/// stay isolated. Decoding keys are cached and refreshed whenever a token
/// arrives signed with an unknown key id (provider keys rotate).
pub struct IdentityProvider {
    client: Client,
    project_id: String,
    jwks_url: String,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl IdentityProvider {
    pub fn new(project_id: String) -> Self {
        Self {
            client: Client::new(),
            project_id,
            jwks_url: SECURETOKEN_JWKS_URL.to_string(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Expected `iss` claim for this trust domain.
    pub fn issuer(&self) -> String {
        format!("{SECURETOKEN_ISSUER_PREFIX}{}", self.project_id)
    }

    pub async fn verify(&self, token: &str) -> Result<IdentityClaims, IdentityError> {
        let header = decode_header(token).map_err(IdentityError::InvalidToken)?;
        let kid = header.kid.ok_or(IdentityError::MissingKeyId)?;

        let key = match self.cached_key(&kid).await {
            Some(key) => key,
            None => {
                self.refresh_keys().await?;
                self.cached_key(&kid)
                    .await
                    .ok_or_else(|| IdentityError::UnknownKeyId(kid.clone()))?
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer()]);

        let data = decode::<IdentityClaims>(token, &key, &validation)
            .map_err(IdentityError::InvalidToken)?;

        if data.claims.sub.is_empty() {
            return Err(IdentityError::MissingSubject);
        }

        Ok(data.claims)
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn refresh_keys(&self) -> Result<(), IdentityError> {
        let jwks: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = self.keys.write().await;
        keys.clear();
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(err) => {
                    tracing::warn!(kid = %jwk.kid, error = ?err, "skipping unparsable provider key");
                }
            }
        }

        tracing::debug!(count = keys.len(), project = %self.project_id, "refreshed identity keys");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_tokens_are_rejected_before_any_network_io() {
        let provider = IdentityProvider::new("retronova-users".into());
        let err = provider.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken(_)));
    }

    #[test]
    fn issuer_is_scoped_to_the_project() {
        let provider = IdentityProvider::new("retronova-admins".into());
        assert_eq!(
            provider.issuer(),
            "https://securetoken.google.com/retronova-admins"
        );
    }
}
