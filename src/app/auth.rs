use anyhow::{anyhow, Result};
use mongodb::bson::oid::ObjectId;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: ObjectId,
}

/// Checks access tokens minted by the account service. Tokens are PASETO
/// v4.local, sealed with the shared access key, and carry the user id in `sub`.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    access_key: [u8; 32],
    issuer: String,
}

impl AccessTokenVerifier {
    pub fn new(access_key: [u8; 32], issuer: impl Into<String>) -> Self {
        Self {
            access_key,
            issuer: issuer.into(),
        }
    }

    pub fn authenticate(&self, token: &str) -> Result<Option<AuthSession>> {
        let claims = match self.decrypt_claims(token)? {
            Some(claims) => claims,
            None => return Ok(None),
        };
        if !has_token_type(&claims, "access") {
            return Ok(None);
        }
        let user_id = claim_object_id(&claims, "sub")?;
        Ok(Some(AuthSession { user_id }))
    }

    fn decrypt_claims(&self, token: &str) -> Result<Option<Claims>> {
        let key = SymmetricKey::<V4>::from(&self.access_key)?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(&self.issuer);
        rules.validate_audience_with(&self.issuer);

        let untrusted = match UntrustedToken::<Local, V4>::try_from(token) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let trusted = match local::decrypt(&key, &untrusted, &rules, None, None) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        Ok(trusted.payload_claims().cloned())
    }
}

fn claim_object_id(claims: &Claims, name: &str) -> Result<ObjectId> {
    let value = claims
        .get_claim(name)
        .and_then(|value| value.as_str())
        .ok_or_else(|| anyhow!("missing {} claim", name))?;
    Ok(ObjectId::parse_str(value)?)
}

fn has_token_type(claims: &Claims, expected: &str) -> bool {
    claims
        .get_claim("typ")
        .and_then(|value| value.as_str())
        .map(|value| value == expected)
        .unwrap_or(false)
}
