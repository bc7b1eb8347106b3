use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;

use crate::app::auth::AccessTokenVerifier;
use crate::http::AppError;
use crate::AppState;

/// The acting user, resolved from the bearer access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

        let verifier = AccessTokenVerifier::new(state.paseto_access_key, state.token_issuer.clone());
        let session = verifier.authenticate(token).map_err(|err| {
            tracing::warn!(error = ?err, "access token carried an unusable subject");
            AppError::unauthorized("invalid token")
        })?;

        let session = session.ok_or_else(|| AppError::unauthorized("invalid token"))?;
        Ok(AuthUser {
            user_id: session.user_id,
        })
    }
}
