use actix_web::{http::header, HttpRequest, HttpResponse};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Account role carried in the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

/// JWT claims issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Client id
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Role {0:?} is not allowed to perform this action")]
    Forbidden(Role),
}

impl AuthError {
    pub fn to_response(&self) -> HttpResponse {
        match self {
            AuthError::Forbidden(_) => HttpResponse::Forbidden().json(ErrorResponse::new(
                "Forbidden",
                self.to_string(),
                403,
            )),
            _ => HttpResponse::Unauthorized().json(ErrorResponse::new(
                "Unauthorized",
                self.to_string(),
                401,
            )),
        }
    }
}

/// HS256 bearer token validator
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Validate the request's bearer token and check its role
    pub fn authorize(&self, req: &HttpRequest, allowed: &[Role]) -> Result<Claims, AuthError> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let claims = self.decode(token.trim())?;

        if !allowed.contains(&claims.role) {
            tracing::info!("Client {} with role {:?} denied", claims.sub, claims.role);
            return Err(AuthError::Forbidden(claims.role));
        }

        Ok(claims)
    }
}
