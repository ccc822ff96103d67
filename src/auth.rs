//! Request identity and authorization checks.
//!
//! The identity provider is an external collaborator: the gateway in front
//! of this service authenticates the caller and asserts `x-user-id` and
//! `x-user-role` on every request. This service only consumes that pair;
//! credentials and token mechanics never reach it.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::Error;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub is_admin: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| Error::unauthorized("User is unauthorized"))?;
        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);
        Ok(Self { id, is_admin })
    }
}

/// Catalog mutation and "my products" listings are admin-only.
pub fn require_admin(user: &AuthUser) -> Result<(), Error> {
    if user.is_admin {
        Ok(())
    } else {
        Err(Error::forbidden("Access denied, admin only"))
    }
}
