use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use quill_persist::Principal;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORGANIZATION_IDS_HEADER: &str = "x-organization-ids";

/// Caller identity taken from headers set by the upstream auth gateway
///
/// `x-user-id` is required; `x-organization-ids` is a comma-separated list.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("{} header is required", USER_ID_HEADER)))?;

        let organizations: Vec<String> = parts
            .headers
            .get(ORGANIZATION_IDS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Caller(Principal::new(user_id).with_organizations(organizations)))
    }
}
