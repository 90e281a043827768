use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::CoreError;
use crate::server::response::ApiError;
use crate::services::authorization::Identity;

/// Identity headers injected by the gateway after it authenticates the
/// caller. Requests that reach this service without them are rejected.
pub const USER_HEADER: &str = "x-workbench-user";
pub const ORG_HEADER: &str = "x-workbench-org";

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError(CoreError::unauthorized("Missing caller identity")))?
            .to_string();

        let org_id = parts
            .headers
            .get(ORG_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(Identity { owner_id, org_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Identity, ApiError> {
        let (mut parts, _) = request.into_parts();
        Identity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_headers_become_identity() {
        let request = Request::builder()
            .header(USER_HEADER, "u1")
            .header(ORG_HEADER, "acme")
            .body(())
            .expect("request");

        let identity = extract(request).await.expect("identity");
        assert_eq!(identity.owner_id, "u1");
        assert_eq!(identity.org_id.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn test_missing_user_header_is_rejected() {
        let request = Request::builder().body(()).expect("request");
        let err = extract(request).await.expect_err("no identity");
        assert_eq!(err.0.kind(), crate::errors::CoreErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_blank_user_header_is_rejected() {
        let request = Request::builder()
            .header(USER_HEADER, "   ")
            .body(())
            .expect("request");
        assert!(extract(request).await.is_err());
    }
}
