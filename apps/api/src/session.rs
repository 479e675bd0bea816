use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

/// Header the auth gateway sets to the authenticated user's id.
pub const SESSION_USER_HEADER: &str = "x-user-id";

/// The authenticated caller. Authentication itself happens upstream; this
/// only reads the forwarded identity.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let user_id = Uuid::parse_str(raw.trim()).map_err(|_| AppError::Unauthorized)?;
        Ok(Session { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Session, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(SESSION_USER_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Session::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_user_id_header() {
        let id = Uuid::new_v4();
        let session = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(session.user_id, id);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_malformed_header_is_unauthorized() {
        assert!(matches!(
            extract(Some("not-a-uuid")).await,
            Err(AppError::Unauthorized)
        ));
    }
}
