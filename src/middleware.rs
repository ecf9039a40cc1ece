use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::env;

/// Middleware enforcing the optional shared-secret Authorization header
///
/// If the `AUTHORIZATION` environment variable is set to a non-empty value,
/// every request must carry an `Authorization` header with exactly that
/// value. When the variable is unset or empty, the check is skipped entirely.
///
/// The external delivery notifier authenticates through this same header; it
/// is a deployment-level shared secret, not a per-user credential (ownership
/// is enforced per request via the explicit `user_id` parameter).
pub async fn auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    if let Ok(auth_secret) = env::var("AUTHORIZATION") {
        if !auth_secret.is_empty() {
            let unauthorized_response = || {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "Unauthorized",
                        "message": "Invalid or missing authorization header"
                    })),
                )
                    .into_response()
            };

            match headers.get("Authorization") {
                Some(header_value) => match header_value.to_str() {
                    Ok(header_str) => {
                        if header_str != auth_secret {
                            return Err(unauthorized_response());
                        }
                    }
                    Err(_) => return Err(unauthorized_response()),
                },
                None => return Err(unauthorized_response()),
            }
        }
    }

    Ok(next.run(request).await)
}
