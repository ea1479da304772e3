use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

use orgguard_infra::{EntityKind, Session};
use uuid::Uuid;

use crate::app::routes::common::{reply, reply_with_message};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::middleware::TOKEN_COOKIE;

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignUpRequest>,
) -> axum::response::Response {
    reply(StatusCode::CREATED, services.directory.sign_up_org(body.into()).await)
}

/// POST /auth/login/root - org account sign-in
pub async fn login_org(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::OrgCredentials>,
) -> axum::response::Response {
    match services.directory.sign_in_org(&body.email, &body.password).await {
        Ok(session) => session_response(session),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /auth/login - user sign-in, scoped to an org
pub async fn login_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::UserCredentials>,
) -> axum::response::Response {
    match services
        .directory
        .sign_in_user(body.org_id, &body.username, &body.password)
        .await
    {
        Ok(session) => session_response(session),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reactivate(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::OrgCredentials>,
) -> axum::response::Response {
    reply_with_message(
        "Account reactivated",
        "account",
        services.directory.reactivate_org(&body.email, &body.password).await,
    )
}

pub async fn logout() -> axum::response::Response {
    let cookie = format!("{TOKEN_COOKIE}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax");
    with_cookie(
        (StatusCode::OK, Json(serde_json::json!({ "message": "Logged out" }))).into_response(),
        &cookie,
    )
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> axum::response::Response {
    reply(StatusCode::OK, services.directory.me(ctx.principal()).await)
}

/// DELETE /auth/:id - deactivate the org account; the sweeps finish the job
pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: Uuid = match errors::parse_id(&id, "account") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    reply_with_message(
        "Account deactivated. It will be marked deleted in 5 days and its data deleted after 45 days.",
        "account",
        services
            .lifecycle
            .delete(ctx.principal(), EntityKind::Org, id)
            .await,
    )
}

/// PUT /auth/password - the org account's own password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::PasswordRequest>,
) -> axum::response::Response {
    let result = services
        .directory
        .change_org_password(ctx.principal(), ctx.tenant_id(), body.into())
        .await
        .map(|()| serde_json::json!({ "message": "Password updated" }));
    reply(StatusCode::OK, result)
}

fn session_response(session: Session) -> axum::response::Response {
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = format!(
        "{TOKEN_COOKIE}={}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax",
        session.token
    );
    with_cookie((StatusCode::OK, Json(session)).into_response(), &cookie)
}

fn with_cookie(mut resp: axum::response::Response, cookie: &str) -> axum::response::Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            resp.headers_mut().insert(header::SET_COOKIE, value);
            resp
        }
        Err(_) => errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error"),
    }
}
