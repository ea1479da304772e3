use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post, put},
};

use orgguard_accounts::Association;
use orgguard_core::UserId;
use orgguard_infra::EntityKind;

use crate::app::routes::common::{reply, reply_with_message};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(rename).delete(delete_one))
        .route("/:id/deactivate", post(deactivate))
        .route("/:id/reactivate", post(reactivate))
        .route("/:id/password", put(change_password))
        .route("/:id/roles", post(add_role).delete(remove_role))
        .route("/:id/groups", post(add_group).delete(remove_group))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> axum::response::Response {
    reply(StatusCode::OK, services.directory.list_users(ctx.principal()).await)
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    reply(
        StatusCode::CREATED,
        services.directory.create_user(ctx.principal(), body.into()).await,
    )
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply(StatusCode::OK, services.directory.get_user(ctx.principal(), id).await)
}

async fn rename(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply(
        StatusCode::OK,
        services
            .directory
            .rename_user(ctx.principal(), id, &body.username)
            .await,
    )
}

async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply_with_message(
        "User deleted",
        "user",
        services
            .lifecycle
            .delete(ctx.principal(), EntityKind::User, id.into())
            .await,
    )
}

async fn deactivate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply_with_message(
        "User deactivated. User can be reactivated. User data will be deleted after 30 days.",
        "user",
        services
            .lifecycle
            .deactivate(ctx.principal(), EntityKind::User, id.into())
            .await,
    )
}

async fn reactivate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply_with_message(
        "User reactivated",
        "user",
        services
            .lifecycle
            .reactivate(ctx.principal(), EntityKind::User, id.into())
            .await,
    )
}

async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::PasswordRequest>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = services
        .directory
        .change_user_password(ctx.principal(), id, body.into())
        .await
        .map(|()| serde_json::json!({ "message": "Password updated" }));
    reply(StatusCode::OK, result)
}

// ─────────────────────────────────────────────────────────────────────────────
// Memberships
// ─────────────────────────────────────────────────────────────────────────────

async fn add_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RoleRef>,
) -> axum::response::Response {
    let user: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let role = match body.lookup() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "Role added to user",
        "user",
        services
            .membership
            .add(ctx.principal(), Association::RoleToUser { user, role })
            .await,
    )
}

async fn remove_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RoleRef>,
) -> axum::response::Response {
    let user: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let role = match body.lookup() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "Role removed from user",
        "user",
        services
            .membership
            .remove(ctx.principal(), Association::RoleToUser { user, role })
            .await,
    )
}

async fn add_group(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::GroupRef>,
) -> axum::response::Response {
    let user: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let group = match body.lookup() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "User added to group",
        "user",
        services
            .membership
            .add(ctx.principal(), Association::GroupToUser { user, group })
            .await,
    )
}

async fn remove_group(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::GroupRef>,
) -> axum::response::Response {
    let user: UserId = match errors::parse_id(&id, "user") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let group = match body.lookup() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "User removed from group",
        "user",
        services
            .membership
            .remove(ctx.principal(), Association::GroupToUser { user, group })
            .await,
    )
}
