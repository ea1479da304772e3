use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use orgguard_accounts::Association;
use orgguard_core::GroupId;

use crate::app::routes::common::{decision, reply, reply_with_message};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/roles", post(add_role).delete(remove_role))
        .route("/check", post(check))
        .route("/:id", get(get_one).delete(delete_one))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> axum::response::Response {
    reply(StatusCode::OK, services.catalog.list_groups(ctx.principal()).await)
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateGuardedRequest>,
) -> axum::response::Response {
    reply(
        StatusCode::CREATED,
        services
            .catalog
            .create_group(ctx.principal(), &body.name, &body.role_ids)
            .await,
    )
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: GroupId = match errors::parse_id(&id, "group") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply(StatusCode::OK, services.catalog.get_group(ctx.principal(), id).await)
}

async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: GroupId = match errors::parse_id(&id, "group") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply_with_message(
        "Group deleted",
        "group",
        services.catalog.delete_group(ctx.principal(), id).await,
    )
}

async fn add_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::GroupRoleRequest>,
) -> axum::response::Response {
    let association = match (body.group.lookup(), body.role.lookup()) {
        (Ok(group), Ok(role)) => Association::RoleToGroup { group, role },
        (Err(e), _) | (_, Err(e)) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "Role added to group",
        "group",
        services.membership.add(ctx.principal(), association).await,
    )
}

async fn remove_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::GroupRoleRequest>,
) -> axum::response::Response {
    let association = match (body.group.lookup(), body.role.lookup()) {
        (Ok(group), Ok(role)) => Association::RoleToGroup { group, role },
        (Err(e), _) | (_, Err(e)) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "Role removed from group",
        "group",
        services.membership.remove(ctx.principal(), association).await,
    )
}

/// 200 when the caller belongs to the group, 403 otherwise.
async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::GroupRef>,
) -> axum::response::Response {
    let group = match body.lookup() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    decision(services.catalog.group_check(ctx.principal(), &group).await)
}
