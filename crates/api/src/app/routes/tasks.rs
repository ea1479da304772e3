use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use orgguard_accounts::Association;
use orgguard_core::TaskId;

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
    reply(StatusCode::OK, services.catalog.list_tasks(ctx.principal()).await)
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
            .create_task(ctx.principal(), &body.name, &body.role_ids)
            .await,
    )
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TaskId = match errors::parse_id(&id, "task") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply(StatusCode::OK, services.catalog.get_task(ctx.principal(), id).await)
}

async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TaskId = match errors::parse_id(&id, "task") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply_with_message(
        "Task deleted",
        "task",
        services.catalog.delete_task(ctx.principal(), id).await,
    )
}

async fn add_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::TaskRoleRequest>,
) -> axum::response::Response {
    let association = match (body.task.lookup(), body.role.lookup()) {
        (Ok(task), Ok(role)) => Association::RoleToTask { task, role },
        (Err(e), _) | (_, Err(e)) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "Role added to task",
        "task",
        services.membership.add(ctx.principal(), association).await,
    )
}

async fn remove_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::TaskRoleRequest>,
) -> axum::response::Response {
    let association = match (body.task.lookup(), body.role.lookup()) {
        (Ok(task), Ok(role)) => Association::RoleToTask { task, role },
        (Err(e), _) | (_, Err(e)) => return errors::domain_error_to_response(e),
    };
    reply_with_message(
        "Role removed from task",
        "task",
        services.membership.remove(ctx.principal(), association).await,
    )
}

/// 200 when the caller may use the task, 403 otherwise.
async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::TaskRef>,
) -> axum::response::Response {
    let task = match body.lookup() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    decision(services.catalog.task_check(ctx.principal(), &task).await)
}
