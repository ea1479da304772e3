use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};

use orgguard_core::RoleId;

use crate::app::routes::common::{reply, reply_with_message};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).delete(delete_one))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> axum::response::Response {
    reply(StatusCode::OK, services.catalog.list_roles(ctx.principal()).await)
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateRoleRequest>,
) -> axum::response::Response {
    reply(
        StatusCode::CREATED,
        services
            .catalog
            .create_role(ctx.principal(), &body.name, body.kind)
            .await,
    )
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RoleId = match errors::parse_id(&id, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply(StatusCode::OK, services.catalog.get_role(ctx.principal(), id).await)
}

async fn delete_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RoleId = match errors::parse_id(&id, "role") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    reply_with_message(
        "Role deleted",
        "role",
        services.catalog.delete_role(ctx.principal(), id).await,
    )
}
