use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod auth;
pub mod common;
pub mod groups;
pub mod roles;
pub mod system;
pub mod tasks;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login_user))
        .route("/auth/login/root", post(auth::login_org))
        .route("/auth/reactivate", post(auth::reactivate))
        .route("/auth/logout", post(auth::logout))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/:id", delete(auth::delete_account))
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/groups", groups::router())
        .nest("/tasks", tasks::router())
}
