// Library crate for pubhub
// Exports modules for use by the server binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    add_group_member, add_project_member, create_deployment, create_domain, create_environment,
    create_group, create_project, delete_deployment, delete_domain, delete_environment,
    delete_group, delete_project, delete_user, get_deployment, get_domain, get_environment,
    get_group, get_project, get_user, list_deployments, list_domains, list_environments,
    list_group_members, list_groups, list_project_members, list_projects, list_users, login, me,
    register, remove_group_member, remove_project_member, update_group, update_project,
    update_user,
};
use crate::middlewares::auth_middleware;
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    // Protected routes (require authentication)
    let protected_routes = Router::new()
        // Auth & User routes
        .route("/api/auth/me", get(me))
        .route("/api/users", get(list_users))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Group routes
        .route("/api/groups", get(list_groups).post(create_group))
        .route(
            "/api/groups/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route(
            "/api/groups/{id}/members",
            get(list_group_members).post(add_group_member),
        )
        .route(
            "/api/groups/{id}/members/{user_id}",
            delete(remove_group_member),
        )
        // Project routes
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route(
            "/api/projects/{id}/members",
            get(list_project_members).post(add_project_member),
        )
        .route(
            "/api/projects/{id}/members/{user_id}",
            delete(remove_project_member),
        )
        // Environment, domain and deployment routes (nested under projects)
        .route(
            "/api/projects/{id}/environments",
            get(list_environments).post(create_environment),
        )
        .route(
            "/api/projects/{id}/domains",
            get(list_domains).post(create_domain),
        )
        .route(
            "/api/projects/{id}/deployments",
            get(list_deployments).post(create_deployment),
        )
        // Direct access
        .route(
            "/api/environments/{id}",
            get(get_environment).delete(delete_environment),
        )
        .route("/api/domains/{id}", get(get_domain).delete(delete_domain))
        .route(
            "/api/deployments/{id}",
            get(get_deployment).delete(delete_deployment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(|| async { "Hello, pubhub!" }))
        // Public auth routes
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Protected routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
