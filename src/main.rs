use anyhow::Context;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use pubhub::config::{Config, LogFormat};
use pubhub::handlers::{
    AddMemberRequest, AuthResponse, CreateDeploymentRequest, CreateDomainRequest,
    CreateEnvironmentRequest, CreateGroupRequest, CreateProjectRequest, DeploymentListResponse,
    DeploymentResponse, DomainListResponse, DomainResponse, EnvironmentListResponse,
    EnvironmentResponse, GroupListResponse, GroupResponse, LoginRequest, MemberListResponse,
    MemberResponse, ProjectListResponse, ProjectResponse, RegisterRequest, UpdateGroupRequest,
    UpdateProjectRequest, UpdateUserRequest, UserListResponse,
};
use pubhub::models::{UserResponse, UserSummary};
use pubhub::state::AppState;
use pubhub::{build_router, handlers};

/// Security scheme for Bearer token
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::group::create_group,
        handlers::group::list_groups,
        handlers::group::get_group,
        handlers::group::update_group,
        handlers::group::delete_group,
        handlers::project::create_project,
        handlers::project::list_projects,
        handlers::project::get_project,
        handlers::project::update_project,
        handlers::project::delete_project,
        handlers::member::list_group_members,
        handlers::member::add_group_member,
        handlers::member::remove_group_member,
        handlers::member::list_project_members,
        handlers::member::add_project_member,
        handlers::member::remove_project_member,
        handlers::environment::create_environment,
        handlers::environment::list_environments,
        handlers::environment::get_environment,
        handlers::environment::delete_environment,
        handlers::domain::create_domain,
        handlers::domain::list_domains,
        handlers::domain::get_domain,
        handlers::domain::delete_domain,
        handlers::deployment::create_deployment,
        handlers::deployment::list_deployments,
        handlers::deployment::get_deployment,
        handlers::deployment::delete_deployment,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        UserSummary,
        UpdateUserRequest,
        UserListResponse,
        CreateGroupRequest,
        UpdateGroupRequest,
        GroupResponse,
        GroupListResponse,
        CreateProjectRequest,
        UpdateProjectRequest,
        ProjectResponse,
        ProjectListResponse,
        AddMemberRequest,
        MemberResponse,
        MemberListResponse,
        CreateEnvironmentRequest,
        EnvironmentResponse,
        EnvironmentListResponse,
        CreateDomainRequest,
        DomainResponse,
        DomainListResponse,
        CreateDeploymentRequest,
        DeploymentResponse,
        DeploymentListResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "User management endpoints"),
        (name = "Groups", description = "Group management endpoints"),
        (name = "Projects", description = "Project management endpoints"),
        (name = "Members", description = "Group and project membership endpoints"),
        (name = "Environments", description = "Environment management endpoints"),
        (name = "Domains", description = "Domain binding endpoints"),
        (name = "Deployments", description = "Deployment record endpoints")
    )
)]
struct ApiDoc;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(config.log_format);
    let addr = config.server_addr();

    tracing::info!(backend = ?config.store_backend, "Connecting to store...");
    let state = AppState::new(config)
        .await
        .context("failed to initialize application state")?;
    tracing::info!("Store ready");

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
