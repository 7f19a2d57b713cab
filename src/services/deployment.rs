use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDeployment, CreateDomain, CreateEnvironment, Deployment, DeploymentFilter, Domain,
    Environment, Identity, Project, Role, Subject, TARGET_VALUE_MAX_LEN,
};
use crate::services::MembershipService;
use crate::store::ResourceStore;

/// Environments, domains and deployment-target records under a project.
///
/// Any project member may create or delete these; reads are open.
pub struct DeploymentService;

impl DeploymentService {
    // ============ Environments ============

    pub async fn create_environment(
        store: &dyn ResourceStore,
        identity: &Identity,
        project_id: i64,
        input: CreateEnvironment,
    ) -> AppResult<Environment> {
        project_for_member(store, identity, project_id).await?;

        let environment = store
            .create_environment(project_id, identity.user_id, &input)
            .await?;

        tracing::info!(
            environment_id = environment.id,
            project_id,
            kind = environment.kind.get(),
            actor_id = identity.user_id,
            "environment created"
        );
        Ok(environment)
    }

    pub async fn get_environment(store: &dyn ResourceStore, id: i64) -> AppResult<Environment> {
        store
            .find_environment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Environment".to_string()))
    }

    pub async fn list_environments(
        store: &dyn ResourceStore,
        project_id: i64,
    ) -> AppResult<Vec<Environment>> {
        store.list_environments(project_id).await
    }

    pub async fn delete_environment(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
    ) -> AppResult<()> {
        let environment = Self::get_environment(store, id).await?;
        require_member(store, identity, environment.project_id).await?;

        if !store.tombstone_environment(id).await? {
            return Err(AppError::NotFound("Environment".to_string()));
        }

        tracing::info!(environment_id = id, actor_id = identity.user_id, "environment deleted");
        Ok(())
    }

    // ============ Domains ============

    /// Bind a host to one of the project's environments; hosts need not be unique
    pub async fn create_domain(
        store: &dyn ResourceStore,
        identity: &Identity,
        project_id: i64,
        input: CreateDomain,
    ) -> AppResult<Domain> {
        project_for_member(store, identity, project_id).await?;
        environment_in_project(store, project_id, input.environment_id).await?;

        let domain = store.create_domain(project_id, &input).await?;

        tracing::info!(
            domain_id = domain.id,
            project_id,
            environment_id = domain.environment_id,
            host = %domain.host,
            actor_id = identity.user_id,
            "domain created"
        );
        Ok(domain)
    }

    pub async fn get_domain(store: &dyn ResourceStore, id: i64) -> AppResult<Domain> {
        store
            .find_domain(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Domain".to_string()))
    }

    pub async fn list_domains(
        store: &dyn ResourceStore,
        project_id: i64,
    ) -> AppResult<Vec<Domain>> {
        store.list_domains(project_id).await
    }

    pub async fn delete_domain(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
    ) -> AppResult<()> {
        let domain = Self::get_domain(store, id).await?;
        require_member(store, identity, domain.project_id).await?;

        if !store.tombstone_domain(id).await? {
            return Err(AppError::NotFound("Domain".to_string()));
        }

        tracing::info!(domain_id = id, actor_id = identity.user_id, "domain deleted");
        Ok(())
    }

    // ============ Deployments ============

    /// Record a new deployment target; the caller is both creator and last actor
    pub async fn create_deployment(
        store: &dyn ResourceStore,
        identity: &Identity,
        project_id: i64,
        input: CreateDeployment,
    ) -> AppResult<Deployment> {
        if input.target_value.chars().count() > TARGET_VALUE_MAX_LEN {
            return Err(AppError::Validation(format!(
                "target_value must be at most {TARGET_VALUE_MAX_LEN} characters"
            )));
        }

        project_for_member(store, identity, project_id).await?;
        environment_in_project(store, project_id, input.environment_id).await?;

        let deployment = store
            .create_deployment(project_id, identity.user_id, &input)
            .await?;

        tracing::info!(
            deployment_id = deployment.id,
            project_id,
            environment_id = deployment.environment_id,
            target_kind = deployment.target_kind.get(),
            actor_id = identity.user_id,
            "deployment recorded"
        );
        Ok(deployment)
    }

    pub async fn get_deployment(store: &dyn ResourceStore, id: i64) -> AppResult<Deployment> {
        store
            .find_deployment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deployment".to_string()))
    }

    pub async fn list_deployments(
        store: &dyn ResourceStore,
        project_id: i64,
        filter: DeploymentFilter,
    ) -> AppResult<Vec<Deployment>> {
        store.list_deployments(project_id, filter).await
    }

    pub async fn delete_deployment(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
    ) -> AppResult<()> {
        let deployment = Self::get_deployment(store, id).await?;
        require_member(store, identity, deployment.project_id).await?;

        if !store.tombstone_deployment(id).await? {
            return Err(AppError::NotFound("Deployment".to_string()));
        }

        tracing::info!(deployment_id = id, actor_id = identity.user_id, "deployment deleted");
        Ok(())
    }
}

async fn require_member(
    store: &dyn ResourceStore,
    identity: &Identity,
    project_id: i64,
) -> AppResult<()> {
    MembershipService::require_role(store, identity, Subject::Project(project_id), Role::ANY_MEMBER)
        .await?;
    Ok(())
}

/// The active project, provided the caller is one of its members
async fn project_for_member(
    store: &dyn ResourceStore,
    identity: &Identity,
    project_id: i64,
) -> AppResult<Project> {
    let project = store
        .find_project(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project".to_string()))?;
    require_member(store, identity, project_id).await?;
    Ok(project)
}

/// The environment must be active and belong to `project_id`
async fn environment_in_project(
    store: &dyn ResourceStore,
    project_id: i64,
    environment_id: i64,
) -> AppResult<Environment> {
    match store.find_environment(environment_id).await? {
        Some(environment) if environment.project_id == project_id => Ok(environment),
        Some(_) => Err(AppError::InvalidReference(format!(
            "environment {environment_id} does not belong to project {project_id}"
        ))),
        None => Err(AppError::InvalidReference(format!(
            "environment {environment_id} does not exist"
        ))),
    }
}
