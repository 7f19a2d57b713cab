use uuid::Uuid;

use pubhub::models::{
    CreateDomain, CreateEnvironment, CreateGroup, CreateProject, CreateUser, Domain, Environment,
    EnvironmentKind, Group, Identity, Project, Role, Subject,
};
use pubhub::services::{DeploymentService, HierarchyService, MembershipService, UserService};
use pubhub::state::AppState;

/// Authentication info for tests
#[allow(dead_code)]
pub struct TestAuth {
    pub user_id: i64,
    pub name: String,
    pub token: String,
}

#[allow(dead_code)]
impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.name.clone())
    }
}

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a test user and return auth info
    pub async fn create_user(&self) -> TestAuth {
        let name = format!("user-{}", &Uuid::new_v4().simple().to_string()[..12]);
        self.create_user_with_name(&name, "TestPassword123!").await
    }

    /// Create a test user with a specific name and password
    pub async fn create_user_with_name(&self, name: &str, password: &str) -> TestAuth {
        let input = CreateUser {
            name: name.to_string(),
            password: password.to_string(),
        };

        let session = UserService::register(self.state.store(), &self.state.config, input)
            .await
            .unwrap();

        TestAuth {
            user_id: session.user.id,
            name: session.user.name,
            token: session.token,
        }
    }

    /// Create a test group administered by `owner`
    pub async fn create_group(&self, owner: &TestAuth) -> Group {
        let input = CreateGroup {
            name: format!("Test Group {}", Uuid::new_v4()),
            description: Some("Test group description".to_string()),
        };

        HierarchyService::create_group(self.state.store(), &owner.identity(), input)
            .await
            .unwrap()
    }

    /// Create a test project administered by `owner`
    pub async fn create_project(&self, owner: &TestAuth) -> Project {
        let name = format!("project-{}", Uuid::new_v4());
        self.create_project_with(owner, &name, None).await
    }

    /// Create a test project with a specific name, optionally inside a group
    pub async fn create_project_with(
        &self,
        owner: &TestAuth,
        name: &str,
        group_id: Option<i64>,
    ) -> Project {
        let input = CreateProject {
            name: name.to_string(),
            zh_name: format!("{name} zh"),
            description: None,
            group_id,
        };

        HierarchyService::create_project(self.state.store(), &owner.identity(), input)
            .await
            .unwrap()
    }

    /// Create a test environment
    pub async fn create_environment(
        &self,
        actor: &TestAuth,
        project_id: i64,
        name: &str,
    ) -> Environment {
        let input = CreateEnvironment {
            name: name.to_string(),
            kind: EnvironmentKind::new(1).unwrap(),
        };

        DeploymentService::create_environment(
            self.state.store(),
            &actor.identity(),
            project_id,
            input,
        )
        .await
        .unwrap()
    }

    /// Bind a host to an environment
    pub async fn create_domain(
        &self,
        actor: &TestAuth,
        project_id: i64,
        environment_id: i64,
        host: &str,
    ) -> Domain {
        let input = CreateDomain {
            environment_id,
            host: host.to_string(),
        };

        DeploymentService::create_domain(self.state.store(), &actor.identity(), project_id, input)
            .await
            .unwrap()
    }

    /// Enroll `member` into `subject` with `role`, acting as `admin`
    pub async fn add_member(
        &self,
        admin: &TestAuth,
        subject: Subject,
        member: &TestAuth,
        role: i16,
    ) {
        MembershipService::add_member(
            self.state.store(),
            &admin.identity(),
            subject,
            member.user_id,
            Role::new(role).unwrap(),
        )
        .await
        .unwrap();
    }

    /// Create a full test hierarchy: user -> project -> environment
    pub async fn create_hierarchy(&self) -> TestHierarchy {
        let auth = self.create_user().await;
        let project = self.create_project(&auth).await;
        let environment = self.create_environment(&auth, project.id, "prod").await;

        TestHierarchy {
            auth,
            project,
            environment,
        }
    }
}

/// Complete test data hierarchy
#[allow(dead_code)]
pub struct TestHierarchy {
    pub auth: TestAuth,
    pub project: Project,
    pub environment: Environment,
}
