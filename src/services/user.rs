use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, Identity, Page, PageRequest, UpdateUser, User};
use crate::services::AuthService;
use crate::store::ResourceStore;

/// A signed-in user together with their bearer token
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct UserService;

impl UserService {
    /// Create an account and sign it in
    pub async fn register(
        store: &dyn ResourceStore,
        config: &Config,
        input: CreateUser,
    ) -> AppResult<Session> {
        let password_hash = AuthService::hash_password(&input.password)?;
        let user = store.create_user(&input, &password_hash).await?;

        tracing::info!(user_id = user.id, "user registered");
        Self::session_for(user, config)
    }

    /// Unknown names and wrong passwords are indistinguishable to the caller
    pub async fn login(
        store: &dyn ResourceStore,
        config: &Config,
        name: &str,
        password: &str,
    ) -> AppResult<Session> {
        let user = store
            .find_user_by_name(name)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !AuthService::verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        Self::session_for(user, config)
    }

    pub async fn get_user(store: &dyn ResourceStore, id: i64) -> AppResult<User> {
        store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    pub async fn list_users(store: &dyn ResourceStore, page: PageRequest) -> AppResult<Page<User>> {
        let items = store.list_users(page).await?;
        let total = store.count_users().await?;
        Ok(Page::new(items, total, page))
    }

    /// Users may only change their own name or password
    pub async fn update_user(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
        changes: UpdateUser,
    ) -> AppResult<User> {
        require_self(identity, id)?;
        let mut user = Self::get_user(store, id).await?;

        if let Some(name) = changes.name.filter(|n| !n.is_empty()) {
            user.name = name;
        }
        if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
            user.password_hash = AuthService::hash_password(&password)?;
        }

        let user = store.update_user(&user).await?;
        tracing::info!(user_id = id, "user updated");
        Ok(user)
    }

    pub async fn delete_user(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
    ) -> AppResult<()> {
        require_self(identity, id)?;
        if !store.tombstone_user(id).await? {
            return Err(AppError::NotFound("User".to_string()));
        }

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    fn session_for(user: User, config: &Config) -> AppResult<Session> {
        let identity = Identity::new(user.id, user.name.clone());
        let token = AuthService::generate_token(&identity, config)?;
        Ok(Session { token, user })
    }
}

fn require_self(identity: &Identity, id: i64) -> AppResult<()> {
    if identity.user_id == id {
        Ok(())
    } else {
        Err(AppError::Forbidden("users may only modify their own account".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, StoreBackend};
    use crate::store::InMemoryStore;

    fn config() -> Config {
        Config {
            store_backend: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            jwt_secret: "unit-test-secret".to_string(),
            jwt_expiration_hours: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            log_format: LogFormat::Pretty,
        }
    }

    fn credentials(name: &str) -> CreateUser {
        CreateUser {
            name: name.to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = InMemoryStore::new();
        let config = config();

        let registered = UserService::register(&store, &config, credentials("erin"))
            .await
            .unwrap();
        let session = UserService::login(&store, &config, "erin", "secret123")
            .await
            .unwrap();

        assert_eq!(session.user.id, registered.user.id);
        let claims = AuthService::verify_token(&session.token, &config).unwrap();
        assert_eq!(claims.sub, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_look_alike() {
        let store = InMemoryStore::new();
        let config = config();
        UserService::register(&store, &config, credentials("erin"))
            .await
            .unwrap();

        let wrong_password = UserService::login(&store, &config, "erin", "nope").await;
        let unknown_user = UserService::login(&store, &config, "nobody", "secret123").await;

        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown_user, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let store = InMemoryStore::new();
        let config = config();
        UserService::register(&store, &config, credentials("erin"))
            .await
            .unwrap();

        let result = UserService::register(&store, &config, credentials("erin")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_self_may_update() {
        let store = InMemoryStore::new();
        let config = config();
        let erin = UserService::register(&store, &config, credentials("erin"))
            .await
            .unwrap()
            .user;
        let frank = UserService::register(&store, &config, credentials("frank"))
            .await
            .unwrap()
            .user;

        let as_frank = Identity::new(frank.id, frank.name.clone());
        let result = UserService::update_user(
            &store,
            &as_frank,
            erin.id,
            UpdateUser {
                name: Some("hijacked".to_string()),
                password: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let as_erin = Identity::new(erin.id, erin.name.clone());
        let renamed = UserService::update_user(
            &store,
            &as_erin,
            erin.id,
            UpdateUser {
                name: Some("erin2".to_string()),
                password: Some(String::new()),
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "erin2");
        assert!(UserService::login(&store, &config, "erin2", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn test_deleted_user_cannot_login() {
        let store = InMemoryStore::new();
        let config = config();
        let erin = UserService::register(&store, &config, credentials("erin"))
            .await
            .unwrap()
            .user;

        UserService::delete_user(&store, &Identity::new(erin.id, "erin"), erin.id)
            .await
            .unwrap();

        let result = UserService::login(&store, &config, "erin", "secret123").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert!(matches!(
            UserService::get_user(&store, erin.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
