use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{admin_sessions, admin_users, prelude::*};
use crate::services::events::{EventBus, SiteEvent};
use crate::utils::auth::{Claims, create_jwt, hash_password, validate_jwt, verify_password};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Session {
    pub access_token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionInfo {
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&Claims> for SessionInfo {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            expires_at: claims.expires_at(),
        }
    }
}

/// Password sign-in backed by `admin_users`, with revocable JWT sessions.
pub struct AuthService {
    db: DatabaseConnection,
    config: AppConfig,
    events: Arc<EventBus>,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: AppConfig, events: Arc<EventBus>) -> Self {
        Self { db, config, events }
    }

    pub async fn create_admin(&self, email: &str, password: &str) -> Result<admin_users::Model, AppError> {
        create_admin(&self.db, email, password).await
    }

    /// Creates the admin account unless one with this email already exists.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        let existing = AdminUsers::find()
            .filter(admin_users::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        self.create_admin(email, password).await?;
        Ok(true)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = AdminUsers::find()
            .filter(admin_users::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?;

        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("🔒 Failed sign-in attempt for {}", email);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let (token, claims) = create_jwt(
            &user.id,
            &user.email,
            &self.config.jwt_secret,
            self.config.session_ttl_hours,
        )?;

        let pruned = AdminSessions::delete_many()
            .filter(admin_sessions::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db)
            .await?
            .rows_affected;
        if pruned > 0 {
            info!("🧹 Pruned {} expired admin sessions", pruned);
        }

        admin_sessions::ActiveModel {
            id: Set(claims.jti.clone()),
            user_id: Set(user.id.clone()),
            expires_at: Set(claims.expires_at()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        info!("🔑 Admin {} signed in", user.email);
        self.events.publish(SiteEvent::SessionChanged {
            email: user.email.clone(),
            signed_in: true,
        });

        Ok(Session {
            access_token: token,
            email: user.email,
            expires_at: claims.expires_at(),
        })
    }

    /// Revokes the session the claims were issued for.
    pub async fn sign_out(&self, claims: &Claims) -> Result<(), AppError> {
        AdminSessions::delete_by_id(claims.jti.clone())
            .exec(&self.db)
            .await?;

        info!("👋 Admin {} signed out", claims.email);
        self.events.publish(SiteEvent::SessionChanged {
            email: claims.email.clone(),
            signed_in: false,
        });
        Ok(())
    }

    /// Decodes the token and checks its session row is still live.
    pub async fn validate_session(&self, token: &str) -> Result<Claims, AppError> {
        let claims = validate_jwt(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let session = AdminSessions::find_by_id(claims.jti.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session has been signed out".to_string()))?;

        if session.expires_at <= Utc::now() || session.user_id != claims.sub {
            AdminSessions::delete_by_id(session.id).exec(&self.db).await?;
            return Err(AppError::Unauthorized("Session expired".to_string()));
        }

        Ok(claims)
    }

    pub fn get_session(&self, claims: &Claims) -> SessionInfo {
        SessionInfo::from(claims)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Inserts a new admin account. Shared by the service and the `create_admin` binary.
pub async fn create_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<admin_users::Model, AppError> {
    let email = normalize_email(email);
    if email.is_empty() || password.len() < 8 {
        return Err(AppError::BadRequest(
            "Email is required and password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;
    let user = admin_users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(AppError::backend)?;

    info!("👤 Admin account created: {}", user.email);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database;
    use chrono::Duration;
    use sea_orm::{Database, PaginatorTrait, sea_query::Expr};

    async fn setup() -> (AuthService, Arc<EventBus>) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        database::run_migrations(&db).await.unwrap();
        let events = Arc::new(EventBus::default());
        let service = AuthService::new(db, AppConfig::default(), events.clone());
        service
            .create_admin("Curator@Example.com", "angkor-1113")
            .await
            .unwrap();
        (service, events)
    }

    #[tokio::test]
    async fn sign_in_issues_live_session() {
        let (service, events) = setup().await;
        let mut rx = events.subscribe();

        let session = service
            .sign_in_with_password("curator@example.com", "angkor-1113")
            .await
            .unwrap();
        assert_eq!(session.email, "curator@example.com");

        let claims = service.validate_session(&session.access_token).await.unwrap();
        assert_eq!(service.get_session(&claims).email, "curator@example.com");
        assert_eq!(
            rx.recv().await.unwrap(),
            SiteEvent::SessionChanged {
                email: "curator@example.com".into(),
                signed_in: true
            }
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (service, _) = setup().await;
        let err = service
            .sign_in_with_password("curator@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == INVALID_CREDENTIALS));

        let err = service
            .sign_in_with_password("nobody@example.com", "angkor-1113")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn sign_out_revokes_token() {
        let (service, _) = setup().await;
        let session = service
            .sign_in_with_password("curator@example.com", "angkor-1113")
            .await
            .unwrap();
        let claims = service.validate_session(&session.access_token).await.unwrap();

        service.sign_out(&claims).await.unwrap();
        assert!(service.validate_session(&session.access_token).await.is_err());
    }

    async fn session_count(service: &AuthService) -> u64 {
        AdminSessions::find().count(&service.db).await.unwrap()
    }

    #[tokio::test]
    async fn sign_in_prunes_expired_sessions() {
        let (service, _) = setup().await;
        let admin = AdminUsers::find().one(&service.db).await.unwrap().unwrap();
        admin_sessions::ActiveModel {
            id: Set("stale-session".into()),
            user_id: Set(admin.id),
            expires_at: Set(Utc::now() - Duration::days(30)),
            created_at: Set(Utc::now() - Duration::days(31)),
        }
        .insert(&service.db)
        .await
        .unwrap();

        for _ in 0..3 {
            let session = service
                .sign_in_with_password("curator@example.com", "angkor-1113")
                .await
                .unwrap();
            service.validate_session(&session.access_token).await.unwrap();
        }

        let stale = AdminSessions::find_by_id("stale-session".to_string())
            .one(&service.db)
            .await
            .unwrap();
        assert!(stale.is_none());
        assert_eq!(session_count(&service).await, 3);
    }

    #[tokio::test]
    async fn expired_session_row_is_removed_on_validation() {
        let (service, _) = setup().await;
        let session = service
            .sign_in_with_password("curator@example.com", "angkor-1113")
            .await
            .unwrap();
        let claims = service.validate_session(&session.access_token).await.unwrap();

        AdminSessions::update_many()
            .col_expr(
                admin_sessions::Column::ExpiresAt,
                Expr::value(Utc::now() - Duration::minutes(1)),
            )
            .filter(admin_sessions::Column::Id.eq(claims.jti.clone()))
            .exec(&service.db)
            .await
            .unwrap();

        let err = service.validate_session(&session.access_token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Session expired"));
        assert_eq!(session_count(&service).await, 0);
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let (service, _) = setup().await;
        assert!(!service.ensure_admin("curator@example.com", "angkor-1113").await.unwrap());
        assert!(service.ensure_admin("editor@example.com", "bayon-1190").await.unwrap());
    }

    #[tokio::test]
    async fn short_passwords_are_refused() {
        let (service, _) = setup().await;
        let err = service.create_admin("x@example.com", "short").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
