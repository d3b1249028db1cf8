use crate::config::AppConfig;
use crate::services::auth::AuthService;
use tracing::info;

/// Creates the admin named by `ADMIN_EMAIL` / `ADMIN_PASSWORD` if it is missing.
pub async fn seed_admin(auth: &AuthService, config: &AppConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    info!("🌱 Seeding admin account...");
    if auth
        .ensure_admin(email, password)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
    {
        info!("✅ Admin {} created", email);
    } else {
        info!("✅ Admin {} already present", email);
    }
    Ok(())
}
