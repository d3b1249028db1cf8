use crate::entities::{admin_sessions, admin_users, categories, content_items, site_settings};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema, Statement};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://heritage.db?mode=rwc".to_string());

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // admin_users before admin_sessions for the foreign key
    let stmts = vec![
        (
            "categories",
            schema
                .create_table_from_entity(categories::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "content_items",
            schema
                .create_table_from_entity(content_items::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "site_settings",
            schema
                .create_table_from_entity(site_settings::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "admin_users",
            schema
                .create_table_from_entity(admin_users::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "admin_sessions",
            schema
                .create_table_from_entity(admin_sessions::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        db.execute(builder.build(&stmt)).await?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_content_items_category_slug ON content_items(category_slug)",
        "CREATE INDEX IF NOT EXISTS idx_content_items_created_at ON content_items(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_admin_sessions_user_id ON admin_sessions(user_id)",
    ];

    for query in indexes {
        if let Err(e) = db
            .execute(Statement::from_string(builder, query.to_string()))
            .await
        {
            tracing::warn!("   - Index warning: {} -> {}", query, e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_repeatable() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
        run_migrations(&db).await.unwrap();
    }
}
