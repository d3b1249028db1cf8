use clap::Parser;
use dotenvy::dotenv;
use heritage_backend::infrastructure::database;
use heritage_backend::services::auth::create_admin;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Provision an admin account for the content panel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sign-in email
    #[arg(short, long)]
    email: String,

    /// Password (at least 8 characters)
    #[arg(short, long)]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_admin=info,heritage_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = database::setup_database().await?;

    match create_admin(&db, &args.email, &args.password).await {
        Ok(user) => {
            info!("✅ Admin {} is ready to sign in", user.email);
            Ok(())
        }
        Err(e) => {
            error!("❌ Could not create admin: {}", e);
            Err(anyhow::anyhow!(e.to_string()))
        }
    }
}
