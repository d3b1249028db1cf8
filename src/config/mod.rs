use std::env;

/// Which preset `AppConfig` starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Profile {
    /// Plain environment variables
    #[default]
    Env,
    /// Environment plus demo map back-fill
    Dev,
    /// Environment with a mandatory JWT secret
    Prod,
}

/// Runtime configuration for the heritage backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum media upload size in bytes (default: 50 MB)
    pub max_upload_size: usize,

    /// JWT Secret Key (Required in production)
    pub jwt_secret: String,

    /// Lifetime of an admin session in hours (default: 24)
    pub session_ttl_hours: i64,

    /// Object storage bucket for uploaded media (default: "media")
    pub media_bucket: String,

    /// Base URL under which bucket objects are publicly reachable
    pub media_public_base_url: String,

    /// Hero image shown on the home page when no `hero_image` setting exists
    pub default_hero_image: String,

    /// Fill missing map fields on item detail with demonstration values (default: false)
    pub demo_map_backfill: bool,

    /// Admin account created at start-up when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

const DEFAULT_HERO_IMAGE: &str = "https://images.unsplash.com/photo-1569668444050-b7bc2bfec0c7?q=80&w=2940&auto=format&fit=crop";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 50 * 1024 * 1024, // 50 MB
            jwt_secret: "secret".to_string(),
            session_ttl_hours: 24,
            media_bucket: "media".to_string(),
            media_public_base_url: "http://localhost:9000".to_string(),
            default_hero_image: DEFAULT_HERO_IMAGE.to_string(),
            demo_map_backfill: false,
            admin_email: None,
            admin_password: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_ttl_hours),

            media_bucket: env::var("MEDIA_BUCKET").unwrap_or(default.media_bucket),

            media_public_base_url: env::var("MEDIA_PUBLIC_BASE_URL")
                .or_else(|_| env::var("MINIO_ENDPOINT"))
                .unwrap_or(default.media_public_base_url),

            default_hero_image: env::var("DEFAULT_HERO_IMAGE")
                .unwrap_or(default.default_hero_image),

            demo_map_backfill: flag("DEMO_MAP_BACKFILL", default.demo_map_backfill),

            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Env => Self::from_env(),
            Profile::Dev => Self::development(),
            Profile::Prod => Self::production(),
        }
    }

    /// Create config for development (demo back-fill on)
    pub fn development() -> Self {
        Self {
            demo_map_backfill: true,
            ..Self::from_env()
        }
    }

    /// Create config for production (secret and origins must come from the environment)
    pub fn production() -> Self {
        Self {
            jwt_secret: env::var("JWT_SECRET").expect("CRITICAL: JWT_SECRET must be set"),
            ..Self::from_env()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_size, 50 * 1024 * 1024);
        assert_eq!(config.media_bucket, "media");
        assert_eq!(config.session_ttl_hours, 24);
        assert!(!config.demo_map_backfill);
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert!(config.demo_map_backfill);
    }

    #[test]
    fn test_profile_selects_preset() {
        assert!(AppConfig::for_profile(Profile::Dev).demo_map_backfill);
        assert_eq!(
            AppConfig::for_profile(Profile::Env).media_bucket,
            AppConfig::from_env().media_bucket
        );
    }

    #[test]
    fn test_production_config() {
        unsafe { env::set_var("JWT_SECRET", "test_secret") };
        let config = AppConfig::production();
        unsafe { env::remove_var("JWT_SECRET") };
        assert_eq!(config.jwt_secret, "test_secret");
    }

    #[test]
    fn test_from_env_cors_fallback() {
        unsafe { env::remove_var("ALLOWED_ORIGINS") };
        let config = AppConfig::from_env();
        let default_config = AppConfig::default();
        assert_eq!(config.allowed_origins, default_config.allowed_origins);
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }
}
