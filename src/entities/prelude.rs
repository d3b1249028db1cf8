pub use super::admin_sessions::Entity as AdminSessions;
pub use super::admin_users::Entity as AdminUsers;
pub use super::categories::Entity as Categories;
pub use super::content_items::Entity as ContentItems;
pub use super::site_settings::Entity as SiteSettings;
