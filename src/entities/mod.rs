pub mod prelude;

pub mod admin_sessions;
pub mod admin_users;
pub mod categories;
pub mod content_items;
pub mod site_settings;
