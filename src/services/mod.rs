pub mod admin;
pub mod auth;
pub mod content;
pub mod events;
pub mod media;
pub mod site;
pub mod storage;
