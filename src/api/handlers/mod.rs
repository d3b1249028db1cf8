pub mod admin;
pub mod auth;
pub mod content;
pub mod events;
pub mod health;
pub mod media;
pub mod pages;
