pub mod activity;
pub mod auth;
pub mod channels;
pub mod health;
pub mod keywords;
pub mod users;
