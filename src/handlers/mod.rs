pub mod auth;
pub mod bolna;
pub mod super_admin;
pub mod tenant_users;
