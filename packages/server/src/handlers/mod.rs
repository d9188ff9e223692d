pub mod ai;
pub mod auth;
pub mod comment;
pub mod document;
pub mod file;
pub mod task;
pub mod workspace;
