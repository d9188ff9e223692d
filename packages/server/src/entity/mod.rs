pub mod comment;
pub mod document;
pub mod file;
pub mod task;
pub mod user;
pub mod workspace;
