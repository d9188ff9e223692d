
mod auth;
mod comment;
mod document;
mod file;
mod workspace;
