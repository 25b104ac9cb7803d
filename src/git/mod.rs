mod repo;

pub use repo::{resolve_date, GitRepo};
