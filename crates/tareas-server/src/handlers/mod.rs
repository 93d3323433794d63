pub mod comments;
pub mod tasks;
