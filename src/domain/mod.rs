pub mod error;
pub mod repository;
pub mod tag;
pub mod todo;
