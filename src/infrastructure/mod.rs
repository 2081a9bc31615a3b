pub mod links;
pub mod seed;
pub mod store;
pub mod tag_repo;
pub mod todo_repo;
