pub mod tags;
pub mod todos;

use axum::Router;

use super::urls::UrlBuilder;
use crate::domain::repository::{TagRepository, TodoRepository};

#[derive(Clone)]
pub struct AppState<T, G> {
    pub todos: T,
    pub tags: G,
    pub urls: UrlBuilder,
}

/// Both resource routers sharing one state.
pub fn api<T, G>(state: AppState<T, G>) -> Router
where
    T: TodoRepository + Clone,
    G: TagRepository + Clone,
{
    Router::new()
        .merge(todos::router(state.clone()))
        .merge(tags::router(state))
}
