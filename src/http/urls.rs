use std::sync::Arc;

use crate::domain::{tag::TagId, todo::TodoId};

/// Turns ids into absolute resource links under a public base URL.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Arc<str>,
}

impl UrlBuilder {
    pub fn new(base: &str) -> Self {
        Self { base: Arc::from(base.trim_end_matches('/')) }
    }

    pub fn todo(&self, id: TodoId) -> String { format!("{}/todos/{}", self.base, id.0) }

    pub fn tag(&self, id: TagId) -> String { format!("{}/tags/{}", self.base, id.0) }
}
