pub mod routes;
pub mod routing;
pub mod types;
pub mod urls;
