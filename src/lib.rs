use sqlx::{Pool, Sqlite};

pub mod error;
pub mod init;
pub mod models;
pub mod routes;

/// State shared across handlers. The pool is the only process-wide
/// resource; every request checks a connection out and drops it back.
#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
}
