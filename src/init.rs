use std::str::FromStr;

use axum::Router;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tokio::net::TcpListener;

use crate::{routes, AppState};

async fn init_database() -> anyhow::Result<Pool<Sqlite>> {
    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::warn!("no DATABASE_URL found. defaulting to sqlite:quotes.db.");
        "sqlite:quotes.db".to_string()
    });

    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    let db = SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

fn init_bind_addr() -> String {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(8000);

    format!("{}:{}", host, port)
}

pub async fn init() -> anyhow::Result<(TcpListener, Router)> {
    tracing::info!("initializing... please wait warmly.");

    let db = init_database().await?;
    let app = routes::router(AppState { db });

    let addr = init_bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}.", addr);

    tracing::info!("finished initializing!");
    Ok((listener, app))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_defaults() {
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        assert_eq!(init_bind_addr(), "0.0.0.0:8000");
    }
}
