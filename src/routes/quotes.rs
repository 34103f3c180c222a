use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::{Pool, Sqlite};

use crate::{error::ApiError, models::quote::Quote, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes/", post(create_quote))
        .route("/quotes", get(read_quotes))
        .route("/quotes/:id", get(read_quote).delete(delete_quote))
        .route("/quotes/:id/likes", patch(update_likes))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct UserParam {
    pub user_id: i64,
}

/// Fetch a quote by id and compute `is_liked` for the given user via a
/// direct existence check on the likes relation.
async fn fetch_quote(db: &Pool<Sqlite>, id: i64, user_id: i64) -> Result<Quote, ApiError> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
            SELECT
                id, quote, author, tags, likes
            FROM quotes
            WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = id, "an error occurred when fetching quote");
    })?;

    let Some(mut quote) = quote else {
        return Err(ApiError::NotFound("Quote not found.".to_string()));
    };

    let like = sqlx::query(
        r#"
            SELECT 1 FROM likes
            WHERE user_id = $1 AND quote_id = $2;
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = id, user_id = user_id, "an error occurred when fetching like");
    })?;

    quote.is_liked = like.is_some();

    Ok(quote)
}

#[tracing::instrument(skip(state))]
pub async fn create_quote(
    State(state): State<AppState>,
    Json(quote): Json<Quote>,
) -> Result<Json<Quote>, ApiError> {
    let existing = sqlx::query(
        r#"
            SELECT id FROM quotes
            WHERE id = $1;
        "#,
    )
    .bind(quote.id)
    .fetch_optional(&state.db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = quote.id, "an error occurred when checking for an existing quote");
    })?;

    if existing.is_some() {
        return Err(ApiError::Conflict(
            "Quote with this id already exists.".to_string(),
        ));
    }

    sqlx::query(
        r#"
            INSERT INTO
                quotes (id, quote, author, tags, likes)
            VALUES
                ($1, $2, $3, $4, $5);
        "#,
    )
    .bind(quote.id)
    .bind(&quote.quote)
    .bind(&quote.author)
    .bind(&quote.tags)
    .bind(quote.likes)
    .execute(&state.db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = quote.id, "an error occurred when inserting quote");
    })?;

    Ok(Json(quote))
}

#[tracing::instrument(skip(state))]
pub async fn read_quotes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let rows = sqlx::query_as::<_, Quote>(
        r#"
            SELECT
                id, quote, author, tags, likes
            FROM quotes
            LIMIT $1 OFFSET $2;
        "#,
    )
    .bind(params.limit)
    .bind(params.skip)
    .fetch_all(&state.db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, "an error occurred when fetching quotes");
    })?;

    // one round trip for the user's whole like-set, then a membership
    // check per row
    let liked: HashSet<i64> = sqlx::query_scalar::<_, i64>(
        r#"
            SELECT quote_id FROM likes
            WHERE user_id = $1;
        "#,
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, user_id = params.user_id, "an error occurred when fetching likes");
    })?
    .into_iter()
    .collect();

    let quotes = rows
        .into_iter()
        .map(|mut quote| {
            quote.is_liked = liked.contains(&quote.id);
            quote
        })
        .collect();

    Ok(Json(quotes))
}

#[tracing::instrument(skip(state))]
pub async fn read_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(user): Query<UserParam>,
) -> Result<Json<Quote>, ApiError> {
    let quote = fetch_quote(&state.db, id, user.user_id).await?;

    Ok(Json(quote))
}

/// Apply one like-toggle: flip the relation row and keep the counter in
/// step inside a single transaction, then re-read through the same path
/// as a single get. The re-read happens after commit, so toggling an id
/// that was never created still records the like row and then 404s.
async fn toggle_like(db: &Pool<Sqlite>, id: i64, user_id: i64) -> Result<Quote, ApiError> {
    let mut tx = db.begin().await?;

    let like = sqlx::query(
        r#"
            SELECT 1 FROM likes
            WHERE user_id = $1 AND quote_id = $2;
        "#,
    )
    .bind(user_id)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    if like.is_some() {
        sqlx::query(
            r#"
                UPDATE quotes
                SET likes = likes - 1
                WHERE id = $1;
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
                DELETE FROM likes
                WHERE user_id = $1 AND quote_id = $2;
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    } else {
        sqlx::query(
            r#"
                UPDATE quotes
                SET likes = likes + 1
                WHERE id = $1;
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
                INSERT INTO
                    likes (user_id, quote_id)
                VALUES
                    ($1, $2);
            "#,
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    fetch_quote(db, id, user_id).await
}

#[tracing::instrument(skip(state))]
pub async fn update_likes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(user): Query<UserParam>,
) -> Result<Json<Quote>, ApiError> {
    match toggle_like(&state.db, id, user.user_id).await {
        Ok(quote) => Ok(Json(quote)),
        Err(err @ ApiError::NotFound(_)) => Err(err),
        Err(err) => {
            tracing::error!(err = ?err, id = id, user_id = user.user_id, "an error occurred when updating likes");
            Err(ApiError::Internal(
                "An error occurred while updating likes.".to_string(),
            ))
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Quote>, ApiError> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
            SELECT
                id, quote, author, tags, likes
            FROM quotes
            WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = id, "an error occurred when fetching quote");
    })?;

    match quote {
        Some(quote) => {
            // rows in the likes relation for this quote are left
            // behind; re-creating the same id revives them
            sqlx::query(
                r#"
                    DELETE FROM quotes
                    WHERE id = $1;
                "#,
            )
            .bind(id)
            .execute(&state.db)
            .await
            .inspect_err(|e| {
                tracing::error!(err = ?e, id = id, "an error occurred when deleting quote");
            })?;

            Ok(Json(quote))
        }
        None => Err(ApiError::NotFound("Quote not found.".to_string())),
    }
}
