//! Source queries.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::{NewSource, Source, SourceRow};

const SOURCE_SELECT: &str = r#"
    SELECT
        s.id, s.name, s.address, s.is_reachable,
        t.id AS type_id, t.name AS type_name,
        v.id AS server_id, v.name AS server_name, v.url AS server_url,
        v.server_type AS server_type, v.is_reachable AS server_is_reachable,
        v.disabled AS server_disabled
    FROM sources s
    JOIN servers v ON v.id = s.server_id
    LEFT JOIN source_types t ON t.id = s.source_type_id
"#;

/// List all sources in creation order.
pub async fn list_sources(pool: &SqlitePool) -> DbResult<Vec<Source>> {
    let rows = sqlx::query_as::<_, SourceRow>(&format!("{SOURCE_SELECT} ORDER BY s.id"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Source::from).collect())
}

/// List the sources of one server.
pub async fn list_sources_for_server(pool: &SqlitePool, server_id: i64) -> DbResult<Vec<Source>> {
    let rows = sqlx::query_as::<_, SourceRow>(&format!(
        "{SOURCE_SELECT} WHERE s.server_id = ? ORDER BY s.id"
    ))
    .bind(server_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Source::from).collect())
}

/// Get a source by ID.
pub async fn get_source(pool: &SqlitePool, id: i64) -> DbResult<Option<Source>> {
    let row = sqlx::query_as::<_, SourceRow>(&format!("{SOURCE_SELECT} WHERE s.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Source::from))
}

/// Insert a source unless one with the same address already exists on the
/// server. Returns the new source, or `None` when it was already known.
pub async fn insert_source_if_absent(
    pool: &SqlitePool,
    source: &NewSource,
) -> DbResult<Option<Source>> {
    let result = sqlx::query(
        r#"
        INSERT INTO sources (name, address, is_reachable, source_type_id, server_id)
        VALUES (?, ?, 1, ?, ?)
        ON CONFLICT(address, server_id) DO NOTHING
        "#,
    )
    .bind(&source.name)
    .bind(&source.address)
    .bind(source.source_type_id)
    .bind(source.server_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_source(pool, result.last_insert_rowid()).await
}

/// Record whether the source answered the last request.
pub async fn set_source_reachable(pool: &SqlitePool, id: i64, reachable: bool) -> DbResult<bool> {
    let result = sqlx::query("UPDATE sources SET is_reachable = ? WHERE id = ?")
        .bind(reachable)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a source.
pub async fn delete_source(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM sources WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
