//! Server queries.

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};
use crate::models::{NewServer, NewServerArgument, Server, ServerArgument};

const SERVER_COLUMNS: &str = "id, name, url, server_type, is_reachable, disabled";

// ============================================================================
// Server CRUD
// ============================================================================

/// Create a new server together with its arguments.
pub async fn create_server(pool: &SqlitePool, server: &NewServer) -> DbResult<Server> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO servers (name, url, server_type, is_reachable, disabled)
        VALUES (?, ?, ?, 1, ?)
        "#,
    )
    .bind(&server.name)
    .bind(&server.url)
    .bind(&server.server_type)
    .bind(server.disabled)
    .execute(&mut *tx)
    .await
    .map_err(|e| DbError::unique_violation(e, "Server", &server.url))?;

    let id = result.last_insert_rowid();

    if let Some(arguments) = &server.arguments {
        insert_arguments(&mut tx, id, arguments).await?;
    }

    tx.commit().await?;

    get_server(pool, id)
        .await?
        .ok_or_else(|| DbError::not_found("Server", id.to_string()))
}

/// Get a server by ID.
pub async fn get_server(pool: &SqlitePool, id: i64) -> DbResult<Option<Server>> {
    let server = sqlx::query_as::<_, Server>(&format!(
        "SELECT {SERVER_COLUMNS} FROM servers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(server)
}

/// Get a server by its normalized URL.
pub async fn get_server_by_url(pool: &SqlitePool, url: &str) -> DbResult<Option<Server>> {
    let server = sqlx::query_as::<_, Server>(&format!(
        "SELECT {SERVER_COLUMNS} FROM servers WHERE url = ?"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;
    Ok(server)
}

/// List all servers in creation order.
pub async fn list_servers(pool: &SqlitePool) -> DbResult<Vec<Server>> {
    let servers = sqlx::query_as::<_, Server>(&format!(
        "SELECT {SERVER_COLUMNS} FROM servers ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(servers)
}

/// Update a server. Arguments are replaced only when `server.arguments` is set.
pub async fn update_server(pool: &SqlitePool, id: i64, server: &NewServer) -> DbResult<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE servers
        SET name = ?, url = ?, server_type = ?, disabled = ?
        WHERE id = ?
        "#,
    )
    .bind(&server.name)
    .bind(&server.url)
    .bind(&server.server_type)
    .bind(server.disabled)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| DbError::unique_violation(e, "Server", &server.url))?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    if let Some(arguments) = &server.arguments {
        sqlx::query("DELETE FROM server_arguments WHERE server_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_arguments(&mut tx, id, arguments).await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Record whether the server answered the last discovery.
pub async fn set_server_reachable(pool: &SqlitePool, id: i64, reachable: bool) -> DbResult<bool> {
    let result = sqlx::query("UPDATE servers SET is_reachable = ? WHERE id = ?")
        .bind(reachable)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a server. Its arguments and sources go with it.
pub async fn delete_server(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM servers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// ServerArgument
// ============================================================================

/// Get the arguments of a server in their declared order.
pub async fn list_server_arguments(
    pool: &SqlitePool,
    server_id: i64,
) -> DbResult<Vec<ServerArgument>> {
    let arguments = sqlx::query_as::<_, ServerArgument>(
        r#"
        SELECT id, server_id, key, value
        FROM server_arguments WHERE server_id = ?
        ORDER BY position, id
        "#,
    )
    .bind(server_id)
    .fetch_all(pool)
    .await?;
    Ok(arguments)
}

async fn insert_arguments(
    tx: &mut Transaction<'_, Sqlite>,
    server_id: i64,
    arguments: &[NewServerArgument],
) -> DbResult<()> {
    for (position, argument) in arguments.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO server_arguments (server_id, position, key, value)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(server_id)
        .bind(position as i64)
        .bind(&argument.key)
        .bind(&argument.value)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
