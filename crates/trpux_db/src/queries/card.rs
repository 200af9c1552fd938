//! Card type, source type and compatibility queries.
//!
//! Everything here is written as an upsert: seeding the catalog from parser
//! declarations may run on every start and must never duplicate rows.

use std::collections::HashMap;

use sqlx::{FromRow, SqlitePool};

use crate::error::{DbError, DbResult};
use crate::models::{CardType, Compatibility, SourceType};

// ============================================================================
// SourceType
// ============================================================================

/// List all source types.
pub async fn list_source_types(pool: &SqlitePool) -> DbResult<Vec<SourceType>> {
    let types = sqlx::query_as::<_, SourceType>("SELECT id, name FROM source_types ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(types)
}

/// Get a source type by name.
pub async fn get_source_type_by_name(
    pool: &SqlitePool,
    name: &str,
) -> DbResult<Option<SourceType>> {
    let source_type =
        sqlx::query_as::<_, SourceType>("SELECT id, name FROM source_types WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(source_type)
}

/// Get the source type with this name, creating it if needed.
pub async fn ensure_source_type(pool: &SqlitePool, name: &str) -> DbResult<SourceType> {
    sqlx::query("INSERT INTO source_types (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(pool)
        .await?;

    get_source_type_by_name(pool, name)
        .await?
        .ok_or_else(|| DbError::not_found("SourceType", name))
}

/// Delete a source type. Sources of this type keep existing with no type.
pub async fn delete_source_type(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM source_types WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// CardType
// ============================================================================

/// List all card types.
pub async fn list_card_types(pool: &SqlitePool) -> DbResult<Vec<CardType>> {
    let types = sqlx::query_as::<_, CardType>(
        "SELECT id, name, can_be_aggregated FROM card_types ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(types)
}

/// Get a card type by name.
pub async fn get_card_type_by_name(pool: &SqlitePool, name: &str) -> DbResult<Option<CardType>> {
    let card_type = sqlx::query_as::<_, CardType>(
        "SELECT id, name, can_be_aggregated FROM card_types WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(card_type)
}

/// Get the card type with this name, creating it if needed.
///
/// An existing card type keeps its aggregation flag.
pub async fn ensure_card_type(
    pool: &SqlitePool,
    name: &str,
    can_be_aggregated: bool,
) -> DbResult<CardType> {
    sqlx::query(
        r#"
        INSERT INTO card_types (name, can_be_aggregated) VALUES (?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(can_be_aggregated)
    .execute(pool)
    .await?;

    get_card_type_by_name(pool, name)
        .await?
        .ok_or_else(|| DbError::not_found("CardType", name))
}

// ============================================================================
// Compatibility
// ============================================================================

#[derive(Debug, FromRow)]
struct CompatibilityRow {
    id: i64,
    card_type_id: i64,
    card_type_name: String,
    can_be_aggregated: bool,
}

#[derive(Debug, FromRow)]
struct CompatibilityLinkRow {
    compatibility_id: i64,
    id: i64,
    name: String,
}

/// List all compatibility records with their card and source types loaded.
pub async fn list_compatibilities(pool: &SqlitePool) -> DbResult<Vec<Compatibility>> {
    let rows = sqlx::query_as::<_, CompatibilityRow>(
        r#"
        SELECT c.id, ct.id AS card_type_id, ct.name AS card_type_name, ct.can_be_aggregated
        FROM compatibilities c
        JOIN card_types ct ON ct.id = c.card_type_id
        ORDER BY c.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let links = sqlx::query_as::<_, CompatibilityLinkRow>(
        r#"
        SELECT cs.compatibility_id, st.id, st.name
        FROM compatibility_source_types cs
        JOIN source_types st ON st.id = cs.source_type_id
        ORDER BY cs.compatibility_id, st.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut source_types: HashMap<i64, Vec<SourceType>> = HashMap::new();
    for link in links {
        source_types
            .entry(link.compatibility_id)
            .or_default()
            .push(SourceType {
                id: link.id,
                name: link.name,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| Compatibility {
            id: row.id,
            card_type: CardType {
                id: row.card_type_id,
                name: row.card_type_name,
                can_be_aggregated: row.can_be_aggregated,
            },
            source_types: source_types.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}

/// Get the compatibility record of a card type.
pub async fn get_compatibility_for_card(
    pool: &SqlitePool,
    card_type_id: i64,
) -> DbResult<Option<Compatibility>> {
    Ok(list_compatibilities(pool)
        .await?
        .into_iter()
        .find(|c| c.card_type.id == card_type_id))
}

/// Add source types to a card type's compatibility record, creating the record
/// if needed. Already linked source types are left alone.
pub async fn link_compatibility(
    pool: &SqlitePool,
    card_type_id: i64,
    source_type_ids: &[i64],
) -> DbResult<Compatibility> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO compatibilities (card_type_id) VALUES (?) \
         ON CONFLICT(card_type_id) DO NOTHING",
    )
    .bind(card_type_id)
    .execute(&mut *tx)
    .await?;

    let (compatibility_id,): (i64,) =
        sqlx::query_as("SELECT id FROM compatibilities WHERE card_type_id = ?")
            .bind(card_type_id)
            .fetch_one(&mut *tx)
            .await?;

    for source_type_id in source_type_ids {
        sqlx::query(
            r#"
            INSERT INTO compatibility_source_types (compatibility_id, source_type_id)
            VALUES (?, ?)
            ON CONFLICT(compatibility_id, source_type_id) DO NOTHING
            "#,
        )
        .bind(compatibility_id)
        .bind(source_type_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_compatibility_for_card(pool, card_type_id)
        .await?
        .ok_or_else(|| DbError::not_found("Compatibility", card_type_id.to_string()))
}
