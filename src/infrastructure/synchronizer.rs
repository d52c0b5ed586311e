// Replace-all synchronization of many-to-many association tables.
//
// `synchronize` deletes every row of a parent and re-inserts the desired
// child set in ascending id order. It runs on a borrowed connection so the
// caller decides the transaction: the scalar update of the parent and all of
// its association tables commit or roll back together.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{db_error, AppResult};

/// Names of an association table and its two key columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationTable {
    pub table: &'static str,
    pub parent_column: &'static str,
    pub child_column: &'static str,
}

pub const FILM_GENRES: AssociationTable = AssociationTable {
    table: "film_genre",
    parent_column: "film_id",
    child_column: "genre_id",
};

pub const FILM_LIKES: AssociationTable = AssociationTable {
    table: "likes",
    parent_column: "film_id",
    child_column: "user_id",
};

/// Outgoing friendship edges; `status` falls back to the column default
pub const FRIENDSHIPS: AssociationTable = AssociationTable {
    table: "friendships",
    parent_column: "user_id",
    child_column: "friend_id",
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removed: u64,
    pub inserted: u64,
}

/// Make the rows of `table` for `parent_id` exactly `desired`.
///
/// An empty `desired` only deletes. A child id that violates a foreign key
/// surfaces as `IntegrityViolation`; the caller's transaction must then be
/// dropped so the delete phase is rolled back as well.
pub async fn synchronize<I>(
    conn: &mut SqliteConnection,
    table: &AssociationTable,
    parent_id: i64,
    desired: I,
) -> AppResult<SyncReport>
where
    I: IntoIterator<Item = i64>,
{
    let desired: BTreeSet<i64> = desired.into_iter().collect();

    let delete_sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        table.table, table.parent_column
    );
    let removed = sqlx::query(&delete_sql)
        .bind(parent_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to clear association rows"))?
        .rows_affected();

    let mut report = SyncReport {
        removed,
        inserted: 0,
    };
    if desired.is_empty() {
        debug!(table = table.table, parent_id, removed, "association set cleared");
        return Ok(report);
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "INSERT INTO {} ({}, {}) ",
        table.table, table.parent_column, table.child_column
    ));
    qb.push_values(desired.iter(), |mut row, child_id| {
        row.push_bind(parent_id).push_bind(*child_id);
    });
    report.inserted = qb
        .build()
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to insert association rows"))?
        .rows_affected();

    debug!(
        table = table.table,
        parent_id,
        removed = report.removed,
        inserted = report.inserted,
        "association set synchronized"
    );
    Ok(report)
}

/// In-memory counterpart: replace `current` with the distinct `desired` ids.
pub fn replace_all<I>(current: &mut BTreeSet<i64>, desired: I) -> SyncReport
where
    I: IntoIterator<Item = i64>,
{
    let desired: BTreeSet<i64> = desired.into_iter().collect();
    let report = SyncReport {
        removed: current.len() as u64,
        inserted: desired.len() as u64,
    };
    *current = desired;
    report
}
