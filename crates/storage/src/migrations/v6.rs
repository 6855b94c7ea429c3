//! Migration v6: report reference and notes columns

use rusqlite::Connection;

use super::column_helpers::add_column_if_not_exists;

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_not_exists(conn, "matches", "report_ref", "TEXT")?;
    add_column_if_not_exists(conn, "matches", "notes", "TEXT")?;
    Ok(())
}
