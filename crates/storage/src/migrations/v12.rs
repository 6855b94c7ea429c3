//! Migration v12: drop `penalties_saved_percentage` from advanced goalkeeping
//!
//! Destructive: values stored in that column are gone once this applies.

use rusqlite::Connection;

use super::column_helpers::drop_column_if_exists;

pub(super) fn apply(conn: &Connection) -> rusqlite::Result<()> {
    drop_column_if_exists(conn, "team_squad_keeper_adv_for", "penalties_saved_percentage")?;
    Ok(())
}
