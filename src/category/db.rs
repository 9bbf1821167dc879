//! Database operations for categories.

use rusqlite::Connection;

use crate::{Error, category::CategoryName};

/// Remember `name` as a category, doing nothing if it has been seen before.
///
/// Returns `true` if a new category row was inserted.
pub fn create_category_if_absent(
    name: &CategoryName,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "INSERT OR IGNORE INTO categories (name) VALUES (?1);",
        (name.as_ref(),),
    )?;

    Ok(rows_affected > 0)
}

/// Retrieve every category name ever used, ordered by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<CategoryName>, Error> {
    connection
        .prepare("SELECT name FROM categories ORDER BY name ASC;")?
        .query_map([], |row| {
            let raw_name: String = row.get(0)?;
            Ok(CategoryName::new_unchecked(&raw_name))
        })?
        .map(|maybe_name| maybe_name.map_err(|error| error.into()))
        .collect()
}

/// Create the category table.
///
/// Categories are not a parent of items: nothing references them and they are
/// never deleted.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );",
    )?;

    Ok(())
}
