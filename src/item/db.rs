//! Database operations for shopping list items.

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    category::{CategoryName, create_category_if_absent},
    item::{Item, ItemId, ItemName, NewItem, Quantity, domain::unix_timestamp_millis},
};

/// Create an item and return it with its generated ID.
///
/// The item's category is remembered in the same transaction, so either both
/// rows are written or neither is.
pub fn create_item(new_item: NewItem, connection: &Connection) -> Result<Item, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    transaction.execute(
        "INSERT INTO items (name, category, checked, created_at, quantity)
        VALUES (?1, ?2, 0, ?3, ?4);",
        (
            new_item.name.as_ref(),
            new_item.category.as_ref(),
            unix_timestamp_millis(new_item.created_at),
            new_item.quantity.get(),
        ),
    )?;

    let id = transaction.last_insert_rowid();

    if create_category_if_absent(&new_item.category, &transaction)? {
        tracing::debug!("Remembered new category \"{}\"", new_item.category);
    }

    transaction.commit()?;

    Ok(Item {
        id,
        name: new_item.name,
        category: new_item.category,
        quantity: new_item.quantity,
    })
}

/// Retrieve all unchecked items ordered by category and then by name.
///
/// Text is compared byte-wise, so upper case sorts before lower case.
pub fn get_active_items(connection: &Connection) -> Result<Vec<Item>, Error> {
    connection
        .prepare(
            "SELECT id, name, category, quantity FROM items
            WHERE checked = 0
            ORDER BY category ASC, name ASC, id ASC;",
        )?
        .query_map([], map_row)?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

/// Mark an item as checked off so it no longer appears on the list.
///
/// Checking an item that is already checked or does not exist is not an error.
pub fn check_item(item_id: ItemId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("UPDATE items SET checked = 1 WHERE id = ?1;", [item_id])?;

    if rows_affected == 0 {
        tracing::debug!("Tried to check item {item_id}, but it does not exist");
    }

    Ok(())
}

/// Delete an item by ID. Deleting an item that does not exist is not an error.
pub fn delete_item(item_id: ItemId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM items WHERE id = ?1;", [item_id])?;

    if rows_affected == 0 {
        tracing::debug!("Tried to delete item {item_id}, but it does not exist");
    }

    Ok(())
}

/// Set the quantity of an item, whether or not it has been checked.
///
/// Updating an item that does not exist is not an error.
pub fn update_item_quantity(
    item_id: ItemId,
    quantity: Quantity,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE items SET quantity = ?1 WHERE id = ?2;",
        (quantity.get(), item_id),
    )?;

    if rows_affected == 0 {
        tracing::debug!("Tried to set the quantity of item {item_id}, but it does not exist");
    }

    Ok(())
}

/// Create the item table as it was before quantities were tracked.
///
/// `AUTOINCREMENT` stops SQLite from reusing the ID of the most recently
/// deleted item.
pub fn create_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            checked INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL DEFAULT 0
        );",
    )?;

    Ok(())
}

/// Add the quantity column to the item table, setting existing items to one.
///
/// Databases created by the PHP backend may already have the column, in which
/// case nothing is changed.
pub fn add_item_quantity_column(connection: &Connection) -> Result<(), rusqlite::Error> {
    let has_quantity: bool = connection.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('items') WHERE name = 'quantity';",
        [],
        |row| row.get(0),
    )?;

    if !has_quantity {
        connection.execute_batch(
            "ALTER TABLE items ADD COLUMN quantity INTEGER NOT NULL DEFAULT 1;",
        )?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Item, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let raw_category: String = row.get(2)?;
    let raw_quantity: i64 = row.get(3)?;

    Ok(Item {
        id,
        name: ItemName::new_unchecked(&raw_name),
        category: CategoryName::new_unchecked(&raw_category),
        quantity: Quantity::new(raw_quantity),
    })
}
