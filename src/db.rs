//! Opening the application database and bringing its schema up to date.
//!
//! The schema version is stored in SQLite's `user_version` pragma. Each entry
//! in [MIGRATIONS] moves the schema forward by one version and is applied at
//! most once, so [initialize] can be run every time the server starts.

use std::{path::Path, time::Duration};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    category::create_category_table,
    item::{add_item_quantity_column, create_item_table},
};

/// How long a statement waits for another connection's write lock before
/// failing with [Error::DatabaseBusy].
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Migration = fn(&Connection) -> Result<(), rusqlite::Error>;

/// The schema changes in the order they must be applied.
///
/// Never edit or reorder an entry once released, only append new ones.
const MIGRATIONS: &[(&str, Migration)] = &[
    ("create items and categories", create_tables),
    ("add item quantity", add_item_quantity_column),
];

/// The schema version of a database with every migration applied.
pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

fn create_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_item_table(connection)?;
    create_category_table(connection)
}

/// Open the database file at `path`, creating it if needed, and apply the
/// contention `busy_timeout`.
///
/// # Errors
/// Returns an error if the file cannot be opened or configured, e.g. because
/// the directory does not exist or the file is not a SQLite database.
pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    connection.busy_timeout(busy_timeout)?;

    Ok(connection)
}

/// Bring the database schema up to date.
///
/// Running this against a database that is already at [SCHEMA_VERSION] does
/// nothing. Databases created before versioning was introduced report version
/// zero and are adopted by the migrations, which tolerate tables and columns
/// that already exist.
///
/// # Errors
/// Returns an error if a migration fails, in which case that migration is
/// rolled back and the later ones are not attempted.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let version = get_schema_version(&transaction)?;

    if version > SCHEMA_VERSION {
        tracing::warn!(
            "The database schema version {version} is newer than the latest known version {SCHEMA_VERSION}"
        );
    }

    for (index, &(description, migration)) in MIGRATIONS.iter().enumerate() {
        let target_version = index as i64 + 1;

        if target_version <= version {
            continue;
        }

        tracing::info!("Migrating database to version {target_version}: {description}");
        migration(&transaction)?;
        transaction.pragma_update(None, "user_version", target_version)?;
    }

    transaction.commit()?;

    Ok(())
}

/// Get the schema version recorded in the database.
pub fn get_schema_version(connection: &Connection) -> Result<i64, Error> {
    connection
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|error| error.into())
}
