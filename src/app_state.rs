//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// The state of the REST server.
///
/// The database connection is the only state shared between requests.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will bring the database schema up to date before the
    /// connection is shared.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use crate::{
        AppState,
        db::{SCHEMA_VERSION, get_schema_version},
    };

    #[test]
    fn new_initializes_database() {
        let connection = Connection::open_in_memory().unwrap();

        let state = AppState::new(connection).expect("Could not create app state");

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_schema_version(&connection), Ok(SCHEMA_VERSION));
    }
}
