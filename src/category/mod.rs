//! Category names remembered for client-side suggestions.

mod db;
mod domain;

pub use db::{create_category_if_absent, create_category_table, get_all_categories};
pub use domain::CategoryName;
