//! The shopping list items and the operations clients run on them.

mod db;
mod domain;

pub use db::{
    add_item_quantity_column, check_item, create_item, create_item_table, delete_item,
    get_active_items, update_item_quantity,
};
pub use domain::{Item, ItemId, ItemName, NewItem, Quantity};
