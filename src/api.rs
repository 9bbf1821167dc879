//! The endpoint that dispatches each request to exactly one action.
//!
//! Reads select their action with the query string, e.g. `GET /api?action=list`.
//! Writes send their fields as a URL encoded form body and may put the action
//! in either the body or the query string.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    body::Bytes,
    extract::{FromRef, RawQuery, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    action::{AddItemRequest, ApiParams, ApiRequest, UpdateQuantityRequest},
    item::{
        Item, NewItem, check_item, create_item, delete_item, get_active_items,
        update_item_quantity,
    },
};

/// The state needed for serving the API.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response to the list action.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<Item>,
}

/// The response to actions that do not return data.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

/// Handle a read request.
///
/// Only the list action may be sent this way, so a crawler or link prefetcher
/// can never change the list.
pub async fn get_api_endpoint(
    State(state): State<ApiState>,
    RawQuery(query): RawQuery,
) -> Response {
    match parse_get_request(query.as_deref()) {
        Ok(request) => run_request(request, &state),
        Err(error) => error.into_response(),
    }
}

/// Handle a write request.
pub async fn post_api_endpoint(
    State(state): State<ApiState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    match parse_post_request(query.as_deref(), &body) {
        Ok(request) => run_request(request, &state),
        Err(error) => error.into_response(),
    }
}

fn parse_query(query: Option<&str>) -> Result<ApiParams, Error> {
    ApiParams::from_form_bytes(query.unwrap_or_default().as_bytes())
}

fn parse_get_request(query: Option<&str>) -> Result<ApiRequest, Error> {
    let params = parse_query(query)?;
    let action = params.action()?;

    if !action.is_read_only() {
        return Err(Error::MethodNotAllowed(action.to_string()));
    }

    ApiRequest::parse(action, &params)
}

/// The action is looked up in the query string first and then in the body.
/// All other fields come from the body.
fn parse_post_request(query: Option<&str>, body: &[u8]) -> Result<ApiRequest, Error> {
    let query = parse_query(query)?;
    let mut params = ApiParams::from_form_bytes(body)?;

    if query.action.is_some() {
        params.action = query.action;
    }

    let action = params.action()?;

    ApiRequest::parse(action, &params)
}

fn run_request(request: ApiRequest, state: &ApiState) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let action = request.action();

    execute_request(request, &connection).unwrap_or_else(|error| {
        tracing::debug!("The {action} action failed: {error}");
        error.into_response()
    })
}

/// Apply `request` to the database and build the success response.
fn execute_request(request: ApiRequest, connection: &Connection) -> Result<Response, Error> {
    let response = match request {
        ApiRequest::List => {
            let items = get_active_items(connection)?;

            Json(ItemList { items }).into_response()
        }
        ApiRequest::Add(AddItemRequest {
            name,
            category,
            quantity,
        }) => {
            let item = create_item(NewItem::new(name, category, quantity), connection)?;
            tracing::info!(
                "Added {}x \"{}\" to \"{}\" with ID {}",
                item.quantity,
                item.name,
                item.category,
                item.id
            );

            Json(item).into_response()
        }
        ApiRequest::Check(item_id) => {
            check_item(item_id, connection)?;
            tracing::info!("Checked item {item_id}");

            Json(Success { success: true }).into_response()
        }
        ApiRequest::Delete(item_id) => {
            delete_item(item_id, connection)?;
            tracing::info!("Deleted item {item_id}");

            Json(Success { success: true }).into_response()
        }
        ApiRequest::UpdateQuantity(UpdateQuantityRequest { id, quantity }) => {
            update_item_quantity(id, quantity, connection)?;
            tracing::info!("Set the quantity of item {id} to {quantity}");

            Json(Success { success: true }).into_response()
        }
    };

    Ok(response)
}
