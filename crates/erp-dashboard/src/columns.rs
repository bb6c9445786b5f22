//! Column sets of the list screens.
//!
//! Plain fields are read by accessor key. Badges, prices and the row actions are
//! rendered by `cell` functions.

use crate::model::{Department, Product, Role, Unit};
use query_framework::{AuthContext, Column, Header, PermissionAction, Resource};

pub fn status_badge(active: bool) -> String {
    if active { "Active" } else { "Inactive" }.to_string()
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// The row buttons the user may press, e.g. `Edit | Delete`.
///
/// Buttons are decided once, when the columns are built for a signed-in user.
pub fn actions_column<R: Resource>(auth: &AuthContext) -> Column<R> {
    let mut actions = Vec::new();
    if auth.allows(R::PATH, PermissionAction::Update) {
        actions.push("Edit");
    }
    if auth.allows(R::PATH, PermissionAction::Delete) {
        actions.push("Delete");
    }
    let label = actions.join(" | ");
    Column::new("actions", "Actions").cell(move |_: &R| label.clone())
}

pub fn department_columns(auth: &AuthContext) -> Vec<Column<Department>> {
    vec![
        Column::new("name", "Name"),
        Column::new("description", "Description"),
        Column::new("employeeCount", "Employees"),
        Column::new("isActive", "Status").cell(|d: &Department| status_badge(d.is_active)),
        actions_column(auth),
    ]
}

pub fn product_columns(auth: &AuthContext) -> Vec<Column<Product>> {
    vec![
        Column::new("sku", "SKU"),
        Column::new("name", "Name"),
        Column::new("unit.name", "Unit"),
        Column::new("price", Header::render(|| "Price".to_string()))
            .cell(|p: &Product| format_price(p.price)),
        Column::new("stock", "Stock"),
        Column::new("isActive", "Status").cell(|p: &Product| status_badge(p.is_active)),
        actions_column(auth),
    ]
}

pub fn unit_columns(auth: &AuthContext) -> Vec<Column<Unit>> {
    vec![
        Column::new("name", "Name"),
        Column::new("shortName", "Short name"),
        Column::new("isActive", "Status").cell(|u: &Unit| status_badge(u.is_active)),
        actions_column(auth),
    ]
}

pub fn role_columns(auth: &AuthContext) -> Vec<Column<Role>> {
    vec![
        Column::new("name", "Name"),
        Column::new("description", "Description"),
        Column::new("permissions", "Grants").cell(|r: &Role| r.permissions.len().to_string()),
        actions_column(auth),
    ]
}
