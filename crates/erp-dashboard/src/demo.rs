//! Sample records for running the dashboard without an API server.

use crate::model::{Department, Product, Role, Unit};
use query_framework::mock::InMemoryBackend;
use query_framework::Resource;
use serde_json::json;

const DEPARTMENTS: [&str; 12] = [
    "Finance",
    "Human Resources",
    "Sales",
    "Purchasing",
    "Production",
    "Logistics",
    "Marketing",
    "Legal",
    "Customer Care",
    "Quality Assurance",
    "Research",
    "Facilities",
];

/// A backend seeded with departments, units, products and roles.
pub fn seeded_backend() -> InMemoryBackend {
    let backend = InMemoryBackend::new();

    backend.seed(
        Department::PATH,
        DEPARTMENTS.iter().enumerate().map(|(i, name)| {
            json!({
                "name": name,
                "description": null,
                "employeeCount": (i + 1) * 3,
                "isActive": i % 5 != 4,
            })
        }),
    );

    backend.seed(
        Unit::PATH,
        [("Piece", "pc"), ("Box", "box"), ("Kilogram", "kg"), ("Litre", "l")].map(
            |(name, short)| json!({ "name": name, "shortName": short, "isActive": true }),
        ),
    );

    backend.seed(
        Product::PATH,
        [
            ("PEN-BLU", "Ballpoint pen", 0.8, 540, 1, "Piece"),
            ("PAP-A4", "A4 paper", 4.25, 35, 2, "Box"),
            ("COF-BEAN", "Coffee beans", 18.9, 6, 3, "Kilogram"),
            ("OIL-1L", "Olive oil", 7.5, 12, 4, "Litre"),
        ]
        .map(|(sku, name, price, stock, unit_id, unit)| {
            json!({
                "sku": sku,
                "name": name,
                "price": price,
                "stock": stock,
                "unit": { "id": unit_id, "name": unit },
                "isActive": true,
            })
        }),
    );

    backend.seed(
        Role::PATH,
        [
            json!({
                "name": "Administrator",
                "description": "Everything",
                "permissions": ["departments:*", "products:*", "units:*", "roles:*"],
            }),
            json!({
                "name": "Storekeeper",
                "permissions": ["products:view", "products:update", "units:view"],
            }),
            json!({
                "name": "Auditor",
                "permissions": ["departments:view", "products:view", "units:view", "roles:view"],
            }),
        ],
    );

    backend
}
