use query_framework::mock::InMemoryBackend;
use query_framework::{Column, HttpMethod, QueryActor, QueryClient, Resource, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct UnitCreate {
    pub name: String,
}

#[derive(Debug, Default, Serialize)]
pub struct UnitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Unit {
    type Id = u32;
    type Create = UnitCreate;
    type Update = UnitUpdate;
    const PATH: &'static str = "units";

    fn id(&self) -> u32 {
        self.id
    }
}

#[allow(dead_code)]
pub fn unit_columns() -> Vec<Column<Unit>> {
    vec![
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("active", "Status").cell(|unit: &Unit| {
            if unit.active { "Active" } else { "Inactive" }.to_string()
        }),
    ]
}

/// A backend with `count` units named `Unit 01`, `Unit 02`, ...
#[allow(dead_code)]
pub fn seeded_backend(count: u32) -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        Unit::PATH,
        (1..=count).map(|i| json!({ "name": format!("Unit {i:02}"), "active": true })),
    );
    backend
}

pub fn spawn_actor(
    transport: Arc<dyn Transport>,
) -> (QueryClient<Unit>, tokio::task::JoinHandle<()>) {
    let (actor, client) = QueryActor::<Unit>::new(32);
    let handle = tokio::spawn(actor.run(transport));
    (client, handle)
}

/// Waits until the backend has seen `expected` listing requests.
#[allow(dead_code)]
pub async fn wait_for_list_calls(backend: &InMemoryBackend, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.call_count(HttpMethod::Get, Unit::PATH) < expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("listing requests did not arrive");
}

/// Waits until `waiting` one-shot callers are parked in the actor.
#[allow(dead_code)]
pub async fn wait_for_waiters(client: &QueryClient<Unit>, waiting: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while client.stats().await.unwrap().waiting < waiting {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("callers did not reach the actor");
}
