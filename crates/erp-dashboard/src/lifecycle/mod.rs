//! # System Lifecycle & Orchestration
//!
//! Starts one query actor per resource, hands out the typed clients and mounts list
//! screens on top of them.
//!
//! ## Late binding
//!
//! Actors are created without a transport. The transport is injected when each actor
//! starts running (`actor.run(transport)`), so the same system runs against the REST
//! API, the in-memory sample data or a scripted mock.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - closes the sender side of every request channel
//! 2. **Actors detect closure** - `recv()` returns `None` and the run loop ends
//! 3. **Await completion** - every actor task is joined
//!
//! Page containers hold clones of the clients. Drop them before calling
//! [`DashboardSystem::shutdown`], otherwise it waits for them.

use crate::clients::{DepartmentClient, ProductClient, RoleClient, UnitClient};
use crate::columns;
use crate::model::{Department, Product, Role, Unit};
use query_framework::{
    AuthContext, PageContainer, QueryActor, QueryError, ResourceApi, Transport,
};
use std::sync::Arc;
use tracing::{error, info};

/// The runtime of the dashboard: four query actors and their clients.
pub struct DashboardSystem {
    pub department_client: DepartmentClient,
    pub product_client: ProductClient,
    pub unit_client: UnitClient,
    pub role_client: RoleClient,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl DashboardSystem {
    /// Spawns the actors. `channel_buffer` is the request channel capacity of each one.
    pub fn new(transport: Arc<dyn Transport>, channel_buffer: usize) -> Self {
        // 1. Create actors (no transport yet)
        let (department_actor, department_client) = QueryActor::<Department>::new(channel_buffer);
        let (product_actor, product_client) = QueryActor::<Product>::new(channel_buffer);
        let (unit_actor, unit_client) = QueryActor::<Unit>::new(channel_buffer);
        let (role_actor, role_client) = QueryActor::<Role>::new(channel_buffer);

        // 2. Start actors with the shared transport injected
        let handles = vec![
            tokio::spawn(department_actor.run(Arc::clone(&transport))),
            tokio::spawn(product_actor.run(Arc::clone(&transport))),
            tokio::spawn(unit_actor.run(Arc::clone(&transport))),
            tokio::spawn(role_actor.run(transport)),
        ];
        info!(actors = handles.len(), channel_buffer, "Dashboard started");

        Self {
            department_client: DepartmentClient::new(department_client),
            product_client: ProductClient::new(product_client),
            unit_client: UnitClient::new(unit_client),
            role_client: RoleClient::new(role_client),
            handles,
        }
    }

    pub async fn departments_page(
        &self,
        auth: AuthContext,
        page_size: u32,
    ) -> Result<PageContainer<Department>, QueryError> {
        let columns = columns::department_columns(&auth);
        PageContainer::mount(self.department_client.inner().clone(), auth, columns, page_size)
            .await
    }

    pub async fn products_page(
        &self,
        auth: AuthContext,
        page_size: u32,
    ) -> Result<PageContainer<Product>, QueryError> {
        let columns = columns::product_columns(&auth);
        PageContainer::mount(self.product_client.inner().clone(), auth, columns, page_size).await
    }

    pub async fn units_page(
        &self,
        auth: AuthContext,
        page_size: u32,
    ) -> Result<PageContainer<Unit>, QueryError> {
        let columns = columns::unit_columns(&auth);
        PageContainer::mount(self.unit_client.inner().clone(), auth, columns, page_size).await
    }

    pub async fn roles_page(
        &self,
        auth: AuthContext,
        page_size: u32,
    ) -> Result<PageContainer<Role>, QueryError> {
        let columns = columns::role_columns(&auth);
        PageContainer::mount(self.role_client.inner().clone(), auth, columns, page_size).await
    }

    /// Gracefully shuts down every actor.
    ///
    /// Returns an error if any actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down dashboard...");

        // Close all channels by dropping the clients
        drop(self.department_client);
        drop(self.product_client);
        drop(self.unit_client);
        drop(self.role_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Dashboard shutdown complete.");
        Ok(())
    }
}
