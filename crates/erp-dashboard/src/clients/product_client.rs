//! # Product Client
//!
//! Provides a high-level API for interacting with the `Product` query actor.
//! Prices and stock levels are validated here, before anything is sent.

use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use async_trait::async_trait;
use query_framework::{ListQuery, QueryClient, QueryError, ResourceApi};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("{0}")]
    Rejected(String),

    /// Prices must be finite and not negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Server returned no product")]
    MissingRecord,

    #[error("{0}")]
    Forbidden(String),

    #[error("Product service unavailable: {0}")]
    Unavailable(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<QueryError> for ProductError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Http { status: 404 } => Self::NotFound,
            QueryError::Rejected(message) => Self::Rejected(message),
            QueryError::Forbidden { .. } => Self::Forbidden(e.to_string()),
            QueryError::Transport(_) | QueryError::Http { .. } | QueryError::Decode(_) => {
                Self::Unavailable(e.to_string())
            }
            QueryError::ActorClosed | QueryError::ActorDropped | QueryError::Table(_) => {
                Self::ActorCommunicationError(e.to_string())
            }
        }
    }
}

fn check_price(price: f64) -> Result<(), ProductError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(ProductError::InvalidPrice(price))
    }
}

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: QueryClient<Product>,
}

impl ProductClient {
    pub fn new(inner: QueryClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ResourceApi<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &QueryClient<Product> {
        &self.inner
    }

    fn map_error(e: QueryError) -> Self::Error {
        ProductError::from(e)
    }
}

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        check_price(params.price)?;
        debug!("Sending request");
        self.inner
            .create(params)
            .await?
            .data
            .ok_or(ProductError::MissingRecord)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        if let Some(price) = update.price {
            check_price(price)?;
        }
        debug!("Sending request");
        self.inner
            .update(id, update)
            .await?
            .data
            .ok_or(ProductError::MissingRecord)
    }

    /// Changes the price of a product.
    #[instrument(skip(self))]
    pub async fn set_price(&self, id: ProductId, price: f64) -> Result<Product, ProductError> {
        let update = ProductUpdate {
            price: Some(price),
            ..ProductUpdate::default()
        };
        self.update_product(id, update).await
    }

    /// Sets the stock level after a count.
    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: ProductId, stock: u32) -> Result<Product, ProductError> {
        let update = ProductUpdate {
            stock: Some(stock),
            ..ProductUpdate::default()
        };
        self.update_product(id, update).await
    }

    /// Products on one listing page whose stock is at or below `threshold`.
    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        query: ListQuery,
        threshold: u32,
    ) -> Result<Vec<Product>, ProductError> {
        let page = self.list(query).await?;
        Ok(page
            .rows
            .into_iter()
            .filter(|product| product.is_low_stock(threshold))
            .collect())
    }
}
