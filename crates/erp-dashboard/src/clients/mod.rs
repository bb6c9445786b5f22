//! Type-safe wrappers around [`QueryClient`](query_framework::QueryClient).
//!
//! Each client maps [`QueryError`](query_framework::QueryError) into its own error enum
//! and gets `list`, `subscribe`, `delete` and `invalidate` from
//! [`ResourceApi`](query_framework::ResourceApi).

pub mod department_client;
pub mod product_client;
pub mod role_client;
pub mod unit_client;

pub use department_client::*;
pub use product_client::*;
pub use role_client::*;
pub use unit_client::*;
