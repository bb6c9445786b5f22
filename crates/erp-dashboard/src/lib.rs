//! # ERP Dashboard Library
//!
//! The list screens of the dashboard (departments, products, units and roles) built on
//! `query_framework`. Exposed as a library for integration testing.

pub mod clients;
pub mod columns;
pub mod config;
pub mod demo;
pub mod lifecycle;
pub mod model;
