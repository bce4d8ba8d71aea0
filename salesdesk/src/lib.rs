//! SalesDesk - admin back office for a field-sales operation
//!
//! This library provides the view readers, mutation workflows and admin REST
//! API behind the SalesDesk server.

pub mod admin;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod deletion;
pub mod editor;
pub mod entity;
pub mod gateway;
pub mod reader;
pub mod role;

#[cfg(test)]
mod testing;
