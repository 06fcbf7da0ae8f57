//! `EventBoard` record store server library.
//!
//! Exposes the store server for use in tests and embedding. The server
//! accepts WebSocket connections, serves record fetches, and persists
//! workflow status updates.

pub mod config;
pub mod records;
pub mod server;
