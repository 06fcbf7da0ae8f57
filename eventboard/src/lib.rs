//! `EventBoard`: terminal kanban board for event requests.
//!
//! The [`board`] module holds the reconciliation core: column placement,
//! the drag gesture, optimistic moves with rollback, and search filtering.
//! [`remote`] talks to the record store, [`sync`] runs store calls off the
//! UI thread, and [`app`] / [`ui`] make up the terminal front end.

pub mod app;
pub mod board;
pub mod config;
pub mod remote;
pub mod sync;
pub mod ui;
