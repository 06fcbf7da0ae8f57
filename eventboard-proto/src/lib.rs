//! Shared record model and store wire protocol for `EventBoard`.

pub mod codec;
pub mod record;
pub mod seed;
pub mod store;
