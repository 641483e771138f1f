//! Adapters: concrete implementations of the port traits that live on
//! this side of the boundary. Board and stack adapters belong to the
//! platform crate that embeds the core.

pub mod log_sink;
