#![doc = include_str!("../README.md")]

pub mod allocator;
pub mod rewrite;

pub use allocator::{PortManager, is_port_conflict, validate_port_range};
pub use rewrite::{
    PortRewrite, ServerBinding, read_server_binding, resolve_port_conflict, rewrite_server_port,
};
