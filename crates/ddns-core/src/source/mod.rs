//! Built-in IP source implementations
//!
//! - [`StaticIpSource`]: returns a fixed address
//! - [`DualStackSource`]: routes each record type to its own source

mod dual_stack;
mod static_ip;

pub use dual_stack::DualStackSource;
pub use static_ip::{StaticFactory, StaticIpSource};
