//! Data models

pub mod user;
pub mod device;

pub use user::*;
pub use device::*;
