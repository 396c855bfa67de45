//! PHY collision files

mod loader;

pub use loader::apply_phy;
