//! ANI animation files

mod loader;
mod quat;

pub use loader::load_ani;
pub use quat::decompress_quat;
