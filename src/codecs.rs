//! The shipped compressors. Each produces the exact byte stream its
//! target decompressor consumes and checks its cost accounting against
//! the emitted bit count before returning.

mod estpolis;
mod hal;
mod papuwa;
mod super_robot_wars;
mod vpk;

pub use estpolis::estpolis_biography;
pub use hal::{hal, lz3};
pub use papuwa::papuwa;
pub use super_robot_wars::{super_robot_wars, tactics_ogre_2, tenchi_souzou};
pub use vpk::vpk_one_sample;
