#[macro_use]
extern crate serde;

mod abi;
mod address;
mod deployment;
mod election;
mod error;
mod registry;
mod stage;
mod store;

pub use abi::*;
pub use address::*;
pub use deployment::*;
pub use election::*;
pub use error::*;
pub use registry::*;
pub use stage::*;
pub use store::*;
