pub mod candidate;
pub mod catalog;
pub mod components;
pub mod errors;
pub mod range;
pub mod target;

pub use candidate::*;
pub use catalog::*;
pub use components::*;
pub use errors::*;
pub use range::*;
pub use target::*;
