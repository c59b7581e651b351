pub mod global;
pub mod lazy;
pub mod many;
pub mod one;
pub mod provider;

pub use global::*;
pub use lazy::*;
pub use many::*;
pub use one::*;
pub use provider::*;
