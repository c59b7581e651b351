pub mod key;
pub mod traits;
pub mod value;

pub use key::Key;
pub use traits::Attributes;
pub use value::{DeferredFn, Value};
