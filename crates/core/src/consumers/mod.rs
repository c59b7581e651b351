pub mod accessors;
pub mod consumer;
pub mod consumer_type;
pub mod declaration;

pub use accessors::*;
pub use consumer::*;
pub use consumer_type::*;
pub use declaration::*;
