pub mod errors;
pub mod position;
pub mod record;

pub use errors::*;
pub use position::*;
pub use record::*;
