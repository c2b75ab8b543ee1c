pub mod enums;
pub mod source;
pub mod value;

pub use enums::*;
pub use source::*;
pub use value::*;
