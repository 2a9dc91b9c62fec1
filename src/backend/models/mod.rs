pub mod term;
pub mod value;

pub use term::{FrameId, Node, Op, Term};
pub use value::{ParseValueError, Value};
