mod graph;
mod shape;
mod types;

pub use graph::*;
pub use shape::*;
pub use types::*;
