pub mod book;
pub mod cart;
pub mod catalog;
pub mod errors;
pub mod value_objects;

pub use book::*;
pub use cart::*;
pub use catalog::*;
pub use errors::*;
pub use value_objects::*;
