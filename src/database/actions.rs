mod ingredients;
mod recipes;
mod relationships;
mod tags;
mod users;

pub use ingredients::*;
pub use recipes::*;
pub use relationships::*;
pub use tags::*;
pub use users::*;
