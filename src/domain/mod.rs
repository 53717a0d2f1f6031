pub mod allocation;
pub mod decision;
pub mod position;
pub mod ticker;

pub use allocation::*;
pub use decision::*;
pub use position::*;
pub use ticker::*;
