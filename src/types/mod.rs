//! SDK types.

mod batch;
pub use batch::*;

mod call;
pub use call::*;

mod contracts;
pub use contracts::*;

mod permit;
pub use permit::*;

mod token;
pub use token::*;
