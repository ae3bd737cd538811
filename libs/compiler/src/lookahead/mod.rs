//! Read-only inspections of an expression tree, run before any code for it is
//! emitted.

mod can_assign;
mod can_branch;
mod is_constant;
mod reads;
mod return_type;

pub use can_assign::can_assign;
pub use can_branch::can_branch;
pub use is_constant::is_constant;
pub use reads::reads;
pub use return_type::{ReturnType, return_type};
