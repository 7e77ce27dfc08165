pub mod points;
pub mod types;

pub use points::{Accrual, AccrualStrategy, CapRoom};
pub use types::Phase;
