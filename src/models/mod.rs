pub mod dashboard;
pub mod vital_sign;

pub use dashboard::*;
pub use vital_sign::*;
