pub mod dose_log;
pub mod enums;
pub mod medication;
pub mod patient;
pub mod session;
pub mod vital_sign;

pub use dose_log::*;
pub use enums::*;
pub use medication::*;
pub use patient::*;
pub use session::*;
pub use vital_sign::*;
