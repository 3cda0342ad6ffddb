pub(super) mod error;
pub(super) mod supply;

pub use error::SupplyError;
pub use supply::{SupplyHandler, SupplyQuery};
