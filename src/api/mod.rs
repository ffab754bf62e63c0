pub mod portal;

pub use portal::{NetworkFailure, PortalApi, PortalClient};
