//! # usher-service
//!
//! Application services for the usher provisioning server: the avatar
//! resolver and the user provisioning workflow. Both orchestrate the
//! storage traits and remote gateways and own no state of their own.

pub mod avatars;
pub mod error;
pub mod provisioning;

pub use avatars::AvatarService;
pub use error::{AvatarError, ProvisionError};
pub use provisioning::ProvisioningService;
