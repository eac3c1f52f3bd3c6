pub mod avatar;
pub mod error;
pub mod id;
pub mod time;
pub mod user;

pub use avatar::AvatarRecord;
pub use error::{CoreError, Result};
pub use id::generate_id;
pub use time::{UtcTimestamp, now_utc};
pub use user::{NewUser, Signup, User};
