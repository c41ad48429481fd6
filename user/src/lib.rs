mod policy;
mod service;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use policy::{CachedFriendCount, FriendCountPolicy};
pub use service::UserService;
