mod friend;
mod invitation;
mod user;

pub use friend::*;
pub use invitation::*;
pub use user::*;
