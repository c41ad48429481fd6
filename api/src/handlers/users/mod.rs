mod invitation_handlers;
mod user_handlers;

pub use invitation_handlers::*;
pub use user_handlers::*;
