mod relation;
mod user;

pub(crate) use relation::*;
pub(crate) use user::*;
