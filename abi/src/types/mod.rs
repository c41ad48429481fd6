//! database row mappings for the model types
mod friend;
mod user;
