//! User domain entities.

pub mod directory;
pub mod model;

pub use directory::UserDirectory;
pub use model::{CreateUser, UpdateProfile, User};
