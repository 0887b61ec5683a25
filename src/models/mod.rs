//! Data models for the PhotoShare application.
//!
//! Users, photos and the tag join records that relate them.

mod datetime;
mod photo;
mod tag;
mod user;

pub use datetime::*;
pub use photo::*;
pub use tag::*;
pub use user::*;
