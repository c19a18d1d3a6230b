//! Login, registration and the stored session.

mod client;
mod session;
mod validation;

pub use client::{error_message_from_detail, AuthClient};
pub use session::*;
pub use validation::*;
