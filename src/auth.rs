//! Client credentials, redacted token secrets, and bearer token sources.

pub mod credentials;
pub mod secret;
pub mod source;

pub use credentials::*;
pub use secret::*;
pub use source::*;
