//! Identity newtypes, secrets, and the cached login credential.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{cache::*, claims::*, credential::*, secret::*};
