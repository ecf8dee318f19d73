//! Private and public key handling.
//!
//! Key text is read from ordered [`KeySource`]s, classified by its PEM label
//! and rewrapped into PKCS#8 when it arrives as a bare SEC1 or PKCS#1
//! structure. Everything downstream works on [`NormalizedKey`].

pub mod der;
pub mod loader;
pub mod normalize;
pub mod pem;
pub(crate) mod private;
pub mod public;
pub mod source;

pub use loader::*;
pub use normalize::*;
pub use public::*;
pub use source::*;
