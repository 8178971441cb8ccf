pub mod policy;
pub mod synthesizer;
pub mod verifier;

pub use policy::{derive_status, fallbacks, select_primary};
pub use synthesizer::{ATTR_PRIORITY, build_candidates, escape_value};
pub use verifier::{SelectorError, SelectorQuery, verify_candidates};
