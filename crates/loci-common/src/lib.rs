pub mod bundle;
pub mod error;
pub mod protocol;
pub mod snapshot;
pub mod target;

pub use bundle::{
    CandidateSelector, ElementSummary, HeuristicBreakdown, ResolutionBundle, ResolutionEntry,
    ResolutionMap, ResolutionStatus, SelectorStrategy,
};
pub use error::BackendError;
pub use snapshot::{AncestorContext, Attributes, ElementSnapshot, FormContext, SiblingText};
pub use target::{SemanticTarget, default_targets};
