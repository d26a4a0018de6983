//! Loop detection over the trailing conversation.

pub mod detector;
pub mod signature;
pub mod value_objects;

pub use detector::{LoopDetector, LoopPolicy};
pub use signature::{call_signature, canonicalize, turn_signature};
pub use value_objects::{LoopDetection, LoopEvidence, LoopType};
