//! Tool domain module
//!
//! Schemas, validation and repair of the tool calls a backend model emits.
//!
//! ```text
//! ┌────────────────┐    ┌────────────────┐    ┌─────────────────────┐
//! │ SchemaRegistry │───▶│ ToolValidator  │───▶│ StructuralCorrector │
//! │ (name→schema)  │    │ (missing/extra)│    │ (field-preserving)  │
//! └────────────────┘    └────────────────┘    └─────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SchemaRegistry`]: process-wide, `RwLock`-guarded name → schema map
//!   pre-populated with fallback schemas for the standard tools
//! - [`ToolValidator`]: pure parameter validation and name normalization
//!   (`read_file` → `Read`, `web_search` → `WebSearch`)
//! - [`StructuralCorrector`]: renames mis-keyed values into absent canonical
//!   keys; never overwrites an existing field
//! - [`ToolCall`] / [`ToolDefinition`] / [`ToolSchema`]: the data model

pub mod corrector;
pub mod entities;
pub mod registry;
pub mod validator;

pub use corrector::StructuralCorrector;
pub use entities::{
    EXIT_PLAN_MODE, PropertySchema, TODO_WRITE, ToolCall, ToolClass, ToolDefinition, ToolSchema,
};
pub use registry::SchemaRegistry;
pub use validator::{ToolValidator, ValidationResult};
