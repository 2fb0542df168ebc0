//! SSV Schemas - Rule-set store and structural pre-check
//!
//! This crate supplies the data the `ssv-core` rule engine runs on:
//! - **Registry**: loads provider rule sets from the bundled document or a
//!   user-supplied JSON/YAML file, and looks them up by rule-set or provider id
//! - **Structural check**: confirms a document is valid JSON Schema before
//!   any provider rules are applied
//!
//! ## Quick Start
//!
//! ```rust
//! use ssv_schemas::{check_structure, RuleSetRegistry};
//! use serde_json::json;
//!
//! let registry = RuleSetRegistry::bundled().unwrap();
//! let openai = registry.resolve("openai").unwrap();
//!
//! let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
//! assert!(check_structure(&schema).valid);
//!
//! let raw = serde_json::to_string_pretty(&schema).unwrap();
//! let markers = ssv_core::validate(&raw, openai);
//! assert!(!ssv_core::is_compatible(&markers));
//! ```
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod format;
pub mod registry;
pub mod structural;

// Re-export commonly used types for convenience
pub use error::{RegistryError, RegistryResult};
pub use format::Format;
pub use registry::{RuleSetDocument, RuleSetRegistry, RuleSetsMeta, BUNDLED_RULE_SETS};
pub use structural::{check_structure, check_structure_str, StructuralCheck};
