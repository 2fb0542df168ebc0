//! SSV Core - Provider rule engine for LLM structured-output schemas
//!
//! LLM providers each accept a different subset of JSON Schema in their
//! structured-output modes. This crate checks a schema against one provider's
//! [`RuleSet`] and rewrites it so that provider accepts it.
//!
//! # Main Components
//!
//! - **Validator**: walks raw schema text and returns line/column anchored
//!   [`Marker`]s for every capability violation
//! - **Fixer**: clones a parsed schema, applies mechanical rewrites, and
//!   reports what was fixed, what was lost, and what could not be fixed
//! - **Rule sets**: declarative per-provider capability tables
//! - **Reports**: compatibility summaries across several providers
//!
//! Both the validator and the fixer are pure: no I/O, no state kept between
//! calls, and capability violations are returned as data rather than errors.
//! `$ref` targets are checked for keyword support but never dereferenced.
//!
//! # Example
//!
//! ```
//! use ssv_core::{fix, validate, RuleSet};
//! use serde_json::json;
//!
//! let rules = RuleSet::new("example", "openai")
//!     .with_type("object", ["properties", "required", "additionalProperties"])
//!     .with_type("string", ["description"])
//!     .with_additional_properties_false(true);
//!
//! let raw = r#"{"type": "object", "properties": {"a": {"type": "string"}}}"#;
//! let markers = validate(raw, &rules);
//! assert_eq!(markers.len(), 1);
//!
//! let schema: serde_json::Value = serde_json::from_str(raw).unwrap();
//! let result = fix(&schema, &rules);
//! assert_eq!(result.fixed_schema["additionalProperties"], json!(false));
//! ```
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod fixer;
pub mod keywords;
pub mod pointer;
pub mod report;
pub mod resolver;
pub mod rule_set;
pub mod source_map;
pub mod stats;
pub mod types;
pub mod validator;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use fixer::{fix, fix_str, AppliedFix, FixKind, FixResult, UnresolvedError};
pub use report::{CompatibilityReport, Location, ProviderResult, ReportEntry};
pub use resolver::{resolve_type, ResolvedType};
pub use rule_set::{CompositionSupport, RootType, RuleIndex, RuleSet, SizeLimits, SupportedType};
pub use source_map::SourceMap;
pub use stats::SchemaStats;
pub use types::{Diagnostic, IssueKind, Marker, Severity};
pub use validator::{diagnose, is_compatible, validate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
