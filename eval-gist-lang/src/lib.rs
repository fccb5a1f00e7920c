//! Crate for managing the programming languages known to the sandbox backend.
//!
//! The [`LanguageRegistry`](struct.LanguageRegistry.html) maps a language identifier (the same
//! string sent to the runner, e.g. `"cpp"`) to the configuration of the backend that runs it. A
//! language can be used only if it's present in the registry, marked as enabled and backed by a
//! non-empty image: this check is the feasibility gate consulted before every dispatch.
//!
//! The registry is a plain value: the built-in table is available with
//! [`LanguageRegistry::builtin`](struct.LanguageRegistry.html#method.builtin), a custom one can be
//! loaded from a JSON file or built in code, and it's then shared read-only with the dispatcher.
//!
//! # Example
//!
//! ```
//! use eval_gist_lang::{detect_language, LanguageRegistry};
//!
//! let registry = LanguageRegistry::builtin();
//! let lang = detect_language("sol.cpp").expect("unknown lang");
//! assert!(registry.is_supported(lang));
//! assert!(!registry.is_supported("java"));
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate lazy_static;

mod detect;
mod registry;

pub use detect::detect_language;
pub use registry::{LanguageConfig, LanguageRegistry};
