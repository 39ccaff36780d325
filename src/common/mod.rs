//! Common utilities and definitions shared across modules
//!
//! This module contains the class model, configuration, error definitions,
//! well-known names and generation contexts used by the lowering stage.

pub mod class_manager;
pub mod compilation_context;
pub mod config;
pub mod consts;
pub mod error;
pub mod visibility;

// Re-export commonly used items for convenience
pub use class_manager::{ClassInfo, ClassManager, MethodInfo, Parameter};
pub use compilation_context::{GeneratorContext, MethodContext};
pub use config::Config;
pub use error::{Error, Result};
pub use visibility::{JavaVisibility, VisibilityFilter};
