//! indylink: method-reference lowering for a JVM bytecode backend
//!
//! Given a method-reference expression (`Type::member`, `expr::member`,
//! `Type::new`, `Type[]::new`) and the functional interface a type checker
//! inferred for it, this crate resolves the referenced method, synthesizes a
//! factory method where one is needed and emits an `invokedynamic` call site
//! bootstrapped by `LambdaMetafactory.metafactory`.
//!
//! ## Architecture
//!
//! - **ast**: the expression nodes the lowering consumes
//! - **common**: class model, visibility, configuration, errors, contexts
//! - **codegen**: class-file emission layer and the `method_ref` lowering
//! - **verify**: structural checks over emitted call sites
//!
//! ## Lowering Flow
//!
//! ```text
//! MethodReferenceExpr → FunctionalInterfaceSpec → ExactParameters
//!                     → MethodReferenceResolver | ConstructorSynthesizer
//!                     → CallSiteEmitter → invokedynamic + BootstrapMethods entry
//! ```

pub mod ast;
pub mod codegen;
pub mod common;
pub mod verify;

pub use codegen::method_ref::{lower_method_reference, Lowering, MethodRefLowering};
pub use common::config::Config;
pub use common::error::{Error, Result};
