//! Code generation module for method references
//!
//! This module holds the class-file emission layer (constant pool, code
//! buffer, attributes) and the lowering of method-reference expressions into
//! `invokedynamic` call sites on top of it.

pub mod attribute;
pub mod class;
pub mod code;
pub mod constpool;
pub mod descriptor;
pub mod error;
pub mod expr_writer;
pub mod method;
pub mod method_ref;
pub mod opcodes;

pub use class::ClassFile;
pub use code::Code;
pub use constpool::{Constant, ConstantPool};
pub use error::{ClassGenerationError, CodeGenResult};
pub use expr_writer::{ExprWriter, ExpressionEmitter};
pub use method_ref::{lower_method_reference, Lowering, MethodRefLowering};
