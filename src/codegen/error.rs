//! Specific error types for code generation operations

use thiserror::Error;

/// Errors that can occur during constant pool operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConstPoolError {
    #[error("Constant pool is out of space")]
    OutOfSpace,
    #[error("Invalid constant pool index: {0}")]
    InvalidIndex(u16),
}

/// Errors that can occur during bytecode generation
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BytecodeError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Too many local variable slots: {slots}")]
    TooManyLocals { slots: usize },
    #[error("Code size exceeds 65535 bytes")]
    CodeTooLarge,
    #[error("Unsupported expression: {message}")]
    UnsupportedExpression { message: String },
}

/// Errors that can occur during class file generation
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClassGenerationError {
    #[error("Constant pool error: {0}")]
    ConstPool(#[from] ConstPoolError),
    #[error("Bytecode generation error: {0}")]
    Bytecode(#[from] BytecodeError),
    #[error("Duplicate method: {name}{descriptor}")]
    DuplicateMethod { name: String, descriptor: String },
    #[error("Too many bootstrap methods")]
    TooManyBootstrapMethods,
}

/// Generic result type for code generation operations
pub type CodeGenResult<T> = Result<T, ClassGenerationError>;

/// Generic result type for constant pool operations
pub type ConstPoolResult<T> = Result<T, ConstPoolError>;

/// Generic result type for bytecode operations
pub type BytecodeResult<T> = Result<T, BytecodeError>;
