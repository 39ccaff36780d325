//! Structural verifiers for emitted class-file parts
//!
//! Checks what the method-reference lowering adds to a class file: constant
//! pool cross references, method handle kinds, the BootstrapMethods table
//! and synthesized methods.

pub mod constant_pool;
pub mod methods;

use crate::codegen::class::ClassFile;

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error(transparent)]
    ConstantPool(#[from] constant_pool::ConstantPoolVerifyError),
    #[error(transparent)]
    Method(#[from] methods::MethodVerifyError),
    #[error("Unsupported class file version {0}: invokedynamic needs 51 or later")]
    UnsupportedVersion(u16),
}

/// Verify call sites and synthesized members of a class file
pub fn verify_call_sites(class_file: &ClassFile) -> VerifyResult<()> {
    if class_file.major_version < 51 && !class_file.bootstrap_methods.is_empty() {
        return Err(VerifyError::UnsupportedVersion(class_file.major_version));
    }
    constant_pool::verify(class_file)?;
    methods::verify(class_file)?;
    Ok(())
}
