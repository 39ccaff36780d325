use crate::codegen::class::ClassFile;
use crate::codegen::constpool::Constant;
use crate::codegen::method::MethodInfo;
use crate::codegen::opcodes::{self, access_flags::*};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MethodVerifyError {
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("Invalid method access flags: 0x{0:04x}")]
    InvalidMethodAccessFlags(u16),
    #[error("Method must have Code attribute unless abstract")]
    MissingCodeAttribute,
    #[error("Abstract method must not have Code attribute")]
    ForbiddenCodeAttribute,
    #[error("Duplicate method attribute: {0}")]
    DuplicateMethodAttribute(String),
    #[error("Method code does not end with a return instruction")]
    MissingReturn,
}

pub type Result<T> = std::result::Result<T, MethodVerifyError>;

/// Verify the ClassFile methods
pub fn verify(class_file: &ClassFile) -> Result<()> {
    for method in &class_file.methods {
        verify_access_flags(class_file, method)?;
        verify_utf8_index(class_file, method.name_index)?;
        verify_utf8_index(class_file, method.descriptor_index)?;
        verify_code_attribute(class_file, method)?;
    }
    Ok(())
}

fn verify_access_flags(class_file: &ClassFile, method: &MethodInfo) -> Result<()> {
    let flags = method.access_flags;
    let visibility_bits = [ACC_PUBLIC, ACC_PROTECTED, ACC_PRIVATE].iter().filter(|f| flags & **f != 0).count();
    if visibility_bits > 1 {
        return Err(MethodVerifyError::InvalidMethodAccessFlags(flags));
    }
    if class_file.is_interface && flags & (ACC_PROTECTED | ACC_FINAL) != 0 {
        return Err(MethodVerifyError::InvalidMethodAccessFlags(flags));
    }
    if flags & ACC_ABSTRACT != 0 && flags & (ACC_PRIVATE | ACC_STATIC | ACC_FINAL) != 0 {
        return Err(MethodVerifyError::InvalidMethodAccessFlags(flags));
    }
    Ok(())
}

fn verify_utf8_index(class_file: &ClassFile, index: u16) -> Result<()> {
    match class_file.constant_pool.get(index) {
        Some(Constant::Utf8(_)) => Ok(()),
        None => Err(MethodVerifyError::InvalidConstantPoolIndex(index)),
        _ => Err(MethodVerifyError::InvalidConstantPoolIndexType(index)),
    }
}

fn verify_code_attribute(class_file: &ClassFile, method: &MethodInfo) -> Result<()> {
    let code_attributes = method
        .attributes
        .iter()
        .filter(|a| class_file.constant_pool.utf8(a.name_index) == Some("Code"))
        .count();
    let is_abstract = method.access_flags & ACC_ABSTRACT != 0;
    match (code_attributes, is_abstract) {
        (0, false) => return Err(MethodVerifyError::MissingCodeAttribute),
        (0, true) => return Ok(()),
        (_, true) => return Err(MethodVerifyError::ForbiddenCodeAttribute),
        (1, false) => {}
        _ => return Err(MethodVerifyError::DuplicateMethodAttribute("Code".to_string())),
    }
    let code = class_file.method_code(method).ok_or(MethodVerifyError::MissingCodeAttribute)?;
    let returns = [
        opcodes::IRETURN,
        opcodes::LRETURN,
        opcodes::FRETURN,
        opcodes::DRETURN,
        opcodes::ARETURN,
        opcodes::RETURN,
    ];
    match code.code.last() {
        Some(op) if returns.contains(op) => Ok(()),
        _ => Err(MethodVerifyError::MissingReturn),
    }
}
