use crate::codegen::class::ClassFile;
use crate::codegen::constpool::{Constant, ConstantPool};
use crate::codegen::opcodes::{reference_kind::*, JAVA_1_8};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConstantPoolVerifyError {
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("Invalid method handle reference kind {kind} at {index}")]
    InvalidReferenceKind { index: u16, kind: u8 },
    #[error("BootstrapMethods attribute not defined")]
    BootstrapMethodsNotDefined,
    #[error("Invalid bootstrap method index {0}")]
    InvalidBootstrapMethodIndex(u16),
    #[error("Bootstrap method {0} does not reference a method handle")]
    InvalidBootstrapMethod(usize),
    #[error("Bootstrap argument {argument} of bootstrap method {method} is not loadable")]
    InvalidBootstrapArgument { method: usize, argument: u16 },
}

pub type Result<T> = std::result::Result<T, ConstantPoolVerifyError>;

/// Verify the constant pool and bootstrap table of a class file
pub fn verify(class_file: &ClassFile) -> Result<()> {
    verify_constant_indexes(class_file)?;
    verify_bootstrap_methods(class_file)?;
    Ok(())
}

fn expect(pool: &ConstantPool, owner: u16, index: u16, accept: impl Fn(&Constant) -> bool) -> Result<()> {
    match pool.get(index) {
        Some(constant) if accept(constant) => Ok(()),
        None => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(owner)),
        _ => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(owner)),
    }
}

fn is_utf8(c: &Constant) -> bool {
    matches!(c, Constant::Utf8(_))
}

fn verify_constant_indexes(class_file: &ClassFile) -> Result<()> {
    let pool = &class_file.constant_pool;
    for (i, constant) in pool.constants().iter().enumerate() {
        let index = (i + 1) as u16;
        match constant {
            Constant::Class(name_index) => expect(pool, index, *name_index, is_utf8)?,
            Constant::String(string_index) => expect(pool, index, *string_index, is_utf8)?,
            Constant::FieldRef(class_index, nat_index)
            | Constant::MethodRef(class_index, nat_index)
            | Constant::InterfaceMethodRef(class_index, nat_index) => {
                expect(pool, index, *class_index, |c| matches!(c, Constant::Class(_)))?;
                expect(pool, index, *nat_index, |c| matches!(c, Constant::NameAndType(_, _)))?;
            }
            Constant::NameAndType(name_index, desc_index) => {
                expect(pool, index, *name_index, is_utf8)?;
                expect(pool, index, *desc_index, is_utf8)?;
            }
            Constant::MethodHandle(kind, reference_index) => {
                let allows_interface = class_file.major_version >= JAVA_1_8;
                let accept: fn(&Constant, bool) -> bool = match *kind {
                    REF_GET_FIELD | REF_GET_STATIC | REF_PUT_FIELD | REF_PUT_STATIC => {
                        |c, _| matches!(c, Constant::FieldRef(_, _))
                    }
                    REF_INVOKE_VIRTUAL | REF_NEW_INVOKE_SPECIAL => |c, _| matches!(c, Constant::MethodRef(_, _)),
                    REF_INVOKE_STATIC | REF_INVOKE_SPECIAL => |c, interface_ok| {
                        matches!(c, Constant::MethodRef(_, _))
                            || (interface_ok && matches!(c, Constant::InterfaceMethodRef(_, _)))
                    },
                    REF_INVOKE_INTERFACE => |c, _| matches!(c, Constant::InterfaceMethodRef(_, _)),
                    other => return Err(ConstantPoolVerifyError::InvalidReferenceKind { index, kind: other }),
                };
                expect(pool, index, *reference_index, |c| accept(c, allows_interface))?;
            }
            Constant::MethodType(descriptor_index) => expect(pool, index, *descriptor_index, is_utf8)?,
            Constant::InvokeDynamic(bsm_index, nat_index) => {
                if class_file.bootstrap_methods.is_empty() {
                    return Err(ConstantPoolVerifyError::BootstrapMethodsNotDefined);
                }
                if usize::from(*bsm_index) >= class_file.bootstrap_methods.len() {
                    return Err(ConstantPoolVerifyError::InvalidBootstrapMethodIndex(*bsm_index));
                }
                expect(pool, index, *nat_index, |c| matches!(c, Constant::NameAndType(_, _)))?;
            }
            Constant::Utf8(_) | Constant::Integer(_) => {}
        }
    }
    Ok(())
}

fn verify_bootstrap_methods(class_file: &ClassFile) -> Result<()> {
    let pool = &class_file.constant_pool;
    for (i, bootstrap) in class_file.bootstrap_methods.iter().enumerate() {
        if !matches!(pool.get(bootstrap.method_ref), Some(Constant::MethodHandle(_, _))) {
            return Err(ConstantPoolVerifyError::InvalidBootstrapMethod(i));
        }
        for argument in &bootstrap.arguments {
            let loadable = matches!(
                pool.get(*argument),
                Some(Constant::Integer(_))
                    | Some(Constant::String(_))
                    | Some(Constant::Class(_))
                    | Some(Constant::MethodHandle(_, _))
                    | Some(Constant::MethodType(_))
            );
            if !loadable {
                return Err(ConstantPoolVerifyError::InvalidBootstrapArgument { method: i, argument: *argument });
            }
        }
    }
    Ok(())
}
