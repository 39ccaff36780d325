//! Attributes for Java class files: Code and BootstrapMethods

use super::code::Code;
use super::constpool::ConstantPool;
use super::error::ConstPoolResult;

#[derive(Debug, Clone)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    pub fn new(name_index: u16, info: Vec<u8>) -> Self {
        Self { name_index, info }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.name_index.to_be_bytes());
        bytes.extend_from_slice(&(self.info.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.info);
        bytes
    }
}

#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

impl CodeAttribute {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Self {
        Self { max_stack, max_locals, code }
    }

    pub fn from_code(code: &Code) -> Self {
        Self::new(code.max_stack(), code.max_locals(), code.to_bytes())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.max_stack.to_be_bytes());
        bytes.extend_from_slice(&self.max_locals.to_be_bytes());
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);
        // no exception table, no nested attributes
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes
    }

    pub fn into_attribute(self, pool: &mut ConstantPool) -> ConstPoolResult<AttributeInfo> {
        let name_index = pool.add_utf8("Code")?;
        Ok(AttributeInfo::new(name_index, self.to_bytes()))
    }
}

/// One entry of the BootstrapMethods attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    /// CONSTANT_MethodHandle of the bootstrap method
    pub method_ref: u16,
    /// Loadable constants passed as static arguments
    pub arguments: Vec<u16>,
}

impl BootstrapMethod {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.method_ref.to_be_bytes());
        bytes.extend_from_slice(&(self.arguments.len() as u16).to_be_bytes());
        for arg in &self.arguments {
            bytes.extend_from_slice(&arg.to_be_bytes());
        }
        bytes
    }
}

pub fn bootstrap_methods_attribute(
    methods: &[BootstrapMethod],
    pool: &mut ConstantPool,
) -> ConstPoolResult<AttributeInfo> {
    let name_index = pool.add_utf8("BootstrapMethods")?;
    let mut info = Vec::new();
    info.extend_from_slice(&(methods.len() as u16).to_be_bytes());
    for method in methods {
        info.extend_from_slice(&method.to_bytes());
    }
    Ok(AttributeInfo::new(name_index, info))
}
