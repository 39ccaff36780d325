//! The class file under construction for the enclosing type

use super::attribute::{bootstrap_methods_attribute, AttributeInfo, BootstrapMethod, CodeAttribute};
use super::code::Code;
use super::constpool::ConstantPool;
use super::error::{ClassGenerationError, CodeGenResult};
use super::method::MethodInfo;
use crate::common::config::Config;

#[derive(Debug)]
pub struct ClassFile {
    pub this_class: String,
    pub is_interface: bool,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub methods: Vec<MethodInfo>,
    pub bootstrap_methods: Vec<BootstrapMethod>,
}

impl ClassFile {
    pub fn new(this_class: impl Into<String>, is_interface: bool, config: &Config) -> Self {
        Self {
            this_class: this_class.into(),
            is_interface,
            major_version: config.target_major_version,
            constant_pool: ConstantPool::new(),
            methods: Vec::new(),
            bootstrap_methods: Vec::new(),
        }
    }

    /// Index of an equal entry if present, else the newly appended one
    pub fn add_bootstrap_method(&mut self, method_ref: u16, arguments: Vec<u16>) -> CodeGenResult<u16> {
        let entry = BootstrapMethod { method_ref, arguments };
        if let Some(existing) = self.bootstrap_methods.iter().position(|b| *b == entry) {
            return Ok(existing as u16);
        }
        if self.bootstrap_methods.len() >= u16::MAX as usize {
            return Err(ClassGenerationError::TooManyBootstrapMethods);
        }
        self.bootstrap_methods.push(entry);
        Ok((self.bootstrap_methods.len() - 1) as u16)
    }

    pub fn add_method(&mut self, access_flags: u16, name: &str, descriptor: &str, code: &Code) -> CodeGenResult<()> {
        if self.find_method(name, descriptor).is_some() {
            return Err(ClassGenerationError::DuplicateMethod {
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            });
        }
        code.check_size()?;
        let name_index = self.constant_pool.add_utf8(name)?;
        let descriptor_index = self.constant_pool.add_utf8(descriptor)?;
        let mut method = MethodInfo::new(access_flags, name_index, descriptor_index);
        method
            .attributes
            .push(CodeAttribute::from_code(code).into_attribute(&mut self.constant_pool)?);
        self.methods.push(method);
        Ok(())
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| {
            self.constant_pool.utf8(m.name_index) == Some(name)
                && self.constant_pool.utf8(m.descriptor_index) == Some(descriptor)
        })
    }

    /// Code attribute of a method, parsed back from its serialized form
    pub fn method_code(&self, method: &MethodInfo) -> Option<CodeAttribute> {
        let attr = method
            .attributes
            .iter()
            .find(|a| self.constant_pool.utf8(a.name_index) == Some("Code"))?;
        let info = &attr.info;
        let max_stack = u16::from_be_bytes([*info.first()?, *info.get(1)?]);
        let max_locals = u16::from_be_bytes([*info.get(2)?, *info.get(3)?]);
        let len = u32::from_be_bytes([*info.get(4)?, *info.get(5)?, *info.get(6)?, *info.get(7)?]) as usize;
        let code = info.get(8..8 + len)?.to_vec();
        Some(CodeAttribute::new(max_stack, max_locals, code))
    }

    /// BootstrapMethods attribute, if any call site was emitted
    pub fn bootstrap_methods_attribute(&mut self) -> CodeGenResult<Option<AttributeInfo>> {
        if self.bootstrap_methods.is_empty() {
            return Ok(None);
        }
        Ok(Some(bootstrap_methods_attribute(&self.bootstrap_methods, &mut self.constant_pool)?))
    }
}
