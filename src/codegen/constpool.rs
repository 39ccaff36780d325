//! Constant pool and constants for Java class files
//!
//! Indices are 1-based as in the class file; equal constants are stored once.

use super::error::{ConstPoolError, ConstPoolResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    InvokeDynamic(u16, u16),
}

mod constant_tags {
    pub const CONSTANT_UTF8: u8 = 1;
    pub const CONSTANT_INTEGER: u8 = 3;
    pub const CONSTANT_CLASS: u8 = 7;
    pub const CONSTANT_STRING: u8 = 8;
    pub const CONSTANT_FIELDREF: u8 = 9;
    pub const CONSTANT_METHODREF: u8 = 10;
    pub const CONSTANT_INTERFACEMETHODREF: u8 = 11;
    pub const CONSTANT_NAMEANDTYPE: u8 = 12;
    pub const CONSTANT_METHODHANDLE: u8 = 15;
    pub const CONSTANT_METHODTYPE: u8 = 16;
    pub const CONSTANT_INVOKEDYNAMIC: u8 = 18;
}

impl Constant {
    pub fn to_bytes(&self) -> Vec<u8> {
        use constant_tags::*;
        let mut bytes = Vec::new();
        match self {
            Constant::Utf8(value) => {
                bytes.push(CONSTANT_UTF8);
                let utf8_bytes = value.as_bytes();
                bytes.extend_from_slice(&(utf8_bytes.len() as u16).to_be_bytes());
                bytes.extend_from_slice(utf8_bytes);
            }
            Constant::Integer(value) => {
                bytes.push(CONSTANT_INTEGER);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Class(name_index) => {
                bytes.push(CONSTANT_CLASS);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::String(string_index) => {
                bytes.push(CONSTANT_STRING);
                bytes.extend_from_slice(&string_index.to_be_bytes());
            }
            Constant::FieldRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_FIELDREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::MethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_METHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InterfaceMethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_INTERFACEMETHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                bytes.push(CONSTANT_NAMEANDTYPE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::MethodHandle(reference_kind, reference_index) => {
                bytes.push(CONSTANT_METHODHANDLE);
                bytes.push(*reference_kind);
                bytes.extend_from_slice(&reference_index.to_be_bytes());
            }
            Constant::MethodType(descriptor_index) => {
                bytes.push(CONSTANT_METHODTYPE);
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::InvokeDynamic(bootstrap_method_attr_index, name_and_type_index) => {
                bytes.push(CONSTANT_INVOKEDYNAMIC);
                bytes.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
        }
        bytes
    }
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    pub(crate) constants: Vec<Constant>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self { constants: Vec::new() }
    }

    /// Number of entries, not counting the reserved slot 0
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&Constant> {
        (index as usize).checked_sub(1).and_then(|i| self.constants.get(i))
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index) {
            Some(Constant::Utf8(value)) => Some(value),
            _ => None,
        }
    }

    /// Name of a CONSTANT_Class entry
    pub fn class_name(&self, index: u16) -> Option<&str> {
        match self.get(index) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => None,
        }
    }

    /// (name, descriptor) of a CONSTANT_NameAndType entry
    pub fn name_and_type(&self, index: u16) -> Option<(&str, &str)> {
        match self.get(index) {
            Some(Constant::NameAndType(name, descriptor)) => Some((self.utf8(*name)?, self.utf8(*descriptor)?)),
            _ => None,
        }
    }

    /// (owner, name, descriptor) of a Methodref / InterfaceMethodref / Fieldref
    pub fn member_ref(&self, index: u16) -> Option<(&str, &str, &str)> {
        match self.get(index) {
            Some(Constant::MethodRef(class, nat))
            | Some(Constant::InterfaceMethodRef(class, nat))
            | Some(Constant::FieldRef(class, nat)) => {
                let (name, descriptor) = self.name_and_type(*nat)?;
                Some((self.class_name(*class)?, name, descriptor))
            }
            _ => None,
        }
    }

    fn add(&mut self, constant: Constant) -> ConstPoolResult<u16> {
        if let Some(existing) = self.constants.iter().position(|c| *c == constant) {
            return Ok(existing as u16 + 1);
        }
        // u16::MAX itself is not addressable: constant_pool_count must fit
        if self.constants.len() + 1 >= u16::MAX as usize {
            return Err(ConstPoolError::OutOfSpace);
        }
        self.constants.push(constant);
        Ok(self.constants.len() as u16)
    }

    pub fn add_utf8(&mut self, value: &str) -> ConstPoolResult<u16> {
        self.add(Constant::Utf8(value.to_string()))
    }

    pub fn add_integer(&mut self, value: i32) -> ConstPoolResult<u16> {
        self.add(Constant::Integer(value))
    }

    pub fn add_class(&mut self, name: &str) -> ConstPoolResult<u16> {
        let name_index = self.add_utf8(name)?;
        self.add(Constant::Class(name_index))
    }

    pub fn add_string(&mut self, value: &str) -> ConstPoolResult<u16> {
        let utf8_index = self.add_utf8(value)?;
        self.add(Constant::String(utf8_index))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> ConstPoolResult<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.add(Constant::NameAndType(name_index, descriptor_index))
    }

    pub fn add_field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> ConstPoolResult<u16> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.add(Constant::FieldRef(class_index, name_and_type_index))
    }

    pub fn add_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> ConstPoolResult<u16> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.add(Constant::MethodRef(class_index, name_and_type_index))
    }

    pub fn add_interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> ConstPoolResult<u16> {
        let class_index = self.add_class(class)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.add(Constant::InterfaceMethodRef(class_index, name_and_type_index))
    }

    /// CONSTANT_MethodHandle for a method; `is_interface` selects an
    /// InterfaceMethodref as the referenced member
    pub fn add_method_handle(
        &mut self,
        reference_kind: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> ConstPoolResult<u16> {
        let reference_index = if is_interface {
            self.add_interface_method_ref(owner, name, descriptor)?
        } else {
            self.add_method_ref(owner, name, descriptor)?
        };
        self.add(Constant::MethodHandle(reference_kind, reference_index))
    }

    pub fn add_method_type(&mut self, descriptor: &str) -> ConstPoolResult<u16> {
        let descriptor_index = self.add_utf8(descriptor)?;
        self.add(Constant::MethodType(descriptor_index))
    }

    pub fn add_invoke_dynamic(&mut self, bootstrap_index: u16, name: &str, descriptor: &str) -> ConstPoolResult<u16> {
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        self.add(Constant::InvokeDynamic(bootstrap_index, name_and_type_index))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&((self.constants.len() + 1) as u16).to_be_bytes());
        for constant in &self.constants {
            bytes.extend_from_slice(&constant.to_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based_and_deduplicated() {
        let mut pool = ConstantPool::new();
        let first = pool.add_utf8("run").unwrap();
        assert_eq!(first, 1);
        assert_eq!(pool.add_utf8("run").unwrap(), first);

        let class = pool.add_class("java/lang/Runnable").unwrap();
        assert_eq!(pool.class_name(class), Some("java/lang/Runnable"));
        assert_eq!(pool.add_class("java/lang/Runnable").unwrap(), class);
    }

    #[test]
    fn method_handle_member_kind_follows_interface_flag() {
        let mut pool = ConstantPool::new();
        let mh = pool.add_method_handle(6, "p/Api", "make", "()Lp/Api;", true).unwrap();
        let Some(Constant::MethodHandle(kind, reference)) = pool.get(mh).cloned() else {
            panic!("expected method handle");
        };
        assert_eq!(kind, 6);
        assert!(matches!(pool.get(reference), Some(Constant::InterfaceMethodRef(_, _))));
        assert_eq!(pool.member_ref(reference), Some(("p/Api", "make", "()Lp/Api;")));
    }

    #[test]
    fn serialized_count_includes_reserved_slot() {
        let mut pool = ConstantPool::new();
        pool.add_utf8("a").unwrap();
        let bytes = pool.to_bytes();
        assert_eq!(&bytes[..2], &[0, 2]);
        assert_eq!(&bytes[2..], &[1, 0, 1, b'a']);
    }
}
