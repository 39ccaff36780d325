//! Utilities to build method/field descriptors

use crate::ast::{ReferenceType, TypeEnum};
use crate::common::class_manager::Parameter;

pub fn type_to_descriptor(ty: &TypeEnum) -> String {
    match ty {
        TypeEnum::Void => "V".to_string(),
        TypeEnum::Primitive(p) => p.descriptor().to_string(),
        TypeEnum::Reference(ReferenceType::Array(component)) => format!("[{}", type_to_descriptor(component)),
        TypeEnum::Reference(ReferenceType::Class(name)) | TypeEnum::Reference(ReferenceType::Interface(name)) => {
            format!("L{};", name)
        }
    }
}

pub fn method_descriptor<'a>(params: impl IntoIterator<Item = &'a TypeEnum>, ret: &TypeEnum) -> String {
    let mut d = String::from("(");
    for p in params {
        d.push_str(&type_to_descriptor(p));
    }
    d.push(')');
    d.push_str(&type_to_descriptor(ret));
    d
}

pub fn parameters_descriptor(params: &[Parameter], ret: &TypeEnum) -> String {
    method_descriptor(params.iter().map(|p| &p.ty), ret)
}

/// Name used in a CONSTANT_Class entry: the internal name for classes and
/// interfaces, the field descriptor for arrays
pub fn class_constant_name(ty: &TypeEnum) -> String {
    match ty.internal_name() {
        Some(name) => name.to_string(),
        None => type_to_descriptor(ty),
    }
}
