//! Functional interface detection and single abstract method lookup

use super::parameters::parameters_equal;
use crate::ast::{Span, TypeEnum};
use crate::common::class_manager::{ClassManager, MethodInfo};
use crate::common::consts;
use crate::common::error::{Error, Result};

/// A functional interface together with its single abstract method
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalInterfaceSpec {
    /// The interface after alias redirection
    pub interface: TypeEnum,
    pub method: MethodInfo,
}

impl FunctionalInterfaceSpec {
    /// `None` when `ty` is not an interface with exactly one abstract method
    pub fn find(classes: &ClassManager, ty: &TypeEnum) -> Option<Self> {
        let interface = classes.redirect(ty.internal_name()?)?;
        if !interface.is_interface() {
            return None;
        }

        // Most specific interface first; a default body there settles the
        // method for every less specific declaration.
        let mut settled: Vec<&MethodInfo> = Vec::new();
        let mut abstract_methods: Vec<&MethodInfo> = Vec::new();
        for name in classes.all_supertypes(&interface.name) {
            let Some(current) = classes.redirect(&name) else {
                continue;
            };
            if !current.is_interface() {
                continue;
            }
            for method in current.methods.iter().filter(|m| !m.is_static() && !m.is_constructor()) {
                let already_settled = settled
                    .iter()
                    .any(|s| s.name == method.name && parameters_equal(&s.parameters, &method.parameters));
                if already_settled {
                    continue;
                }
                settled.push(method);
                if method.is_abstract() && !consts::is_object_public_method(&method.name, &method.descriptor()) {
                    abstract_methods.push(method);
                }
            }
        }

        match abstract_methods.as_slice() {
            [single] => Some(Self { interface: interface.as_type(), method: (*single).clone() }),
            _ => {
                log::trace!("{} declares {} abstract methods", interface.name, abstract_methods.len());
                None
            }
        }
    }

    /// Like [`find`](Self::find), but a non-functional type is an error
    pub fn resolve(classes: &ClassManager, ty: &TypeEnum, span: Span) -> Result<Self> {
        Self::find(classes, ty).ok_or_else(|| Error::NotFunctionalInterface { type_name: ty.to_string(), span })
    }

    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// Descriptor of the abstract method as declared, i.e. after erasure
    pub fn erased_descriptor(&self) -> String {
        self.method.descriptor()
    }
}
