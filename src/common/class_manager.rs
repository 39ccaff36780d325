//! Class model used by method-reference resolution
//!
//! Holds every type the stage can see (library types and the types being
//! compiled) keyed by internal name, in registration order:
//! - type redirection (aliases) via `redirect`
//! - superclass chains and full super-type sets
//! - subtype and method-invocation assignability checks
//! - member lookup across the hierarchy

use crate::ast::{PrimitiveType, ReferenceType, TypeEnum};
use crate::codegen::descriptor;
use crate::codegen::opcodes::access_flags::*;
use crate::common::consts;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

/// A formal parameter. `origin_ty` is the type as declared in source before
/// any substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeEnum,
    pub origin_ty: TypeEnum,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeEnum) -> Self {
        Self { name: name.into(), origin_ty: ty.clone(), ty }
    }

    /// Copy of this parameter with both the effective and the declared type replaced
    pub fn retyped(&self, ty: TypeEnum) -> Self {
        Self { name: self.name.clone(), origin_ty: ty.clone(), ty }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeEnum,
    pub access_flags: u16,
    /// Internal name of the declaring type; set on registration
    pub declaring_class: String,
}

impl MethodInfo {
    /// A public instance method
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>, return_type: TypeEnum) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
            access_flags: ACC_PUBLIC,
            declaring_class: String::new(),
        }
    }

    pub fn constructor(parameters: Vec<Parameter>) -> Self {
        Self::new(consts::CONSTRUCTOR_NAME, parameters, TypeEnum::Void)
    }

    pub fn with_access(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags & ACC_ABSTRACT != 0
    }

    pub fn is_public(&self) -> bool {
        self.access_flags & ACC_PUBLIC != 0
    }

    pub fn is_private(&self) -> bool {
        self.access_flags & ACC_PRIVATE != 0
    }

    pub fn is_protected(&self) -> bool {
        self.access_flags & ACC_PROTECTED != 0
    }

    pub fn is_constructor(&self) -> bool {
        self.name == consts::CONSTRUCTOR_NAME
    }

    pub fn descriptor(&self) -> String {
        descriptor::parameters_descriptor(&self.parameters, &self.return_type)
    }

    pub fn parameter_types(&self) -> Vec<TypeEnum> {
        self.parameters.iter().map(|p| p.ty.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    /// Internal name, e.g. `java/lang/String`
    pub name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub access_flags: u16,
    pub methods: Vec<MethodInfo>,
    /// Alias target; a redirecting entry carries no members of its own
    pub redirect: Option<String>,
}

impl ClassInfo {
    pub fn new_class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: Some(consts::JAVA_LANG_OBJECT.to_string()),
            interfaces: Vec::new(),
            access_flags: ACC_PUBLIC,
            methods: Vec::new(),
            redirect: None,
        }
    }

    pub fn new_interface(name: impl Into<String>) -> Self {
        Self {
            access_flags: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
            ..Self::new_class(name)
        }
    }

    /// An alias that resolves to `target`
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self { super_class: None, redirect: Some(target.into()), ..Self::new_class(name) }
    }

    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_access(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.add_method(method);
        self
    }

    /// Adds a member; false when a method with the same name and descriptor exists
    pub fn add_method(&mut self, mut method: MethodInfo) -> bool {
        let descriptor = method.descriptor();
        if self.methods.iter().any(|m| m.name == method.name && m.descriptor() == descriptor) {
            return false;
        }
        method.declaring_class = self.name.clone();
        self.methods.push(method);
        true
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags & ACC_ABSTRACT != 0
    }

    pub fn as_type(&self) -> TypeEnum {
        if self.is_interface() {
            TypeEnum::interface(self.name.clone())
        } else {
            TypeEnum::class(self.name.clone())
        }
    }

    pub fn methods_named(&self, name: &str) -> Vec<&MethodInfo> {
        self.methods.iter().filter(|m| m.name == name).collect()
    }
}

#[derive(Debug, Default)]
pub struct ClassManager {
    classes: IndexMap<String, ClassInfo>,
}

impl ClassManager {
    pub fn new() -> Self {
        Self { classes: IndexMap::new() }
    }

    /// Manager preloaded with the java.lang types the lowering itself relies on
    pub fn with_java_lang() -> Self {
        let mut manager = Self::new();
        let object = TypeEnum::object();
        manager.register(
            ClassInfo { super_class: None, ..ClassInfo::new_class(consts::JAVA_LANG_OBJECT) }
                .with_method(MethodInfo::constructor(vec![]))
                .with_method(MethodInfo::new("equals", vec![Parameter::new("obj", object.clone())], PrimitiveType::Boolean.into()))
                .with_method(MethodInfo::new("hashCode", vec![], TypeEnum::int()))
                .with_method(MethodInfo::new("toString", vec![], TypeEnum::string())),
        );
        manager.register(ClassInfo::new_interface(consts::JAVA_IO_SERIALIZABLE));
        manager.register(ClassInfo::new_interface(consts::JAVA_LANG_CLONEABLE));
        manager.register(
            ClassInfo::new_interface("java/lang/CharSequence")
                .with_method(MethodInfo::new("length", vec![], TypeEnum::int()).with_access(ACC_PUBLIC | ACC_ABSTRACT)),
        );
        manager.register(
            ClassInfo::new_interface("java/lang/Comparable").with_method(
                MethodInfo::new("compareTo", vec![Parameter::new("o", object.clone())], TypeEnum::int())
                    .with_access(ACC_PUBLIC | ACC_ABSTRACT),
            ),
        );
        manager.register(
            ClassInfo::new_class(consts::JAVA_LANG_STRING)
                .with_access(ACC_PUBLIC | ACC_FINAL)
                .implements(consts::JAVA_IO_SERIALIZABLE)
                .implements("java/lang/CharSequence")
                .implements("java/lang/Comparable")
                .with_method(MethodInfo::constructor(vec![]))
                .with_method(MethodInfo::new("length", vec![], TypeEnum::int()))
                .with_method(MethodInfo::new("isEmpty", vec![], PrimitiveType::Boolean.into()))
                .with_method(MethodInfo::new("toUpperCase", vec![], TypeEnum::string()))
                .with_method(MethodInfo::new("concat", vec![Parameter::new("str", TypeEnum::string())], TypeEnum::string()))
                .with_method(
                    MethodInfo::new("valueOf", vec![Parameter::new("obj", object.clone())], TypeEnum::string())
                        .with_access(ACC_PUBLIC | ACC_STATIC),
                ),
        );
        manager.register(
            ClassInfo::new_class(consts::JAVA_LANG_NUMBER)
                .with_access(ACC_PUBLIC | ACC_ABSTRACT)
                .implements(consts::JAVA_IO_SERIALIZABLE)
                .with_method(MethodInfo::constructor(vec![])),
        );
        for primitive in [
            PrimitiveType::Boolean,
            PrimitiveType::Char,
            PrimitiveType::Byte,
            PrimitiveType::Short,
            PrimitiveType::Int,
            PrimitiveType::Long,
            PrimitiveType::Float,
            PrimitiveType::Double,
        ] {
            let wrapper = primitive.wrapper();
            let super_class = match primitive {
                PrimitiveType::Boolean | PrimitiveType::Char => consts::JAVA_LANG_OBJECT,
                _ => consts::JAVA_LANG_NUMBER,
            };
            let value = TypeEnum::Primitive(primitive);
            manager.register(
                ClassInfo::new_class(wrapper)
                    .with_access(ACC_PUBLIC | ACC_FINAL)
                    .extends(super_class)
                    .implements("java/lang/Comparable")
                    .with_method(MethodInfo::constructor(vec![Parameter::new("value", value.clone())]))
                    .with_method(MethodInfo::new(format!("{}Value", primitive.name()), vec![], value.clone()))
                    .with_method(
                        MethodInfo::new("valueOf", vec![Parameter::new("value", value)], TypeEnum::class(wrapper))
                            .with_access(ACC_PUBLIC | ACC_STATIC),
                    ),
            );
        }
        manager
    }

    /// Registers or replaces a type
    pub fn register(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        self.classes.get_mut(name)
    }

    /// The underlying declared type after following aliases
    pub fn redirect(&self, name: &str) -> Option<&ClassInfo> {
        let mut current = self.classes.get(name)?;
        for _ in 0..consts::MAX_REDIRECT_STEPS {
            match &current.redirect {
                Some(target) => current = self.classes.get(target)?,
                None => return Some(current),
            }
        }
        log::debug!("redirect chain from '{}' exceeds {} steps", name, consts::MAX_REDIRECT_STEPS);
        None
    }

    /// Redirected internal name, or the name itself for unknown types
    pub fn resolved_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.redirect(name).map(|c| c.name.as_str()).unwrap_or(name)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.redirect(name).is_some_and(ClassInfo::is_interface)
    }

    /// `ty` with every class and interface name replaced by the type it
    /// redirects to; unknown names and primitives are kept
    pub fn resolve_type(&self, ty: &TypeEnum) -> TypeEnum {
        match ty {
            TypeEnum::Reference(ReferenceType::Array(component)) => TypeEnum::array_of(self.resolve_type(component)),
            TypeEnum::Reference(_) => match ty.internal_name().and_then(|name| self.redirect(name)) {
                Some(class) => class.as_type(),
                None => ty.clone(),
            },
            other => other.clone(),
        }
    }

    /// `[name, super, super's super, ...]`; unknown types end the chain
    pub fn superclass_chain(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(self.resolved_name(name).to_string());
        while let Some(type_name) = current {
            if chain.len() >= consts::MAX_HIERARCHY_STEPS || chain.contains(&type_name) {
                break;
            }
            current = self.redirect(&type_name).and_then(|c| c.super_class.clone());
            chain.push(type_name);
        }
        chain
    }

    /// The type itself followed by every supertype, breadth first
    pub fn all_supertypes(&self, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([self.resolved_name(name).to_string()]);
        while let Some(type_name) = queue.pop_front() {
            if order.len() >= consts::MAX_HIERARCHY_STEPS || !seen.insert(type_name.clone()) {
                continue;
            }
            if let Some(class) = self.redirect(&type_name) {
                queue.extend(class.super_class.iter().cloned());
                queue.extend(class.interfaces.iter().map(|i| self.resolved_name(i).to_string()));
            }
            order.push(type_name);
        }
        order
    }

    /// Reference widening (JLS 5.1.5) or identity; no boxing, no primitive widening
    pub fn is_subtype(&self, from: &TypeEnum, to: &TypeEnum) -> bool {
        if from == to {
            return true;
        }
        let (TypeEnum::Reference(from_ref), TypeEnum::Reference(to_ref)) = (from, to) else {
            return false;
        };
        match (from_ref, to_ref) {
            (ReferenceType::Array(fc), ReferenceType::Array(tc)) => {
                fc.is_reference() && tc.is_reference() && self.is_subtype(fc, tc)
            }
            (ReferenceType::Array(_), _) => matches!(
                to.internal_name(),
                Some(consts::JAVA_LANG_OBJECT) | Some(consts::JAVA_LANG_CLONEABLE) | Some(consts::JAVA_IO_SERIALIZABLE)
            ),
            (_, ReferenceType::Array(_)) => false,
            _ => {
                let (Some(from_name), Some(to_name)) = (from.internal_name(), to.internal_name()) else {
                    return false;
                };
                let to_name = self.resolved_name(to_name);
                to_name == consts::JAVA_LANG_OBJECT || self.all_supertypes(from_name).iter().any(|t| t == to_name)
            }
        }
    }

    /// Method invocation conversion (JLS 5.3): identity, primitive widening,
    /// reference widening, boxing followed by widening, unboxing followed by widening
    pub fn is_assignable(&self, from: &TypeEnum, to: &TypeEnum) -> bool {
        if self.is_subtype(from, to) {
            return true;
        }
        match (from, to) {
            (TypeEnum::Primitive(f), TypeEnum::Primitive(t)) => f.widens_to(*t),
            (TypeEnum::Primitive(_), TypeEnum::Reference(_)) => self.is_subtype(&from.boxed(), to),
            (TypeEnum::Reference(_), TypeEnum::Primitive(t)) => {
                from.unboxed().is_some_and(|p| p == *t || p.widens_to(*t))
            }
            _ => false,
        }
    }

    /// Methods named `member` visible through `type_name`: its own first, then
    /// superclasses, then super-interfaces, each in declaration order. A
    /// method overridden lower in the hierarchy is reported once, for the most
    /// derived declaration.
    pub fn methods_in_hierarchy<'a>(&'a self, type_name: &str, member: &str) -> Vec<&'a MethodInfo> {
        let chain = self.superclass_chain(type_name);
        let own_name = chain.first().cloned().unwrap_or_default();
        let mut order: Vec<String> = chain;
        for type_name in self.all_supertypes(type_name) {
            if !order.contains(&type_name) {
                order.push(type_name);
            }
        }

        let mut found: Vec<&MethodInfo> = Vec::new();
        for owner in order.iter().filter_map(|t| self.redirect(t)) {
            for method in owner.methods_named(member) {
                if method.is_constructor() && owner.name != own_name {
                    continue;
                }
                let overridden = found.iter().any(|m| {
                    m.parameters.len() == method.parameters.len()
                        && m.parameters.iter().zip(&method.parameters).all(|(a, b)| a.ty == b.ty)
                });
                if !overridden {
                    found.push(method);
                }
            }
        }
        found
    }
}
