//! `invokedynamic` call sites producing functional interface instances

use super::sam::FunctionalInterfaceSpec;
use super::ResolvedReference;
use crate::ast::{Expr, MethodReferenceExpr, TargetRef, TypeEnum};
use crate::codegen::class::ClassFile;
use crate::codegen::code::{Code, Type};
use crate::codegen::descriptor;
use crate::codegen::expr_writer::ExpressionEmitter;
use crate::codegen::opcodes::reference_kind::*;
use crate::common::class_manager::ClassManager;
use crate::common::config::Config;
use crate::common::error::Result;

/// Kind of the implementation method handle passed to the bootstrap method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    InvokeVirtual,
    InvokeStatic,
    InvokeInterface,
}

impl HandleKind {
    pub fn reference_kind(self) -> u8 {
        match self {
            HandleKind::InvokeVirtual => REF_INVOKE_VIRTUAL,
            HandleKind::InvokeStatic => REF_INVOKE_STATIC,
            HandleKind::InvokeInterface => REF_INVOKE_INTERFACE,
        }
    }

    pub fn of(resolved: &ResolvedReference) -> Self {
        if resolved.is_constructor_reference || resolved.method.is_static() {
            HandleKind::InvokeStatic
        } else if resolved.owner_is_interface {
            HandleKind::InvokeInterface
        } else {
            HandleKind::InvokeVirtual
        }
    }
}

/// What was emitted for one method reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Name of the functional interface method
    pub name: String,
    /// `(captured receiver?)LFunctionalInterface;`
    pub descriptor: String,
    pub handle_kind: HandleKind,
    /// CONSTANT_Class name of the implementation method's owner
    pub implementation_owner: String,
    pub implementation_name: String,
    pub implementation_descriptor: String,
    pub erased_descriptor: String,
    pub instantiated_descriptor: String,
    pub captures_receiver: bool,
    /// Index into the BootstrapMethods table
    pub bootstrap_index: u16,
    /// Constant pool index of the CONSTANT_InvokeDynamic entry
    pub constant_index: u16,
}

pub fn call_site_descriptor(captured: Option<&TypeEnum>, functional_interface: &TypeEnum) -> String {
    descriptor::method_descriptor(captured, functional_interface)
}

pub struct CallSiteEmitter<'l> {
    class_file: &'l mut ClassFile,
    code: &'l mut Code,
    expressions: &'l mut dyn ExpressionEmitter,
    classes: &'l ClassManager,
    config: &'l Config,
}

impl<'l> CallSiteEmitter<'l> {
    pub fn new(
        class_file: &'l mut ClassFile,
        code: &'l mut Code,
        expressions: &'l mut dyn ExpressionEmitter,
        classes: &'l ClassManager,
        config: &'l Config,
    ) -> Self {
        Self { class_file, code, expressions, classes, config }
    }

    pub fn emit(
        &mut self,
        reference: &MethodReferenceExpr,
        sam: &FunctionalInterfaceSpec,
        resolved: &ResolvedReference,
    ) -> Result<CallSite> {
        let receiver: Option<&Expr> = match &reference.target {
            TargetRef::Value(expr) if !resolved.method.is_static() && !resolved.is_constructor_reference => Some(expr),
            TargetRef::Value(_) => {
                log::debug!("{}: static target, receiver expression not evaluated", reference);
                None
            }
            TargetRef::Type(_) => None,
        };
        let captured_type = receiver.map(|expr| self.classes.resolve_type(&expr.static_type()));
        if let Some(expr) = receiver {
            self.expressions.emit_expression(expr, self.code, &mut self.class_file.constant_pool)?;
        }

        let handle_kind = HandleKind::of(resolved);
        let implementation_owner = descriptor::class_constant_name(&resolved.owner);
        let implementation_descriptor = resolved.method.descriptor();
        let erased_descriptor = sam.erased_descriptor();
        let instantiated_descriptor = resolved.instantiated_descriptor();
        let call_descriptor = call_site_descriptor(captured_type.as_ref(), &sam.interface);

        let pool = &mut self.class_file.constant_pool;
        let erased_type = pool.add_method_type(&erased_descriptor)?;
        let implementation = pool.add_method_handle(
            handle_kind.reference_kind(),
            &implementation_owner,
            &resolved.method.name,
            &implementation_descriptor,
            resolved.owner_is_interface,
        )?;
        let instantiated_type = pool.add_method_type(&instantiated_descriptor)?;
        let bootstrap = &self.config.bootstrap;
        let bootstrap_handle = pool.add_method_handle(
            REF_INVOKE_STATIC,
            &bootstrap.owner,
            &bootstrap.name,
            &bootstrap.descriptor,
            self.class_file.is_interface,
        )?;

        let bootstrap_index =
            self.class_file.add_bootstrap_method(bootstrap_handle, vec![erased_type, implementation, instantiated_type])?;
        let constant_index =
            self.class_file.constant_pool.add_invoke_dynamic(bootstrap_index, sam.name(), &call_descriptor)?;

        let result = Type::Object(descriptor::class_constant_name(&sam.interface));
        self.code.emit_invokedynamic(constant_index, usize::from(receiver.is_some()), result)?;

        log::debug!(
            "{}: invokedynamic {}{} -> {:?} {}.{}{}",
            reference,
            sam.name(),
            call_descriptor,
            handle_kind,
            implementation_owner,
            resolved.method.name,
            implementation_descriptor
        );

        Ok(CallSite {
            name: sam.name().to_string(),
            descriptor: call_descriptor,
            handle_kind,
            implementation_owner,
            implementation_name: resolved.method.name.clone(),
            implementation_descriptor,
            erased_descriptor,
            instantiated_descriptor,
            captures_receiver: receiver.is_some(),
            bootstrap_index,
            constant_index,
        })
    }
}
