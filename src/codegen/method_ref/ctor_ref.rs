//! Synthetic factory methods backing `Type::new` and `Type[]::new`
//!
//! The factory is a `private static final synthetic` member of the enclosing
//! type taking the exact parameters and returning the target type. Its body
//! either calls the matching constructor or allocates an array whose
//! dimension sizes are the parameters.

use super::exact_params::ExactParameters;
use super::resolver::MethodReferenceResolver;
use crate::ast::{PrimitiveType, Span, TypeEnum, TypeExpr};
use crate::codegen::class::ClassFile;
use crate::codegen::code::{Code, Type};
use crate::codegen::constpool::ConstantPool;
use crate::codegen::descriptor;
use crate::codegen::error::ClassGenerationError;
use crate::codegen::opcodes::{self, access_flags::*, array_type::*};
use crate::common::class_manager::{ClassManager, MethodInfo};
use crate::common::compilation_context::MethodContext;
use crate::common::config::Config;
use crate::common::consts;
use crate::common::error::{Error, Result};
use crate::common::visibility::VisibilityFilter;

pub const FACTORY_ACCESS_FLAGS: u16 = ACC_PRIVATE | ACC_STATIC | ACC_FINAL | ACC_SYNTHETIC;

pub struct ConstructorSynthesizer<'l> {
    classes: &'l mut ClassManager,
    class_file: &'l mut ClassFile,
    context: &'l MethodContext,
    visibility: &'l dyn VisibilityFilter,
    config: &'l Config,
}

impl<'l> ConstructorSynthesizer<'l> {
    pub fn new(
        classes: &'l mut ClassManager,
        class_file: &'l mut ClassFile,
        context: &'l MethodContext,
        visibility: &'l dyn VisibilityFilter,
        config: &'l Config,
    ) -> Self {
        Self { classes, class_file, context, visibility, config }
    }

    /// Builds the factory for `target`, installs it on the enclosing type and
    /// returns it
    pub fn synthesize(&mut self, target: &TypeExpr, exact: &ExactParameters, span: Span) -> Result<MethodInfo> {
        let target_ty = &self.classes.resolve_type(&target.ty);
        let mut code = Code::new(0, self.config.debug_code);
        code.reserve_locals(exact.as_slice().iter().map(|p| usize::from(p.ty.width())).sum())?;

        match target_ty {
            TypeEnum::Reference(_) if target_ty.is_array() => self.emit_array_allocation(&mut code, target_ty, exact, span)?,
            TypeEnum::Reference(_) => self.emit_instance_creation(&mut code, target_ty, exact, span)?,
            _ => return Err(Error::invalid_shape(format!("cannot create an instance of {}", target_ty), span)),
        }
        code.emit_return(target_ty)?;

        let enclosing = self.context.class_name().to_string();
        let name = self.context.next_constructor_reference_name();
        // interface methods may not be final
        let access_flags = if self.class_file.is_interface { FACTORY_ACCESS_FLAGS & !ACC_FINAL } else { FACTORY_ACCESS_FLAGS };
        let mut factory = MethodInfo::new(name, exact.as_slice().to_vec(), target_ty.clone()).with_access(access_flags);
        factory.declaring_class = enclosing.clone();
        let factory_descriptor = factory.descriptor();

        let Some(enclosing_class) = self.classes.get(&enclosing) else {
            return Err(Error::internal_at(format!("enclosing type {} is not registered", enclosing), span));
        };
        if enclosing_class.methods.iter().any(|m| m.name == factory.name && m.descriptor() == factory_descriptor) {
            return Err(Error::internal_at(format!("{} already declares {}{}", enclosing, factory.name, factory_descriptor), span));
        }

        match self.class_file.add_method(access_flags, &factory.name, &factory_descriptor, &code) {
            Err(ClassGenerationError::DuplicateMethod { name, descriptor }) => {
                return Err(Error::internal_at(format!("{} already declares {}{}", enclosing, name, descriptor), span))
            }
            other => other?,
        }
        if let Some(enclosing_class) = self.classes.get_mut(&enclosing) {
            enclosing_class.add_method(factory.clone());
        }

        log::debug!(
            "synthesized {}.{}{} for {}::new (max_stack={}, max_locals={})",
            enclosing,
            factory.name,
            factory_descriptor,
            target_ty,
            code.max_stack(),
            code.max_locals()
        );
        Ok(factory)
    }

    fn emit_instance_creation(&mut self, code: &mut Code, target_ty: &TypeEnum, exact: &ExactParameters, span: Span) -> Result<()> {
        let Some(target_name) = target_ty.internal_name() else {
            return Err(Error::internal_at(format!("{} has no internal name", target_ty), span));
        };
        if let Some(class) = self.classes.redirect(target_name) {
            if class.is_interface() || class.is_abstract() {
                return Err(Error::invalid_shape(format!("cannot instantiate abstract type {}", target_ty), span));
            }
        }

        let resolver = MethodReferenceResolver::new(self.classes, self.visibility, self.context.class_name());
        let constructor = resolver.select_constructor(target_name, exact, span)?.clone();
        let class_name = self.classes.resolved_name(target_name).to_string();

        let pool = &mut self.class_file.constant_pool;
        let class_index = pool.add_class(&class_name)?;
        code.emitop2(opcodes::NEW, class_index);
        code.push(Type::Object(class_name.clone()));
        code.emitop(opcodes::DUP);
        code.push(Type::Object(class_name.clone()));

        let mut slot = 0u16;
        for (argument, parameter) in exact.as_slice().iter().zip(&constructor.parameters) {
            code.emit_load(&argument.ty, slot)?;
            slot += argument.ty.width();
            coerce(code, pool, &argument.ty, &parameter.ty)?;
        }

        let init = pool.add_method_ref(&class_name, consts::CONSTRUCTOR_NAME, &constructor.descriptor())?;
        code.emit_invoke(opcodes::INVOKESPECIAL, init, &constructor.parameter_types(), &TypeEnum::Void)?;
        Ok(())
    }

    fn emit_array_allocation(&mut self, code: &mut Code, target_ty: &TypeEnum, exact: &ExactParameters, span: Span) -> Result<()> {
        let dimensions = target_ty.array_dims();
        if exact.is_empty() {
            return Err(Error::invalid_shape(format!("{}::new needs at least one dimension size", target_ty), span));
        }
        let Ok(size_count) = u8::try_from(exact.len()) else {
            return Err(Error::invalid_shape(
                format!("{} dimension sizes exceed the class file limit of {}", exact.len(), u8::MAX),
                span,
            ));
        };
        if exact.len() > dimensions {
            return Err(Error::invalid_shape(
                format!("{} dimension sizes given for {} which has {} dimensions", exact.len(), target_ty, dimensions),
                span,
            ));
        }

        let pool = &mut self.class_file.constant_pool;
        let mut slot = 0u16;
        for size in exact.as_slice() {
            let integral = size.ty.as_primitive().or_else(|| size.ty.unboxed());
            if !integral.is_some_and(|p| p.is_int_like() && p != PrimitiveType::Boolean) {
                return Err(Error::invalid_shape(format!("array size must be an integral type, found {}", size.ty), span));
            }
            code.emit_load(&size.ty, slot)?;
            slot += size.ty.width();
            coerce(code, pool, &size.ty, &TypeEnum::int())?;
        }

        let result = Type::Object(descriptor::class_constant_name(target_ty));
        match target_ty.component_type() {
            Some(TypeEnum::Primitive(component)) if exact.len() == 1 => {
                code.emitop1(opcodes::NEWARRAY, array_type_code(*component));
            }
            Some(component) if exact.len() == 1 => {
                let index = pool.add_class(&descriptor::class_constant_name(component))?;
                code.emitop2(opcodes::ANEWARRAY, index);
            }
            _ => {
                let index = pool.add_class(&descriptor::class_constant_name(target_ty))?;
                code.emitop2(opcodes::MULTIANEWARRAY, index);
                code.emit1(size_count);
            }
        }
        code.pop(exact.len())?;
        code.push(result);
        Ok(())
    }
}

fn array_type_code(component: PrimitiveType) -> u8 {
    match component {
        PrimitiveType::Boolean => T_BOOLEAN,
        PrimitiveType::Char => T_CHAR,
        PrimitiveType::Float => T_FLOAT,
        PrimitiveType::Double => T_DOUBLE,
        PrimitiveType::Byte => T_BYTE,
        PrimitiveType::Short => T_SHORT,
        PrimitiveType::Int => T_INT,
        PrimitiveType::Long => T_LONG,
    }
}

/// Converts the value on top of the stack from `from` to `to` by primitive
/// widening, boxing or unboxing. Reference widening needs no code.
pub fn coerce(code: &mut Code, pool: &mut ConstantPool, from: &TypeEnum, to: &TypeEnum) -> Result<()> {
    if from == to {
        return Ok(());
    }
    match (from, to) {
        (TypeEnum::Primitive(f), TypeEnum::Primitive(t)) => widen(code, *f, *t),
        (TypeEnum::Primitive(f), TypeEnum::Reference(_)) => {
            let wrapper = TypeEnum::class(f.wrapper());
            let value_of = descriptor::method_descriptor([from], &wrapper);
            let index = pool.add_method_ref(f.wrapper(), "valueOf", &value_of)?;
            code.emit_invoke(opcodes::INVOKESTATIC, index, std::slice::from_ref(from), &wrapper)?;
            Ok(())
        }
        (TypeEnum::Reference(_), TypeEnum::Primitive(t)) => {
            let (Some(owner), Some(unboxed)) = (from.internal_name(), from.unboxed()) else {
                return Err(Error::internal(format!("cannot unbox {} to {}", from, to)));
            };
            let unboxed_ty = TypeEnum::Primitive(unboxed);
            let getter = descriptor::method_descriptor(&[] as &[TypeEnum], &unboxed_ty);
            let index = pool.add_method_ref(owner, &format!("{}Value", unboxed.name()), &getter)?;
            code.emit_invoke(opcodes::INVOKEVIRTUAL, index, &[], &unboxed_ty)?;
            widen(code, unboxed, *t)
        }
        _ => Ok(()),
    }
}

fn widen(code: &mut Code, from: PrimitiveType, to: PrimitiveType) -> Result<()> {
    use PrimitiveType::*;
    if from == to || (from.is_int_like() && to.is_int_like()) {
        return Ok(());
    }
    let op = match (from, to) {
        (f, Long) if f.is_int_like() => opcodes::I2L,
        (f, Float) if f.is_int_like() => opcodes::I2F,
        (f, Double) if f.is_int_like() => opcodes::I2D,
        (Long, Float) => opcodes::L2F,
        (Long, Double) => opcodes::L2D,
        (Float, Double) => opcodes::F2D,
        _ => return Err(Error::internal(format!("no widening from {} to {}", from.name(), to.name()))),
    };
    code.emitop(op);
    code.pop(1)?;
    if let Some(t) = Type::of(&TypeEnum::Primitive(to)) {
        code.push(t);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unboxing_integer_to_long_widens_after_int_value() {
        let mut code = Code::new(1, false);
        let mut pool = ConstantPool::new();
        let integer = TypeEnum::class("java/lang/Integer");
        code.emit_load(&integer, 0).unwrap();
        coerce(&mut code, &mut pool, &integer, &TypeEnum::Primitive(PrimitiveType::Long)).unwrap();

        assert_eq!(code.bytes()[1], opcodes::INVOKEVIRTUAL);
        assert_eq!(code.bytes()[4], opcodes::I2L);
        assert_eq!(code.stack(), &[Type::Long]);
        assert!(pool.constants().iter().any(|c| matches!(c, crate::codegen::constpool::Constant::Utf8(s) if s == "intValue")));
    }

    #[test]
    fn boxing_calls_value_of() {
        let mut code = Code::new(1, false);
        let mut pool = ConstantPool::new();
        code.emit_load(&TypeEnum::int(), 0).unwrap();
        coerce(&mut code, &mut pool, &TypeEnum::int(), &TypeEnum::object()).unwrap();

        assert_eq!(code.bytes()[1], opcodes::INVOKESTATIC);
        assert_eq!(code.stack(), &[Type::Object("java/lang/Integer".into())]);
    }
}
