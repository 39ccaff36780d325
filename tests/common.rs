// Common test utilities
#![allow(dead_code)]

use indylink::ast::{Expr, LocalExpr, MethodReferenceExpr, Span, TargetRef, TypeEnum, TypeExpr};
use indylink::codegen::class::ClassFile;
use indylink::codegen::code::Code;
use indylink::codegen::constpool::Constant;
use indylink::codegen::method_ref::{lower_method_reference, Lowering, LoweredReference, MethodRefLowering};
use indylink::codegen::opcodes::access_flags::*;
use indylink::common::class_manager::{ClassInfo, ClassManager, MethodInfo, Parameter};
use indylink::common::compilation_context::GeneratorContext;
use indylink::{Config, Error, Result};

pub const ENCLOSING: &str = "p/Enclosing";
pub const FUNCTION: &str = "java/util/function/Function";
pub const BI_FUNCTION: &str = "java/util/function/BiFunction";
pub const SUPPLIER: &str = "java/util/function/Supplier";
pub const INT_FUNCTION: &str = "java/util/function/IntFunction";

pub fn param(name: &str, ty: TypeEnum) -> Parameter {
    Parameter::new(name, ty)
}

pub fn abstract_method(name: &str, params: Vec<Parameter>, ret: TypeEnum) -> MethodInfo {
    MethodInfo::new(name, params, ret).with_access(ACC_PUBLIC | ACC_ABSTRACT)
}

pub fn static_method(name: &str, params: Vec<Parameter>, ret: TypeEnum) -> MethodInfo {
    MethodInfo::new(name, params, ret).with_access(ACC_PUBLIC | ACC_STATIC)
}

pub fn integer() -> TypeEnum {
    TypeEnum::class("java/lang/Integer")
}

pub fn number() -> TypeEnum {
    TypeEnum::class("java/lang/Number")
}

/// Class model with java.lang, the java.util.function interfaces used by the
/// tests and an empty enclosing class
pub fn standard_classes() -> ClassManager {
    let mut classes = ClassManager::with_java_lang();
    let object = TypeEnum::object();
    classes.register(
        ClassInfo::new_interface(FUNCTION)
            .with_method(abstract_method("apply", vec![param("t", object.clone())], object.clone()))
            .with_method(MethodInfo::new("andThen", vec![param("after", TypeEnum::interface(FUNCTION))], TypeEnum::interface(FUNCTION))),
    );
    classes.register(
        ClassInfo::new_interface(BI_FUNCTION).with_method(abstract_method(
            "apply",
            vec![param("t", object.clone()), param("u", object.clone())],
            object.clone(),
        )),
    );
    classes.register(ClassInfo::new_interface(SUPPLIER).with_method(abstract_method("get", vec![], object.clone())));
    classes.register(
        ClassInfo::new_interface(INT_FUNCTION)
            .with_method(abstract_method("apply", vec![param("value", TypeEnum::int())], object.clone())),
    );
    classes.register(ClassInfo::new_class(ENCLOSING));
    classes
}

/// One enclosing type under generation, lowering references inside `run()`
pub struct Fixture {
    pub classes: ClassManager,
    pub generator: GeneratorContext,
    pub class_file: ClassFile,
    pub code: Code,
    pub config: Config,
    pub method: Option<String>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_classes(standard_classes())
    }

    pub fn with_classes(classes: ClassManager) -> Self {
        let config = Config::default();
        Self {
            classes,
            generator: GeneratorContext::new(ENCLOSING),
            class_file: ClassFile::new(ENCLOSING, false, &config),
            code: Code::new(4, false),
            config,
            method: Some("run".to_string()),
        }
    }

    /// Enclosing type declared as an interface
    pub fn interface() -> Self {
        let mut classes = standard_classes();
        classes.register(ClassInfo::new_interface(ENCLOSING));
        let mut fixture = Self::with_classes(classes);
        fixture.class_file = ClassFile::new(ENCLOSING, true, &fixture.config);
        fixture
    }

    pub fn register(&mut self, class: ClassInfo) -> &mut Self {
        self.classes.register(class);
        self
    }

    pub fn lower(&mut self, reference: &MethodReferenceExpr) -> Result<Lowering> {
        let context = self.generator.method_context(self.method.as_deref());
        let mut lowering =
            MethodRefLowering::new(&mut self.classes, &context, &mut self.class_file, &mut self.code, &self.config)?;
        lower_method_reference(&mut lowering, reference)
    }

    /// Lowers a reference that must produce a call site
    pub fn lower_dynamic(&mut self, reference: &MethodReferenceExpr) -> Result<LoweredReference> {
        match self.lower(reference)? {
            Lowering::Dynamic(lowered) => Ok(lowered),
            Lowering::Fallback(reason) => Err(Error::internal(format!("unexpected fallback: {:?}", reason))),
        }
    }

    pub fn method_type(&self, index: u16) -> Option<&str> {
        match self.class_file.constant_pool.get(index) {
            Some(Constant::MethodType(descriptor)) => self.class_file.constant_pool.utf8(*descriptor),
            _ => None,
        }
    }

    /// (kind, owner, name, descriptor, is_interface_member) of a method handle
    pub fn method_handle(&self, index: u16) -> Option<(u8, &str, &str, &str, bool)> {
        let pool = &self.class_file.constant_pool;
        let Some(Constant::MethodHandle(kind, reference)) = pool.get(index) else {
            return None;
        };
        let (owner, name, descriptor) = pool.member_ref(*reference)?;
        let is_interface = matches!(pool.get(*reference), Some(Constant::InterfaceMethodRef(_, _)));
        Some((*kind, owner, name, descriptor, is_interface))
    }
}

pub fn span() -> Span {
    Span::from_to(3, 9, 3, 24)
}

pub fn type_ref(target: TypeEnum, member: &str, functional_interface: &str, inferred: Vec<Option<TypeEnum>>) -> MethodReferenceExpr {
    MethodReferenceExpr {
        target: TargetRef::Type(TypeExpr { ty: target, span: span() }),
        member: member.to_string(),
        functional_interface: Some(TypeEnum::interface(functional_interface)),
        inferred_parameter_types: Some(inferred),
        span: span(),
    }
}

pub fn value_ref(receiver: Expr, member: &str, functional_interface: &str, inferred: Vec<Option<TypeEnum>>) -> MethodReferenceExpr {
    MethodReferenceExpr {
        target: TargetRef::Value(receiver),
        member: member.to_string(),
        functional_interface: Some(TypeEnum::interface(functional_interface)),
        inferred_parameter_types: Some(inferred),
        span: span(),
    }
}

pub fn local(name: &str, slot: u16, ty: TypeEnum) -> Expr {
    Expr::Local(LocalExpr { name: name.to_string(), slot, ty, span: span() })
}
