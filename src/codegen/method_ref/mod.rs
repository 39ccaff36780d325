//! Method reference lowering
//!
//! Turns `Type::member`, `expr::member`, `Type::new` and `Type[]::new` into an
//! `invokedynamic` call site linked through `LambdaMetafactory`. The pipeline
//! for one reference:
//!
//! 1. find the single abstract method of the inferred functional interface
//! 2. specialise its parameters with the inferred argument types
//! 3. resolve the referenced method, or synthesize a factory for `::new`
//! 4. emit the receiver (bound references only) and the call site
//!
//! References without the type checker's metadata, or whose target type is
//! not a functional interface, are handed back as [`Lowering::Fallback`].

pub mod call_site;
pub mod ctor_ref;
pub mod exact_params;
pub mod parameters;
pub mod resolver;
pub mod sam;

pub use call_site::{CallSite, CallSiteEmitter, HandleKind};
pub use ctor_ref::ConstructorSynthesizer;
pub use exact_params::ExactParameters;
pub use parameters::{parameters_compatible, parameters_equal};
pub use resolver::{CandidateMethod, MatchScore, MethodReferenceResolver};
pub use sam::FunctionalInterfaceSpec;

use crate::ast::{MethodReferenceExpr, TargetRef, TypeEnum};
use crate::codegen::class::ClassFile;
use crate::codegen::code::Code;
use crate::codegen::descriptor;
use crate::codegen::expr_writer::{ExprWriter, ExpressionEmitter};
use crate::common::class_manager::{ClassManager, MethodInfo, Parameter};
use crate::common::compilation_context::MethodContext;
use crate::common::config::Config;
use crate::common::error::{Error, Result};
use crate::common::visibility::{JavaVisibility, VisibilityFilter};

/// Collaborators for lowering the references of one enclosing method
pub struct MethodRefLowering<'a> {
    pub classes: &'a mut ClassManager,
    pub context: &'a MethodContext,
    pub class_file: &'a mut ClassFile,
    pub code: &'a mut Code,
    pub config: &'a Config,
    pub visibility: Box<dyn VisibilityFilter>,
    pub expressions: Box<dyn ExpressionEmitter>,
}

impl<'a> MethodRefLowering<'a> {
    pub fn new(
        classes: &'a mut ClassManager,
        context: &'a MethodContext,
        class_file: &'a mut ClassFile,
        code: &'a mut Code,
        config: &'a Config,
    ) -> Result<Self> {
        config.validate()?;
        if class_file.this_class != context.class_name() {
            return Err(Error::internal(format!(
                "method context for {} used with class file {}",
                context.class_name(),
                class_file.this_class
            )));
        }
        Ok(Self {
            classes,
            context,
            class_file,
            code,
            config,
            visibility: Box::new(JavaVisibility),
            expressions: Box::new(ExprWriter::new()),
        })
    }

    pub fn with_visibility(mut self, visibility: impl VisibilityFilter + 'static) -> Self {
        self.visibility = Box::new(visibility);
        self
    }

    pub fn with_expression_emitter(mut self, expressions: impl ExpressionEmitter + 'static) -> Self {
        self.expressions = Box::new(expressions);
        self
    }
}

/// Why a reference is left to the generic lowering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    MissingFunctionalInterface,
    NotFunctionalInterface(String),
    MissingInferredTypes,
}

#[derive(Debug, Clone)]
pub enum Lowering {
    Dynamic(LoweredReference),
    Fallback(FallbackReason),
}

impl Lowering {
    pub fn as_dynamic(&self) -> Option<&LoweredReference> {
        match self {
            Lowering::Dynamic(lowered) => Some(lowered),
            Lowering::Fallback(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoweredReference {
    pub resolved: ResolvedReference,
    pub call_site: CallSite,
    /// Factory method added to the enclosing type for `::new` references
    pub synthesized: Option<MethodInfo>,
}

/// The method a reference was bound to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReference {
    pub method: MethodInfo,
    /// Nominal owner of the implementation handle: the enclosing type for
    /// constructor references, the declared target type otherwise
    pub owner: TypeEnum,
    pub owner_is_interface: bool,
    pub exact_parameters: ExactParameters,
    pub is_constructor_reference: bool,
}

impl ResolvedReference {
    pub fn exact_parameters(&self) -> &[Parameter] {
        self.exact_parameters.as_slice()
    }

    /// Method type the functional interface method is specialised to at the
    /// call site
    pub fn instantiated_descriptor(&self) -> String {
        descriptor::parameters_descriptor(self.exact_parameters(), &self.method.return_type)
    }

    pub fn handle_kind(&self) -> HandleKind {
        HandleKind::of(self)
    }
}

/// Lowers one method reference expression into the current code buffer
pub fn lower_method_reference(lowering: &mut MethodRefLowering<'_>, reference: &MethodReferenceExpr) -> Result<Lowering> {
    let Some(functional_interface) = &reference.functional_interface else {
        log::debug!("{} at {}: no functional interface type, using fallback", reference, reference.span);
        return Ok(Lowering::Fallback(FallbackReason::MissingFunctionalInterface));
    };
    let Some(sam) = FunctionalInterfaceSpec::find(lowering.classes, functional_interface) else {
        log::debug!("{} at {}: {} is not a functional interface, using fallback", reference, reference.span, functional_interface);
        return Ok(Lowering::Fallback(FallbackReason::NotFunctionalInterface(functional_interface.to_string())));
    };
    let Some(inferred) = &reference.inferred_parameter_types else {
        log::debug!("{} at {}: no inferred parameter types, using fallback", reference, reference.span);
        return Ok(Lowering::Fallback(FallbackReason::MissingInferredTypes));
    };

    let exact = ExactParameters::build(lowering.classes, &sam, inferred, reference.span)?;

    let (resolved, synthesized) = if reference.is_constructor_reference() {
        let TargetRef::Type(target) = &reference.target else {
            return Err(Error::invalid_shape("constructor reference must be `Type::new`", reference.span));
        };
        let factory = ConstructorSynthesizer::new(
            lowering.classes,
            lowering.class_file,
            lowering.context,
            lowering.visibility.as_ref(),
            lowering.config,
        )
        .synthesize(target, &exact, reference.span)?;
        let owner = if lowering.class_file.is_interface {
            TypeEnum::interface(lowering.class_file.this_class.clone())
        } else {
            TypeEnum::class(lowering.class_file.this_class.clone())
        };
        let resolved = ResolvedReference {
            method: factory.clone(),
            owner,
            owner_is_interface: lowering.class_file.is_interface,
            exact_parameters: exact,
            is_constructor_reference: true,
        };
        (resolved, Some(factory))
    } else {
        let method = MethodReferenceResolver::new(lowering.classes, lowering.visibility.as_ref(), lowering.context.class_name())
            .resolve(reference, &exact)?
            .clone();
        let owner = lowering.classes.resolve_type(&reference.target.static_type());
        let owner_is_interface = owner.internal_name().is_some_and(|name| lowering.classes.is_interface(name));
        let resolved = ResolvedReference {
            method,
            owner,
            owner_is_interface,
            exact_parameters: exact,
            is_constructor_reference: false,
        };
        (resolved, None)
    };

    let call_site =
        CallSiteEmitter::new(lowering.class_file, lowering.code, lowering.expressions.as_mut(), lowering.classes, lowering.config)
            .emit(reference, &sam, &resolved)?;

    Ok(Lowering::Dynamic(LoweredReference { resolved, call_site, synthesized }))
}
