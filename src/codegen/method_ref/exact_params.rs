//! Abstract-method parameters specialised with the types inferred at the use site

use super::sam::FunctionalInterfaceSpec;
use crate::ast::{Span, TypeEnum};
use crate::common::class_manager::{ClassManager, Parameter};
use crate::common::error::{Error, Result};

/// Fresh parameter list; the functional interface's own method is never touched
#[derive(Debug, Clone, PartialEq)]
pub struct ExactParameters {
    parameters: Vec<Parameter>,
}

impl ExactParameters {
    /// Overlays each inferred slot on a copy of the abstract method's
    /// parameters. Gaps keep the declared type.
    pub fn build(
        classes: &ClassManager,
        sam: &FunctionalInterfaceSpec,
        inferred: &[Option<TypeEnum>],
        span: Span,
    ) -> Result<Self> {
        let declared = &sam.method.parameters;
        if declared.len() != inferred.len() {
            return Err(Error::internal_at(
                format!(
                    "{} inferred parameter types for {}.{} which takes {}",
                    inferred.len(),
                    sam.interface,
                    sam.method.name,
                    declared.len()
                ),
                span,
            ));
        }

        let parameters = declared
            .iter()
            .zip(inferred)
            .map(|(parameter, inferred)| match inferred {
                Some(inferred) => Ok(parameter.retyped(convert_parameter_type(classes, &parameter.ty, inferred, span)?)),
                None => Ok(parameter.clone()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { parameters })
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Arguments left once an unbound receiver is taken from the first slot
    pub fn without_receiver(&self) -> Option<&[Parameter]> {
        self.parameters.split_first().map(|(_, rest)| rest)
    }

    /// Comma-joined source names of the parameter types
    pub fn type_names(&self) -> String {
        self.parameters.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>().join(",")
    }

}

/// The inferred type must fit the declared slot once both sides are boxed.
/// Primitive and reference types are not mixed: the result takes the slot's
/// kind.
fn convert_parameter_type(classes: &ClassManager, declared: &TypeEnum, inferred: &TypeEnum, span: Span) -> Result<TypeEnum> {
    if !classes.is_subtype(&inferred.boxed(), &declared.boxed()) {
        return Err(Error::InferredTypeMismatch { inferred: inferred.to_string(), declared: declared.to_string(), span });
    }
    let converted = match (declared.is_primitive(), inferred) {
        (false, TypeEnum::Primitive(_)) => inferred.boxed(),
        (true, TypeEnum::Reference(_)) => inferred.unboxed().map(TypeEnum::Primitive).unwrap_or_else(|| declared.clone()),
        _ => inferred.clone(),
    };
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::opcodes::access_flags::*;
    use crate::common::class_manager::MethodInfo;

    fn bi_function() -> FunctionalInterfaceSpec {
        FunctionalInterfaceSpec {
            interface: TypeEnum::interface("java/util/function/BiFunction"),
            method: MethodInfo::new(
                "apply",
                vec![Parameter::new("t", TypeEnum::object()), Parameter::new("u", TypeEnum::object())],
                TypeEnum::object(),
            )
            .with_access(ACC_PUBLIC | ACC_ABSTRACT),
        }
    }

    #[test]
    fn inferred_slots_replace_and_gaps_keep_declared_types() {
        let classes = ClassManager::with_java_lang();
        let sam = bi_function();
        let exact = ExactParameters::build(&classes, &sam, &[Some(TypeEnum::int()), None], Span::default()).unwrap();

        assert_eq!(exact.len(), 2);
        assert_eq!(exact.as_slice()[0].ty, TypeEnum::class("java/lang/Integer"));
        assert_eq!(exact.as_slice()[0].origin_ty, TypeEnum::class("java/lang/Integer"));
        assert_eq!(exact.as_slice()[1].ty, TypeEnum::object());
        assert_eq!(sam.method.parameters[0].ty, TypeEnum::object());
    }

    #[test]
    fn arity_mismatch_is_an_internal_error() {
        let classes = ClassManager::with_java_lang();
        let span = Span::from_to(7, 5, 7, 19);
        let err = ExactParameters::build(&classes, &bi_function(), &[None], span).unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.span(), Some(span));
        assert!(err.to_string().starts_with("7:5: Internal compiler error: 1 inferred parameter types"));
    }

    #[test]
    fn incompatible_inferred_type_is_reported() {
        let classes = ClassManager::with_java_lang();
        let mut sam = bi_function();
        sam.method.parameters[0] = Parameter::new("t", TypeEnum::class("java/lang/Number"));
        let err = ExactParameters::build(&classes, &sam, &[Some(TypeEnum::string()), None], Span::default()).unwrap_err();
        assert!(matches!(err, Error::InferredTypeMismatch { .. }));
    }
}
