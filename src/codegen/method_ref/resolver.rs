//! Method reference target resolution
//!
//! Candidates are the visible methods carrying the referenced name on the
//! target type and its supertypes. A candidate matches when the exact
//! parameters (minus the receiver for `Type::instanceMethod`) are compatible
//! with its declared parameters. Several matches are ranked by
//! [`MatchScore`]; equal scores fall back to the most specific candidate.

use super::exact_params::ExactParameters;
use super::parameters::{parameters_compatible, parameters_equal};
use crate::ast::{AstNode, MethodReferenceExpr, ReferenceType, Span, TypeEnum};
use crate::common::class_manager::{ClassManager, MethodInfo, Parameter};
use crate::common::consts;
use crate::common::error::{Error, Result};
use crate::common::visibility::VisibilityFilter;

/// Ranking of a matching candidate; only compared against other candidates
/// for the same reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchScore(u32);

impl MatchScore {
    const MAX_DEPTH: u32 = 9;
    const SHAPE_BONUS: u32 = 9;

    /// `declaring_chain` is the candidate's declaring type followed by its
    /// superclasses. Each step taken before reaching `target` costs one
    /// depth level; a chain that never reaches it costs its full length.
    pub fn compute(declaring_chain: &[String], target: &str, shape_agrees: bool) -> Self {
        let steps = declaring_chain.iter().position(|t| t == target).unwrap_or(declaring_chain.len());
        let depth = Self::MAX_DEPTH.saturating_sub(u32::try_from(steps).unwrap_or(u32::MAX));
        let bonus = if shape_agrees { Self::SHAPE_BONUS } else { 0 };
        MatchScore(depth * 10 + bonus)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// A method matching the reference, with the arguments it was matched against
#[derive(Debug, Clone, Copy)]
pub struct CandidateMethod<'a> {
    pub method: &'a MethodInfo,
    /// Position among the visible methods of the target
    pub order: usize,
    /// `Type::instanceMethod`: the first exact parameter is the receiver
    pub unbound_receiver: bool,
    pub arguments: &'a [Parameter],
}

impl CandidateMethod<'_> {
    pub fn declaring_class(&self) -> &str {
        &self.method.declaring_class
    }

    pub fn is_static(&self) -> bool {
        self.method.is_static()
    }
}

/// Picks one of several equally ranked candidates: an exact parameter match,
/// then the candidate whose parameters fit every other one, then the earliest
pub fn most_specific<'a>(tied: &[CandidateMethod<'a>], classes: &ClassManager) -> Option<CandidateMethod<'a>> {
    let exact = tied.iter().find(|c| parameters_equal(c.arguments, &c.method.parameters));
    let specific = || {
        tied.iter().find(|c| {
            tied.iter().all(|other| parameters_compatible(&c.method.parameters, &other.method.parameters, classes))
        })
    };
    exact.or_else(specific).or_else(|| tied.iter().min_by_key(|c| c.order)).copied()
}

pub struct MethodReferenceResolver<'a> {
    classes: &'a ClassManager,
    visibility: &'a dyn VisibilityFilter,
    accessing_class: &'a str,
}

impl<'a> MethodReferenceResolver<'a> {
    pub fn new(classes: &'a ClassManager, visibility: &'a dyn VisibilityFilter, accessing_class: &'a str) -> Self {
        Self { classes, visibility, accessing_class }
    }

    /// The method a `Type::member` or `expr::member` reference denotes
    pub fn resolve(&self, reference: &MethodReferenceExpr, exact: &'a ExactParameters) -> Result<&'a MethodInfo> {
        let target_type = reference.target.static_type();
        let lookup_type = match &target_type {
            TypeEnum::Reference(ReferenceType::Array(_)) => consts::JAVA_LANG_OBJECT,
            other => other.internal_name().ok_or_else(|| {
                Error::invalid_shape(format!("cannot reference a method of type {}", other), reference.span)
            })?,
        };
        let target_name = self.classes.resolved_name(lookup_type).to_string();
        let is_type = reference.target.is_type();

        let mut candidates = Vec::new();
        for (order, method) in self.visible_methods(lookup_type, &reference.member).into_iter().enumerate() {
            let unbound_receiver = is_type && !method.is_static();
            let arguments = if unbound_receiver {
                match exact.without_receiver() {
                    Some(rest) => rest,
                    None => {
                        log::trace!("skipping {}{}: no receiver argument", method.name, method.descriptor());
                        continue;
                    }
                }
            } else {
                exact.as_slice()
            };
            if parameters_compatible(arguments, &method.parameters, self.classes) {
                candidates.push(CandidateMethod { method, order, unbound_receiver, arguments });
            } else {
                log::trace!("skipping {}.{}{}: incompatible parameters", method.declaring_class, method.name, method.descriptor());
            }
        }

        let chosen = match candidates.as_slice() {
            [] => {
                return Err(Error::UnresolvedReference {
                    member: reference.member.clone(),
                    parameters: exact.type_names(),
                    target: target_type.to_string(),
                    span: reference.span,
                })
            }
            [single] => *single,
            _ => self.choose_by_score(&candidates, &target_name, is_type)?,
        };

        if chosen.unbound_receiver {
            self.check_receiver(exact, &target_type, reference.target.span())?;
        }
        log::debug!(
            "{} resolved to {}.{}{}",
            reference,
            chosen.declaring_class(),
            chosen.method.name,
            chosen.method.descriptor()
        );
        Ok(chosen.method)
    }

    /// Visible constructor of `class_name` accepting `arguments`
    pub fn select_constructor(&self, class_name: &str, arguments: &'a ExactParameters, span: Span) -> Result<&'a MethodInfo> {
        let unresolved = || Error::UnresolvedReference {
            member: consts::CONSTRUCTOR_REFERENCE.to_string(),
            parameters: arguments.type_names(),
            target: class_name.replace('/', "."),
            span,
        };
        let class = self.classes.redirect(class_name).ok_or_else(unresolved)?;
        let constructors = self.visibility.filter_visible(
            class.methods_named(consts::CONSTRUCTOR_NAME),
            self.accessing_class,
            self.classes,
        );
        let candidates: Vec<CandidateMethod<'a>> = constructors
            .into_iter()
            .enumerate()
            .filter(|(_, ctor)| parameters_compatible(arguments.as_slice(), &ctor.parameters, self.classes))
            .map(|(order, method)| CandidateMethod { method, order, unbound_receiver: false, arguments: arguments.as_slice() })
            .collect();
        most_specific(&candidates, self.classes).map(|c| c.method).ok_or_else(unresolved)
    }

    fn visible_methods(&self, owner: &str, member: &str) -> Vec<&'a MethodInfo> {
        let methods = self.classes.methods_in_hierarchy(owner, member);
        self.visibility.filter_visible(methods, self.accessing_class, self.classes)
    }

    fn choose_by_score(&self, candidates: &[CandidateMethod<'a>], target_name: &str, is_type: bool) -> Result<CandidateMethod<'a>> {
        let scored: Vec<(CandidateMethod<'a>, MatchScore)> = candidates
            .iter()
            .map(|c| {
                let chain = self.classes.superclass_chain(c.declaring_class());
                let score = MatchScore::compute(&chain, target_name, is_type == c.is_static());
                log::trace!("candidate {}.{}{} scores {}", c.declaring_class(), c.method.name, c.method.descriptor(), score.value());
                (*c, score)
            })
            .collect();
        let best = scored.iter().map(|(_, s)| *s).max();
        let tied: Vec<CandidateMethod<'a>> =
            scored.into_iter().filter(|(_, s)| Some(*s) == best).map(|(c, _)| c).collect();
        most_specific(&tied, self.classes).ok_or_else(|| Error::internal("no candidate left after scoring"))
    }

    fn check_receiver(&self, exact: &ExactParameters, target_type: &TypeEnum, span: Span) -> Result<()> {
        let Some(receiver) = exact.as_slice().first() else {
            return Ok(());
        };
        if self.classes.is_subtype(&receiver.ty, target_type) {
            return Ok(());
        }
        Err(Error::ReceiverTypeMismatch { receiver: receiver.ty.to_string(), target: target_type.to_string(), span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn score_decreases_with_distance_from_target() {
        let own = chain(&["p/A", "java/lang/Object"]);
        let inherited = chain(&["p/Base", "java/lang/Object"]);
        assert_eq!(MatchScore::compute(&own, "p/A", true).value(), 99);
        assert_eq!(MatchScore::compute(&own, "p/A", false).value(), 90);
        // p/A is never reached from p/Base
        assert_eq!(MatchScore::compute(&inherited, "p/A", true).value(), 79);
    }

    #[test]
    fn score_depth_clamps_at_zero() {
        let long: Vec<String> = (0..12).map(|i| format!("p/T{}", i)).collect();
        assert_eq!(MatchScore::compute(&long, "p/Missing", false).value(), 0);
        assert_eq!(MatchScore::compute(&long, "p/Missing", true).value(), 9);
    }
}
