//! Parameter list comparison used when matching candidates

use crate::common::class_manager::{ClassManager, Parameter};

/// Same arity and identical types slot by slot
pub fn parameters_equal(a: &[Parameter], b: &[Parameter]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ty == y.ty)
}

/// Same arity and every argument slot of `arguments` assignable to the
/// matching slot of `declared`
pub fn parameters_compatible(arguments: &[Parameter], declared: &[Parameter], classes: &ClassManager) -> bool {
    arguments.len() == declared.len()
        && arguments.iter().zip(declared).all(|(a, d)| classes.is_assignable(&a.ty, &d.ty))
}
