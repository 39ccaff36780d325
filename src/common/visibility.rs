//! Member accessibility from the enclosing type

use crate::common::class_manager::{ClassManager, MethodInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    pub fn of(method: &MethodInfo) -> Self {
        if method.is_public() {
            Visibility::Public
        } else if method.is_protected() {
            Visibility::Protected
        } else if method.is_private() {
            Visibility::Private
        } else {
            Visibility::Package
        }
    }
}

/// Drops candidates the accessing type may not reference
pub trait VisibilityFilter {
    fn filter_visible<'a>(
        &self,
        methods: Vec<&'a MethodInfo>,
        accessing_class: &str,
        classes: &ClassManager,
    ) -> Vec<&'a MethodInfo>;
}

/// Java language access rules (JLS 6.6), with nest members sharing private access
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaVisibility;

impl JavaVisibility {
    pub fn is_accessible(&self, method: &MethodInfo, accessing_class: &str, classes: &ClassManager) -> bool {
        let declaring = classes.resolved_name(&method.declaring_class);
        let accessing = classes.resolved_name(accessing_class);
        match Visibility::of(method) {
            Visibility::Public => true,
            Visibility::Private => nest_host(declaring) == nest_host(accessing),
            Visibility::Package => package_of(declaring) == package_of(accessing),
            Visibility::Protected => {
                package_of(declaring) == package_of(accessing)
                    || classes.all_supertypes(accessing).iter().any(|t| t == declaring)
            }
        }
    }
}

impl VisibilityFilter for JavaVisibility {
    fn filter_visible<'a>(
        &self,
        methods: Vec<&'a MethodInfo>,
        accessing_class: &str,
        classes: &ClassManager,
    ) -> Vec<&'a MethodInfo> {
        methods
            .into_iter()
            .filter(|m| {
                let visible = self.is_accessible(m, accessing_class, classes);
                if !visible {
                    log::trace!("{}.{}{} is not visible from {}", m.declaring_class, m.name, m.descriptor(), accessing_class);
                }
                visible
            })
            .collect()
    }
}

fn package_of(internal_name: &str) -> &str {
    internal_name.rsplit_once('/').map(|(pkg, _)| pkg).unwrap_or("")
}

fn nest_host(internal_name: &str) -> &str {
    internal_name.split_once('$').map(|(outer, _)| outer).unwrap_or(internal_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeEnum;
    use crate::codegen::opcodes::access_flags::*;
    use crate::common::class_manager::ClassInfo;

    #[test]
    fn private_members_are_shared_within_a_nest() {
        let mut classes = ClassManager::with_java_lang();
        classes.register(
            ClassInfo::new_class("p/Outer")
                .with_method(MethodInfo::new("secret", vec![], TypeEnum::Void).with_access(ACC_PRIVATE)),
        );
        let outer = classes.get("p/Outer").unwrap();
        let secret = &outer.methods[0];
        let visibility = JavaVisibility;
        assert!(visibility.is_accessible(secret, "p/Outer$Inner", &classes));
        assert!(!visibility.is_accessible(secret, "p/Other", &classes));
    }

    #[test]
    fn protected_members_reach_subclasses_in_other_packages() {
        let mut classes = ClassManager::with_java_lang();
        classes.register(
            ClassInfo::new_class("a/Base")
                .with_method(MethodInfo::new("hook", vec![], TypeEnum::Void).with_access(ACC_PROTECTED)),
        );
        classes.register(ClassInfo::new_class("b/Sub").extends("a/Base"));
        classes.register(ClassInfo::new_class("b/Unrelated"));
        let hook = &classes.get("a/Base").unwrap().methods[0];
        let visible = JavaVisibility.filter_visible(vec![hook], "b/Sub", &classes);
        assert_eq!(visible.len(), 1);
        assert!(JavaVisibility.filter_visible(vec![hook], "b/Unrelated", &classes).is_empty());
    }
}
