// Well-known names shared by resolution and emission

use crate::ast::PrimitiveType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";
pub const JAVA_LANG_STRING: &str = "java/lang/String";
pub const JAVA_LANG_NUMBER: &str = "java/lang/Number";
pub const JAVA_LANG_CLONEABLE: &str = "java/lang/Cloneable";
pub const JAVA_IO_SERIALIZABLE: &str = "java/io/Serializable";

pub const CONSTRUCTOR_NAME: &str = "<init>";
// Member name of `Type::new` references
pub const CONSTRUCTOR_REFERENCE: &str = "new";
pub const CTOR_REF_PREFIX: &str = "ctorRef$";

pub const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";
pub const METAFACTORY_NAME: &str = "metafactory";
pub const METAFACTORY_DESCRIPTOR: &str = "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;";

// Hierarchy and alias walks
pub const MAX_HIERARCHY_STEPS: usize = 10_000;
pub const MAX_REDIRECT_STEPS: usize = 64;

// Public java.lang.Object methods an interface may redeclare without
// affecting its functional-interface status
pub const OBJECT_PUBLIC_METHODS: &[(&str, &str)] = &[
    ("equals", "(Ljava/lang/Object;)Z"),
    ("hashCode", "()I"),
    ("toString", "()Ljava/lang/String;"),
];

static WRAPPER_TYPES: Lazy<HashMap<PrimitiveType, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (PrimitiveType::Boolean, "java/lang/Boolean"),
        (PrimitiveType::Char, "java/lang/Character"),
        (PrimitiveType::Byte, "java/lang/Byte"),
        (PrimitiveType::Short, "java/lang/Short"),
        (PrimitiveType::Int, "java/lang/Integer"),
        (PrimitiveType::Long, "java/lang/Long"),
        (PrimitiveType::Float, "java/lang/Float"),
        (PrimitiveType::Double, "java/lang/Double"),
    ])
});

static UNBOXED_TYPES: Lazy<HashMap<&'static str, PrimitiveType>> =
    Lazy::new(|| WRAPPER_TYPES.iter().map(|(p, w)| (*w, *p)).collect());

pub fn wrapper_of(primitive: PrimitiveType) -> &'static str {
    WRAPPER_TYPES.get(&primitive).copied().unwrap_or(JAVA_LANG_OBJECT)
}

pub fn primitive_of_wrapper(internal_name: &str) -> Option<PrimitiveType> {
    UNBOXED_TYPES.get(internal_name).copied()
}

pub fn is_object_public_method(name: &str, descriptor: &str) -> bool {
    OBJECT_PUBLIC_METHODS.iter().any(|(n, d)| *n == name && *d == descriptor)
}
