use super::{AstNode, Span};
use crate::common::consts;
use std::fmt;
use std::hash::{Hash, Hasher};

// Types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Char => 'C',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Internal name of the boxed wrapper class
    pub fn wrapper(self) -> &'static str {
        consts::wrapper_of(self)
    }

    /// Number of operand stack / local variable slots
    pub fn width(self) -> u16 {
        match self {
            PrimitiveType::Long | PrimitiveType::Double => 2,
            _ => 1,
        }
    }

    /// Types the JVM computes with as `int`
    pub fn is_int_like(self) -> bool {
        matches!(
            self,
            PrimitiveType::Boolean | PrimitiveType::Char | PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int
        )
    }

    /// JLS 5.1.2 widening primitive conversion (identity excluded)
    pub fn widens_to(self, to: PrimitiveType) -> bool {
        use PrimitiveType::*;
        match self {
            Byte => matches!(to, Short | Int | Long | Float | Double),
            Short | Char => matches!(to, Int | Long | Float | Double),
            Int => matches!(to, Long | Float | Double),
            Long => matches!(to, Float | Double),
            Float => matches!(to, Double),
            Boolean | Double => false,
        }
    }
}

// Reference type enum for codegen compatibility
#[derive(Debug, Clone, Eq)]
pub enum ReferenceType {
    Class(String),
    Interface(String),
    Array(Box<TypeEnum>),
}

// Class and Interface of the same internal name denote the same type
impl PartialEq for ReferenceType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReferenceType::Array(a), ReferenceType::Array(b)) => a == b,
            (ReferenceType::Array(_), _) | (_, ReferenceType::Array(_)) => false,
            (a, b) => a.class_name() == b.class_name(),
        }
    }
}

impl Hash for ReferenceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ReferenceType::Array(component) => {
                state.write_u8(b'[');
                component.hash(state);
            }
            other => other.class_name().hash(state),
        }
    }
}

impl ReferenceType {
    fn class_name(&self) -> Option<&str> {
        match self {
            ReferenceType::Class(name) | ReferenceType::Interface(name) => Some(name),
            ReferenceType::Array(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeEnum {
    Primitive(PrimitiveType),
    Reference(ReferenceType),
    Void,
}

impl TypeEnum {
    pub fn class(name: impl Into<String>) -> Self {
        TypeEnum::Reference(ReferenceType::Class(name.into()))
    }

    pub fn interface(name: impl Into<String>) -> Self {
        TypeEnum::Reference(ReferenceType::Interface(name.into()))
    }

    pub fn array_of(component: TypeEnum) -> Self {
        TypeEnum::Reference(ReferenceType::Array(Box::new(component)))
    }

    pub fn int() -> Self {
        TypeEnum::Primitive(PrimitiveType::Int)
    }

    pub fn object() -> Self {
        TypeEnum::class(consts::JAVA_LANG_OBJECT)
    }

    pub fn string() -> Self {
        TypeEnum::class(consts::JAVA_LANG_STRING)
    }

    /// Internal name for class and interface types
    pub fn internal_name(&self) -> Option<&str> {
        match self {
            TypeEnum::Reference(r) => r.class_name(),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeEnum::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeEnum::Reference(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeEnum::Reference(ReferenceType::Array(_)))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            TypeEnum::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn array_dims(&self) -> usize {
        match self {
            TypeEnum::Reference(ReferenceType::Array(component)) => 1 + component.array_dims(),
            _ => 0,
        }
    }

    /// One level of array component
    pub fn component_type(&self) -> Option<&TypeEnum> {
        match self {
            TypeEnum::Reference(ReferenceType::Array(component)) => Some(component),
            _ => None,
        }
    }

    /// Boxed counterpart of a primitive; other types unchanged
    pub fn boxed(&self) -> TypeEnum {
        match self {
            TypeEnum::Primitive(p) => TypeEnum::class(p.wrapper()),
            other => other.clone(),
        }
    }

    /// Primitive counterpart of a wrapper class, if any
    pub fn unboxed(&self) -> Option<PrimitiveType> {
        self.internal_name().and_then(consts::primitive_of_wrapper)
    }

    /// Operand stack / local variable slots occupied by a value of this type
    pub fn width(&self) -> u16 {
        match self {
            TypeEnum::Primitive(p) => p.width(),
            TypeEnum::Reference(_) => 1,
            TypeEnum::Void => 0,
        }
    }
}

impl fmt::Display for TypeEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeEnum::Primitive(p) => write!(f, "{}", p.name()),
            TypeEnum::Void => write!(f, "void"),
            TypeEnum::Reference(ReferenceType::Array(component)) => write!(f, "{}[]", component),
            TypeEnum::Reference(ReferenceType::Class(name))
            | TypeEnum::Reference(ReferenceType::Interface(name)) => write!(f, "{}", name.replace('/', ".")),
        }
    }
}

impl From<PrimitiveType> for TypeEnum {
    fn from(p: PrimitiveType) -> Self {
        TypeEnum::Primitive(p)
    }
}

// Expressions

/// Receiver expressions a bound method reference may capture
#[derive(Debug, Clone)]
pub enum Expr {
    This(ThisExpr),
    Local(LocalExpr),
    Literal(LiteralExpr),
    FieldAccess(FieldAccessExpr),
    MethodCall(MethodCallExpr),
}

impl Expr {
    /// Static type attached by the type checker
    pub fn static_type(&self) -> TypeEnum {
        match self {
            Expr::This(e) => e.ty.clone(),
            Expr::Local(e) => e.ty.clone(),
            Expr::Literal(e) => match &e.value {
                Literal::Integer(_) => TypeEnum::int(),
                Literal::String(_) => TypeEnum::string(),
                Literal::Null => TypeEnum::object(),
            },
            Expr::FieldAccess(e) => e.ty.clone(),
            Expr::MethodCall(e) => e.return_type.clone(),
        }
    }
}

impl AstNode for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::This(e) => e.span,
            Expr::Local(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::FieldAccess(e) => e.span,
            Expr::MethodCall(e) => e.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThisExpr {
    pub ty: TypeEnum,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LocalExpr {
    pub name: String,
    pub slot: u16,
    pub ty: TypeEnum,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Literal {
    Integer(i32),
    String(String),
    Null,
}

/// `target.name`, or a static field read when `target` is `None`
#[derive(Debug, Clone)]
pub struct FieldAccessExpr {
    pub target: Option<Box<Expr>>,
    pub owner: String,
    pub name: String,
    pub ty: TypeEnum,
    pub span: Span,
}

/// `target.name(args)`, or a static call on `owner` when `target` is `None`
#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    pub target: Option<Box<Expr>>,
    pub owner: String,
    pub owner_is_interface: bool,
    pub name: String,
    pub parameter_types: Vec<TypeEnum>,
    pub return_type: TypeEnum,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

/// A bare type used as the left-hand side of `::`
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub ty: TypeEnum,
    pub span: Span,
}

/// Left-hand side of a method reference
#[derive(Debug, Clone)]
pub enum TargetRef {
    /// `Type::member`
    Type(TypeExpr),
    /// `expr::member`
    Value(Expr),
}

impl TargetRef {
    pub fn static_type(&self) -> TypeEnum {
        match self {
            TargetRef::Type(t) => t.ty.clone(),
            TargetRef::Value(e) => e.static_type(),
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, TargetRef::Type(_))
    }
}

impl AstNode for TargetRef {
    fn span(&self) -> Span {
        match self {
            TargetRef::Type(t) => t.span,
            TargetRef::Value(e) => e.span(),
        }
    }
}

/// `Type::member`, `expr::member`, `Type::new` or `Type[]::new`
///
/// `functional_interface` and `inferred_parameter_types` are attached by the
/// type checker; either being absent sends the reference down the generic
/// (non-indy) lowering path.
#[derive(Debug, Clone)]
pub struct MethodReferenceExpr {
    pub target: TargetRef,
    pub member: String,
    pub functional_interface: Option<TypeEnum>,
    pub inferred_parameter_types: Option<Vec<Option<TypeEnum>>>,
    pub span: Span,
}

impl MethodReferenceExpr {
    pub fn is_constructor_reference(&self) -> bool {
        self.member == consts::CONSTRUCTOR_REFERENCE
    }
}

impl AstNode for MethodReferenceExpr {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for MethodReferenceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            TargetRef::Type(t) => write!(f, "{}::{}", t.ty, self.member),
            TargetRef::Value(e) => write!(f, "<{}>::{}", e.static_type(), self.member),
        }
    }
}
