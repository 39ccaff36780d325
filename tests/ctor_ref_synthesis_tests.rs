//! Constructor reference factories
//!
//! `Type::new` and `Type[]::new` lower to a private static synthetic factory
//! on the enclosing type; the call site's implementation handle names it.

mod common;

use common::*;
use indylink::ast::{PrimitiveType, TargetRef, TypeEnum};
use indylink::codegen::method_ref::HandleKind;
use indylink::codegen::opcodes::{self, access_flags::*};
use indylink::common::class_manager::{ClassInfo, MethodInfo};
use indylink::verify::verify_call_sites;
use indylink::{Error, Result};

const MAKER: &str = "p/Maker";

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

/// `p/T(int, String)` plus a `make(int, String)` interface to target it
fn with_point_type(fixture: &mut Fixture) {
    fixture
        .register(
            ClassInfo::new_class("p/T")
                .with_method(MethodInfo::constructor(vec![param("x", TypeEnum::int()), param("label", TypeEnum::string())]))
                .with_method(MethodInfo::constructor(vec![param("x", TypeEnum::Primitive(PrimitiveType::Long))])),
        )
        .register(ClassInfo::new_interface(MAKER).with_method(abstract_method(
            "make",
            vec![param("x", TypeEnum::int()), param("label", TypeEnum::string())],
            TypeEnum::object(),
        )));
}

#[test]
fn test_constructor_factory_body_and_registration() -> Result<()> {
    let mut fixture = Fixture::new();
    with_point_type(&mut fixture);

    let reference = type_ref(TypeEnum::class("p/T"), "new", MAKER, vec![Some(TypeEnum::int()), Some(TypeEnum::string())]);
    let lowered = fixture.lower_dynamic(&reference)?;
    let factory = lowered.synthesized.clone().expect("factory");

    assert_eq!(factory.name, "ctorRef$run$0");
    assert_eq!(factory.descriptor(), "(ILjava/lang/String;)Lp/T;");
    assert_eq!(factory.access_flags, ACC_PRIVATE | ACC_STATIC | ACC_FINAL | ACC_SYNTHETIC);
    assert_eq!(factory.declaring_class, ENCLOSING);

    // registered on both the class model and the emitted class file
    assert!(fixture.classes.get(ENCLOSING).unwrap().methods.iter().any(|m| m.name == "ctorRef$run$0"));
    let method = fixture.class_file.find_method("ctorRef$run$0", "(ILjava/lang/String;)Lp/T;").expect("emitted");
    assert_eq!(method.access_flags, factory.access_flags);

    let code = fixture.class_file.method_code(method).expect("code");
    let bytes = &code.code;
    assert_eq!(bytes.len(), 10);
    assert_eq!(bytes[0], opcodes::NEW);
    assert_eq!(fixture.class_file.constant_pool.class_name(u16_at(bytes, 1)), Some("p/T"));
    assert_eq!(&bytes[3..6], &[opcodes::DUP, opcodes::ILOAD_0, opcodes::ALOAD_0 + 1]);
    assert_eq!(bytes[6], opcodes::INVOKESPECIAL);
    assert_eq!(
        fixture.class_file.constant_pool.member_ref(u16_at(bytes, 7)),
        Some(("p/T", "<init>", "(ILjava/lang/String;)V"))
    );
    assert_eq!(bytes[9], opcodes::ARETURN);
    assert_eq!(code.max_stack, 4);
    assert_eq!(code.max_locals, 2);

    assert_eq!(lowered.resolved.handle_kind(), HandleKind::InvokeStatic);
    assert_eq!(lowered.call_site.implementation_owner, ENCLOSING);
    assert_eq!(lowered.call_site.implementation_name, "ctorRef$run$0");
    assert_eq!(lowered.call_site.instantiated_descriptor, "(ILjava/lang/String;)Lp/T;");
    Ok(())
}

#[test]
fn test_primitive_argument_widens_to_constructor_parameter() -> Result<()> {
    let mut fixture = Fixture::new();
    with_point_type(&mut fixture);
    fixture.register(ClassInfo::new_interface("p/FromInt").with_method(abstract_method(
        "of",
        vec![param("x", TypeEnum::int())],
        TypeEnum::object(),
    )));

    let reference = type_ref(TypeEnum::class("p/T"), "new", "p/FromInt", vec![Some(TypeEnum::int())]);
    let lowered = fixture.lower_dynamic(&reference)?;
    let factory = lowered.synthesized.expect("factory");

    let method = fixture.class_file.find_method(&factory.name, "(I)Lp/T;").expect("emitted");
    let code = fixture.class_file.method_code(method).expect("code");
    assert_eq!(&code.code[3..6], &[opcodes::DUP, opcodes::ILOAD_0, opcodes::I2L]);
    assert_eq!(
        fixture.class_file.constant_pool.member_ref(u16_at(&code.code, 7)),
        Some(("p/T", "<init>", "(J)V"))
    );
    Ok(())
}

#[test]
fn test_single_dimension_primitive_array() -> Result<()> {
    let mut fixture = Fixture::new();
    let int_array = TypeEnum::array_of(TypeEnum::int());
    let reference = type_ref(int_array, "new", INT_FUNCTION, vec![Some(TypeEnum::int())]);
    let lowered = fixture.lower_dynamic(&reference)?;
    let factory = lowered.synthesized.expect("factory");

    assert_eq!(factory.descriptor(), "(I)[I");
    let method = fixture.class_file.find_method(&factory.name, "(I)[I").expect("emitted");
    let code = fixture.class_file.method_code(method).expect("code");
    assert_eq!(code.code, vec![opcodes::ILOAD_0, opcodes::NEWARRAY, 10, opcodes::ARETURN]);
    assert_eq!(code.max_stack, 1);
    Ok(())
}

#[test]
fn test_single_dimension_reference_array() -> Result<()> {
    let mut fixture = Fixture::new();
    let strings = TypeEnum::array_of(TypeEnum::string());
    let reference = type_ref(strings, "new", INT_FUNCTION, vec![Some(TypeEnum::int())]);
    let factory = fixture.lower_dynamic(&reference)?.synthesized.expect("factory");

    let method = fixture.class_file.find_method(&factory.name, "(I)[Ljava/lang/String;").expect("emitted");
    let code = fixture.class_file.method_code(method).expect("code");
    assert_eq!(code.code[1], opcodes::ANEWARRAY);
    assert_eq!(fixture.class_file.constant_pool.class_name(u16_at(&code.code, 2)), Some("java/lang/String"));
    Ok(())
}

#[test]
fn test_multi_dimension_array_unboxes_sizes() -> Result<()> {
    let mut fixture = Fixture::new();
    let matrix = TypeEnum::array_of(TypeEnum::array_of(TypeEnum::string()));
    let reference = type_ref(matrix, "new", BI_FUNCTION, vec![Some(integer()), Some(integer())]);
    let factory = fixture.lower_dynamic(&reference)?.synthesized.expect("factory");

    let descriptor = "(Ljava/lang/Integer;Ljava/lang/Integer;)[[Ljava/lang/String;";
    assert_eq!(factory.descriptor(), descriptor);
    let method = fixture.class_file.find_method(&factory.name, descriptor).expect("emitted");
    let code = fixture.class_file.method_code(method).expect("code");
    let bytes = &code.code;

    assert_eq!(bytes[0], opcodes::ALOAD_0);
    assert_eq!(bytes[1], opcodes::INVOKEVIRTUAL);
    assert_eq!(
        fixture.class_file.constant_pool.member_ref(u16_at(bytes, 2)),
        Some(("java/lang/Integer", "intValue", "()I"))
    );
    assert_eq!(bytes[4], opcodes::ALOAD_0 + 1);
    assert_eq!(bytes[5], opcodes::INVOKEVIRTUAL);
    assert_eq!(bytes[8], opcodes::MULTIANEWARRAY);
    assert_eq!(fixture.class_file.constant_pool.class_name(u16_at(bytes, 9)), Some("[[Ljava/lang/String;"));
    assert_eq!(bytes[11], 2);
    assert_eq!(bytes[12], opcodes::ARETURN);
    Ok(())
}

#[test]
fn test_array_size_errors() {
    let mut fixture = Fixture::new();
    let strings = TypeEnum::array_of(TypeEnum::string());

    let too_many = type_ref(strings.clone(), "new", BI_FUNCTION, vec![Some(TypeEnum::int()), Some(TypeEnum::int())]);
    assert!(matches!(fixture.lower(&too_many), Err(Error::InvalidReferenceShape { .. })));

    let not_integral = type_ref(strings.clone(), "new", FUNCTION, vec![Some(TypeEnum::string())]);
    assert!(matches!(fixture.lower(&not_integral), Err(Error::InvalidReferenceShape { .. })));

    let no_size = type_ref(strings, "new", SUPPLIER, vec![]);
    assert!(matches!(fixture.lower(&no_size), Err(Error::InvalidReferenceShape { .. })));

    assert!(fixture.class_file.methods.is_empty());
}

#[test]
fn test_constructor_reference_needs_a_type_target() {
    let mut fixture = Fixture::new();
    let reference = value_ref(local("s", 1, TypeEnum::string()), "new", SUPPLIER, vec![]);
    assert!(matches!(fixture.lower(&reference), Err(Error::InvalidReferenceShape { .. })));
}

#[test]
fn test_abstract_types_cannot_be_instantiated() {
    let mut fixture = Fixture::new();
    let reference = type_ref(number(), "new", SUPPLIER, vec![]);
    assert!(matches!(fixture.lower(&reference), Err(Error::InvalidReferenceShape { .. })));
    assert!(fixture.class_file.methods.is_empty());
}

#[test]
fn test_missing_constructor_is_unresolved() {
    let mut fixture = Fixture::new();
    with_point_type(&mut fixture);
    let reference = type_ref(TypeEnum::class("p/T"), "new", SUPPLIER, vec![]);
    let message = fixture.lower(&reference).unwrap_err().to_string();
    assert_eq!(message, "3:9: failed to find the expected method [new()] in the type [p.T]");
}

#[test]
fn test_factory_names_count_up_within_enclosing_type() -> Result<()> {
    let mut fixture = Fixture::new();
    let reference = type_ref(TypeEnum::object(), "new", SUPPLIER, vec![]);

    let first = fixture.lower_dynamic(&reference)?.synthesized.expect("factory");
    let second = fixture.lower_dynamic(&reference)?.synthesized.expect("factory");
    fixture.method = None;
    let third = fixture.lower_dynamic(&reference)?.synthesized.expect("factory");

    assert_eq!(first.name, "ctorRef$run$0");
    assert_eq!(second.name, "ctorRef$run$1");
    assert_eq!(third.name, "ctorRef$2");
    assert_eq!(fixture.class_file.methods.len(), 3);
    Ok(())
}

#[test]
fn test_interface_enclosing_type_drops_final() -> Result<()> {
    let mut fixture = Fixture::interface();
    let reference = type_ref(TypeEnum::object(), "new", SUPPLIER, vec![]);
    let lowered = fixture.lower_dynamic(&reference)?;
    let factory = lowered.synthesized.expect("factory");

    assert_eq!(factory.access_flags, ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC);
    assert!(lowered.resolved.owner_is_interface);
    let handle = fixture.class_file.bootstrap_methods[0].arguments[1];
    let (kind, owner, _, _, is_interface) = fixture.method_handle(handle).unwrap();
    assert_eq!((kind, owner, is_interface), (6, ENCLOSING, true));
    assert!(verify_call_sites(&fixture.class_file).is_ok());
    Ok(())
}

#[test]
fn test_target_expression_is_a_type() {
    let reference = type_ref(TypeEnum::object(), "new", SUPPLIER, vec![]);
    assert!(reference.is_constructor_reference());
    assert!(matches!(reference.target, TargetRef::Type(_)));
}

#[test]
fn test_aliased_constructor_target_emits_the_real_type() -> Result<()> {
    let mut fixture = Fixture::new();
    fixture
        .register(ClassInfo::new_class("p/Point").with_method(MethodInfo::constructor(vec![param("x", integer())])))
        .register(ClassInfo::alias("p/PointAlias", "p/Point"));

    let reference = type_ref(TypeEnum::class("p/PointAlias"), "new", FUNCTION, vec![Some(integer())]);
    let lowered = fixture.lower_dynamic(&reference)?;
    let factory = lowered.synthesized.clone().expect("factory");

    let descriptor = "(Ljava/lang/Integer;)Lp/Point;";
    assert_eq!(factory.descriptor(), descriptor);
    assert_eq!(lowered.call_site.instantiated_descriptor, descriptor);
    let method = fixture.class_file.find_method(&factory.name, descriptor).expect("emitted");
    let code = fixture.class_file.method_code(method).expect("code");
    assert_eq!(fixture.class_file.constant_pool.class_name(u16_at(&code.code, 1)), Some("p/Point"));

    let matrix = TypeEnum::array_of(TypeEnum::array_of(TypeEnum::class("p/PointAlias")));
    let arrays = type_ref(matrix, "new", INT_FUNCTION, vec![Some(TypeEnum::int())]);
    let factory = fixture.lower_dynamic(&arrays)?.synthesized.expect("factory");
    assert_eq!(factory.descriptor(), "(I)[[Lp/Point;");
    Ok(())
}

#[test]
fn test_dimension_count_is_limited_to_a_byte() {
    let sizes = 256;
    let mut fixture = Fixture::new();
    let parameters = (0..sizes).map(|i| param(&format!("d{}", i), TypeEnum::int())).collect();
    fixture.register(ClassInfo::new_interface("p/Dims").with_method(abstract_method("make", parameters, TypeEnum::object())));

    let target = (0..sizes).fold(TypeEnum::int(), |ty, _| TypeEnum::array_of(ty));
    let reference = type_ref(target, "new", "p/Dims", vec![Some(TypeEnum::int()); sizes]);
    match fixture.lower(&reference) {
        Err(Error::InvalidReferenceShape { message, .. }) => assert!(message.contains("256 dimension sizes")),
        other => panic!("expected invalid shape, got {:?}", other),
    }
    assert!(fixture.class_file.methods.is_empty());
}
