//! Tests for the compile entry point: type errors surface as `CompileError`
//! and well-typed lambdas lower to the expected LIR.

use arrbound_compiler::compile;
use arrbound_compiler::compiler::ast::{Expr, Lambda, Param, Type};
use arrbound_compiler::compiler::lir::OpCode;
use arrbound_compiler::compiler::typecheck::TypeError;
use arrbound_compiler::CompileError;
use arrbound_core::element::{ElementType, GenericShape};
use arrbound_core::width::{IntValue, LengthWidth};

fn new_array(element: ElementType, width: LengthWidth) -> Lambda {
    Lambda::new(
        "alloc",
        vec![Param::new("len", width)],
        Expr::new_array_bounds(element, Expr::parameter("len")),
    )
}

#[test]
fn every_catalog_element_compiles_for_every_width() {
    for element in ElementType::catalog() {
        for width in LengthWidth::ALL {
            let lir = compile(&new_array(element.clone(), width))
                .unwrap_or_else(|e| panic!("{} / {}: {}", element, width, e));
            assert_eq!(lir.returns, Type::Array(element.clone()));
            assert_eq!(lir.params[0].width, width);
        }
    }
}

#[test]
fn constraint_violation_is_a_compile_error() {
    let element = ElementType::generic(GenericShape::SubtypeOfC, ElementType::Interface);
    let err = compile(&new_array(element, LengthWidth::I32)).unwrap_err();
    assert_eq!(
        err.type_errors(),
        &[TypeError::ConstraintViolation {
            shape: GenericShape::SubtypeOfC,
            argument: ElementType::Interface,
        }]
    );
    assert_eq!(
        err.to_string(),
        "type errors: type argument I does not satisfy constraint T:C"
    );
}

#[test]
fn class_default_constructible_rejects_text() {
    let element = ElementType::generic(GenericShape::ClassDefaultConstructible, ElementType::Text);
    assert!(matches!(
        compile(&new_array(element, LengthWidth::U8)),
        Err(CompileError::Type(_))
    ));
}

#[test]
fn nested_generics_are_rejected() {
    let inner = ElementType::generic(GenericShape::Class, ElementType::Class);
    let element = ElementType::generic(GenericShape::Unconstrained, inner);
    assert!(compile(&new_array(element, LengthWidth::I64)).is_err());
}

#[test]
fn constant_conversion_folds_to_a_single_load() {
    let lambda = Lambda::new(
        "narrowed",
        vec![],
        Expr::convert(Expr::constant(IntValue::I32(300)), LengthWidth::U8),
    );
    let lir = compile(&lambda).unwrap();
    assert_eq!(lir.instructions.len(), 2);
    assert_eq!(lir.instructions[0].op, OpCode::LoadK);
    assert_eq!(lir.constants, vec![IntValue::U8(44)]);
    assert_eq!(lir.returns, Type::Integer(LengthWidth::U8));
}
