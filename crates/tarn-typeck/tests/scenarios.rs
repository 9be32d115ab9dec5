//! End-to-end pipeline scenarios: desugar + resolve + infer on small
//! programs, checking the resolved types and the emitted diagnostics.

mod common;

use common::TestCx;
use tarn_ast::IntTy;
use tarn_typeck::mir;
use tarn_typeck::ty::Ty;

/// `fn id(x) = x` resolves to a function parameterized over one implicit
/// type parameter, taking and returning it.
#[test]
fn identity_function_is_parameterized() {
    let mut cx = TestCx::new();
    let body = cx.var("x");
    let definition = cx.function("id", vec![("x", None)], None, body);
    let module = cx.check(vec![definition]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert!(cx.warnings().is_empty(), "warnings: {:?}", cx.warnings());

    let id = cx.find_fn(&module, "id");
    assert_eq!(id.scheme.params.len(), 1, "one implicit template parameter");
    assert!(id.scheme.params[0].name.is_none(), "the parameter is implicit");

    let Ty::Function { parameters, return_type } = &id.scheme.ty else {
        panic!("expected a function type, got {:?}", id.scheme.ty);
    };
    assert_eq!(parameters.len(), 1);
    assert!(matches!(parameters[0], Ty::Var(_)));
    assert_eq!(parameters[0], **return_type, "takes and returns the same parameter");
}

/// `fn two() = 1 + 1`: the literals' integral variables unify and default
/// to the canonical signed 64-bit integer.
#[test]
fn literal_promotion_defaults_to_i64() {
    let mut cx = TestCx::new();
    let one_a = cx.int(1);
    let one_b = cx.int(1);
    let body = cx.binop("+", one_a, one_b);
    let definition = cx.function("two", vec![], None, body);
    let module = cx.check(vec![definition]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert!(cx.warnings().is_empty());

    let two = cx.find_fn(&module, "two");
    assert_eq!(two.return_type, Ty::Int(IntTy::I64));
    let mir::ExprKind::BinaryOperator { left, right, .. } = &two.body.kind else {
        panic!("expected the operator expression");
    };
    assert_eq!(left.ty, Ty::Int(IntTy::I64));
    assert_eq!(right.ty, Ty::Int(IntTy::I64));
}

/// `fn f() = { let x = 1; () }` warns about the unused binding and still
/// produces a unit-returning function.
#[test]
fn unused_binding_warns() {
    let mut cx = TestCx::new();
    let one = cx.int(1);
    let binding = cx.let_binding("x", None, one);
    let result = cx.unit();
    let body = cx.block(vec![binding], Some(result));
    let definition = cx.function("f", vec![], None, body);
    let module = cx.check(vec![definition]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let warnings = cx.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("unused local variable `x`"));

    let f = cx.find_fn(&module, "f");
    assert_eq!(f.return_type, Ty::unit());
}

/// `while true { () }` type-checks to unit and carries the desugarer's
/// loop note through the pipeline.
#[test]
fn while_true_compiles_with_note() {
    let mut cx = TestCx::new();
    let condition = cx.bool_lit(true);
    let loop_body = cx.unit();
    let body = cx.while_loop(condition, loop_body);
    let definition = cx.function("f", vec![], None, body);
    let module = cx.check(vec![definition]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let notes = cx.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "consider using `loop` instead of `while true`");

    let f = cx.find_fn(&module, "f");
    assert_eq!(f.return_type, Ty::unit());
}

/// `alias A = B; alias B = A` is a cyclic definition.
#[test]
fn cyclic_aliases_report_one_cycle() {
    let mut cx = TestCx::new();
    let b = cx.ty_named("B");
    let alias_a = cx.alias_def("A", b);
    let a = cx.ty_named("A");
    let alias_b = cx.alias_def("B", a);
    cx.check(vec![alias_a, alias_b]);

    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("cyclic definition"));
    assert_eq!(errors[0].labels.len(), 2, "the cycle cites both ends");
}

/// `fn f() = { let x: I64 = 'c'; x }` reports one unification failure and
/// keeps going.
#[test]
fn annotation_mismatch_reports_and_continues() {
    let mut cx = TestCx::new();
    let annotation = cx.ty_i64();
    let initializer = cx.char_lit('c');
    let binding = cx.let_binding("x", Some(annotation), initializer);
    let result = cx.var("x");
    let body = cx.block(vec![binding], Some(result));
    let definition = cx.function("f", vec![], None, body);
    let module = cx.check(vec![definition]);

    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    insta::assert_snapshot!(
        format!("{}", errors[0]),
        @"error: cannot unify I64 with Char"
    );

    // The pipeline degraded and continued: the function still resolved.
    let f = cx.find_fn(&module, "f");
    assert_eq!(f.return_type, Ty::Int(IntTy::I64));
}

/// Definition order survives the whole pipeline (deterministic output).
#[test]
fn definition_order_is_preserved() {
    let mut cx = TestCx::new();
    let point_ty = cx.ty_i64();
    let structure = cx.struct_def("Point", vec![("x", point_ty)]);
    let body = cx.int(1);
    let function = cx.function("origin", vec![], None, body);
    let opt = cx.enum_def("Opt", vec![("none", None)]);
    let aliased = cx.ty_bool();
    let alias = cx.alias_def("Flag", aliased);
    let module = cx.check(vec![structure, function, opt, alias]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let kinds: Vec<&str> = module
        .definitions
        .iter()
        .map(|definition| match definition {
            mir::Definition::Struct(_) => "struct",
            mir::Definition::Function(_) => "function",
            mir::Definition::Enum(_) => "enum",
            mir::Definition::Alias(_) => "alias",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["struct", "function", "enum", "alias"]);
}

/// A conditional with unifiable but non-identical branch types adopts the
/// unified type.
#[test]
fn conditional_branches_unify() {
    let mut cx = TestCx::new();
    let condition = cx.var("c");
    let one = cx.int(1);
    let ascription = cx.ty_u8();
    let then_branch = cx.ascribe(one, ascription);
    let else_branch = cx.int(2);
    let body = cx.if_else(condition, then_branch, Some(else_branch));
    let bool_ty = cx.ty_bool();
    let definition = cx.function("pick", vec![("c", Some(bool_ty))], None, body);
    let module = cx.check(vec![definition]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let pick = cx.find_fn(&module, "pick");
    // The `2` literal's integral variable met the ascribed `U8` branch.
    assert_eq!(pick.return_type, Ty::Int(IntTy::U8));
}

/// An empty block compiles to the unit value of unit type.
#[test]
fn empty_block_is_unit() {
    let mut cx = TestCx::new();
    let body = cx.block(vec![], None);
    let definition = cx.function("nothing", vec![], None, body);
    let module = cx.check(vec![definition]);

    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let nothing = cx.find_fn(&module, "nothing");
    assert_eq!(nothing.return_type, Ty::unit());
    assert!(nothing.body.ty.is_unit());
}
