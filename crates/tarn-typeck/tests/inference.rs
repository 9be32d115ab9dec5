//! Inference-focused pipeline tests: instantiation, nominal types,
//! patterns, member lookup, casts, and typeclass instances.

mod common;

use common::TestCx;
use tarn_ast::IntTy;
use tarn_typeck::ty::Ty;

#[test]
fn generic_function_instantiates_at_call_sites() {
    let mut cx = TestCx::new();
    let id_body = cx.var("x");
    let id = cx.function("id", vec![("x", None)], None, id_body);

    let id_ref = cx.var("id");
    let argument = cx.bool_lit(true);
    let use_body = cx.call(id_ref, vec![argument]);
    let use_fn = cx.function("use_id", vec![], None, use_body);

    let module = cx.check(vec![id, use_fn]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());

    let use_id = cx.find_fn(&module, "use_id");
    assert_eq!(use_id.return_type, Ty::Bool);
}

#[test]
fn instantiations_are_independent() {
    let mut cx = TestCx::new();
    let id_body = cx.var("x");
    let id = cx.function("id", vec![("x", None)], None, id_body);

    // id(true) and id(1) in one body: distinct fresh variables.
    let first_ref = cx.var("id");
    let first_arg = cx.bool_lit(true);
    let first = cx.call(first_ref, vec![first_arg]);
    let first_let = cx.let_binding("_a", None, first);
    let second_ref = cx.var("id");
    let second_arg = cx.int(1);
    let second = cx.call(second_ref, vec![second_arg]);
    let body = cx.block(vec![first_let], Some(second));
    let use_fn = cx.function("use_both", vec![], None, body);

    let module = cx.check(vec![id, use_fn]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let use_both = cx.find_fn(&module, "use_both");
    assert_eq!(use_both.return_type, Ty::Int(IntTy::I64));
}

#[test]
fn annotated_parameter_constrains_the_body() {
    let mut cx = TestCx::new();
    let param_ty = cx.ty_i64();
    let one = cx.int(1);
    let x = cx.var("x");
    let body = cx.binop("+", x, one);
    let add1 = cx.function("add1", vec![("x", Some(param_ty))], None, body);

    let module = cx.check(vec![add1]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let add1 = cx.find_fn(&module, "add1");
    assert_eq!(add1.return_type, Ty::Int(IntTy::I64));
    assert!(add1.scheme.params.is_empty(), "fully annotated: nothing to quantify");
}

#[test]
fn comparison_operators_yield_bool() {
    let mut cx = TestCx::new();
    let left = cx.int(1);
    let right = cx.int(2);
    let body = cx.binop("<", left, right);
    let definition = cx.function("lt", vec![], None, body);

    let module = cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "lt").return_type, Ty::Bool);
}

#[test]
fn ascription_pins_a_literal_variable() {
    let mut cx = TestCx::new();
    let one = cx.int(1);
    let u8_ty = cx.ty_u8();
    let ascribed = cx.ascribe(one, u8_ty);
    let binding = cx.let_binding("x", None, ascribed);
    let result = cx.var("x");
    let body = cx.block(vec![binding], Some(result));
    let definition = cx.function("f", vec![], None, body);

    let module = cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "f").return_type, Ty::Int(IntTy::U8));
}

#[test]
fn conversion_cast_between_numerics_is_allowed() {
    let mut cx = TestCx::new();
    let i64_ty = cx.ty_i64();
    let x = cx.var("x");
    let u8_ty = cx.ty_u8();
    let body = cx.convert(x, u8_ty);
    let definition = cx.function("narrow", vec![("x", Some(i64_ty))], None, body);

    let module = cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "narrow").return_type, Ty::Int(IntTy::U8));
}

#[test]
fn conversion_between_unrelated_types_reports() {
    let mut cx = TestCx::new();
    let param_ty = cx.ty_tuple(vec![]);
    let x = cx.var("x");
    let bool_ty = cx.ty_bool();
    let body = cx.convert(x, bool_ty);
    let definition = cx.function("bad", vec![("x", Some(param_ty))], None, body);

    cx.check(vec![definition]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("no known conversion"));
}

#[test]
fn tuple_pattern_destructures() {
    let mut cx = TestCx::new();
    let one = cx.int(1);
    let c = cx.char_lit('c');
    let initializer = cx.tuple(vec![one, c]);
    let a = cx.pat_name("a");
    let b = cx.pat_name("_b");
    let pattern = cx.pat_tuple(vec![a, b]);
    let binding = cx.let_pattern(pattern, initializer);
    let result = cx.var("a");
    let body = cx.block(vec![binding], Some(result));
    let definition = cx.function("f", vec![], None, body);

    let module = cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert!(cx.warnings().is_empty(), "warnings: {:?}", cx.warnings());
    assert_eq!(cx.find_fn(&module, "f").return_type, Ty::Int(IntTy::I64));
}

#[test]
fn tuple_field_access_types_the_element() {
    let mut cx = TestCx::new();
    let i64_ty = cx.ty_i64();
    let char_ty = cx.ty_char();
    let pair_ty = cx.ty_tuple(vec![i64_ty, char_ty]);
    let p = cx.var("p");
    let body = cx.tuple_field(p, 1);
    let definition = cx.function("second", vec![("p", Some(pair_ty))], None, body);

    let module = cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "second").return_type, Ty::Char);
}

#[test]
fn struct_field_access_resolves_eagerly() {
    let mut cx = TestCx::new();
    let x_ty = cx.ty_i64();
    let y_ty = cx.ty_char();
    let point = cx.struct_def("Point", vec![("x", x_ty), ("y", y_ty)]);

    let point_ty = cx.ty_named("Point");
    let p = cx.var("p");
    let body = cx.field(p, "y");
    let definition = cx.function("get_y", vec![("p", Some(point_ty))], None, body);

    let module = cx.check(vec![point, definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "get_y").return_type, Ty::Char);
}

#[test]
fn struct_initializer_checks_fields() {
    let mut cx = TestCx::new();
    let x_ty = cx.ty_i64();
    let point = cx.struct_def("Point", vec![("x", x_ty)]);

    let init_ty = cx.ty_named("Point");
    let one = cx.int(1);
    let body = cx.struct_init(init_ty, vec![("x", one)]);
    let definition = cx.function("mk", vec![], None, body);

    let module = cx.check(vec![point, definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let mk = cx.find_fn(&module, "mk");
    assert!(matches!(mk.return_type, Ty::Structure(..)));
}

#[test]
fn struct_initializer_missing_field_reports() {
    let mut cx = TestCx::new();
    let x_ty = cx.ty_i64();
    let point = cx.struct_def("Point", vec![("x", x_ty)]);

    let init_ty = cx.ty_named("Point");
    let body = cx.struct_init(init_ty, vec![]);
    let definition = cx.function("mk", vec![], None, body);

    cx.check(vec![point, definition]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("missing field `x`"));
}

#[test]
fn enum_match_with_constructor_patterns() {
    let mut cx = TestCx::new();
    let payload_ty = cx.ty_i64();
    let opt = cx.enum_def("Opt", vec![("some", Some(payload_ty)), ("none", None)]);

    let opt_ty = cx.ty_named("Opt");
    let scrutinee = cx.var("o");
    let v = cx.pat_name("v");
    let some_pat = cx.pat_ctor("Opt", "some", Some(v));
    let some_arm = cx.var("v");
    let none_pat = cx.pat_ctor("Opt", "none", None);
    let none_arm = cx.int(0);
    let body = cx.match_expr(scrutinee, vec![(some_pat, some_arm), (none_pat, none_arm)]);
    let definition = cx.function("unwrap_or_zero", vec![("o", Some(opt_ty))], None, body);

    let module = cx.check(vec![opt, definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "unwrap_or_zero").return_type, Ty::Int(IntTy::I64));
}

#[test]
fn unknown_constructor_reports() {
    let mut cx = TestCx::new();
    let opt = cx.enum_def("Opt", vec![("none", None)]);

    let opt_ty = cx.ty_named("Opt");
    let scrutinee = cx.var("o");
    let bogus = cx.pat_ctor("Opt", "boom", None);
    let arm = cx.int(0);
    let wild = cx.pat_wildcard();
    let fallback = cx.int(1);
    let body = cx.match_expr(scrutinee, vec![(bogus, arm), (wild, fallback)]);
    let definition = cx.function("f", vec![("o", Some(opt_ty))], None, body);

    cx.check(vec![opt, definition]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("no constructor `boom`"));
}

#[test]
fn member_function_dispatches_through_the_associated_namespace() {
    let mut cx = TestCx::new();
    let n_ty = cx.ty_i64();
    let counter = cx.struct_def("Counter", vec![("n", n_ty)]);

    let self_ty = cx.ty_named("Counter");
    let c = cx.var("c");
    let get_body = cx.field(c, "n");
    let get = cx.function("get", vec![("c", Some(self_ty))], None, get_body);
    let impl_target = cx.ty_named("Counter");
    let impl_block = cx.impl_def(impl_target, vec![get]);

    let param_ty = cx.ty_named("Counter");
    let receiver = cx.var("c");
    let body = cx.member_call(receiver, "get", vec![]);
    let caller = cx.function("read", vec![("c", Some(param_ty))], None, body);

    let module = cx.check(vec![counter, impl_block, caller]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "read").return_type, Ty::Int(IntTy::I64));
}

#[test]
fn class_bound_is_satisfied_by_an_instance() {
    let mut cx = TestCx::new();
    let show = cx.class_def("Show");
    let x_ty = cx.ty_i64();
    let point = cx.struct_def("Point", vec![("x", x_ty)]);
    let inst_target = cx.ty_named("Point");
    let inst = cx.inst_def("Show", inst_target, vec![]);

    let t_param = cx.template_type_param("T", &["Show"]);
    let t_ty = cx.ty_named("T");
    let shown_body = cx.var("x");
    let shown = cx.function_with_templates(
        "shown",
        Some(vec![t_param]),
        vec![("x", Some(t_ty))],
        None,
        shown_body,
    );

    let p_ty = cx.ty_named("Point");
    let shown_ref = cx.var("shown");
    let argument = cx.var("p");
    let body = cx.call(shown_ref, vec![argument]);
    let caller = cx.function("use_shown", vec![("p", Some(p_ty))], None, body);

    let module = cx.check(vec![show, point, inst, shown, caller]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let use_shown = cx.find_fn(&module, "use_shown");
    assert!(matches!(use_shown.return_type, Ty::Structure(..)));
}

#[test]
fn missing_instance_reports() {
    let mut cx = TestCx::new();
    let show = cx.class_def("Show");

    let t_param = cx.template_type_param("T", &["Show"]);
    let t_ty = cx.ty_named("T");
    let shown_body = cx.var("x");
    let shown = cx.function_with_templates(
        "shown",
        Some(vec![t_param]),
        vec![("x", Some(t_ty))],
        None,
        shown_body,
    );

    let shown_ref = cx.var("shown");
    let argument = cx.int(1);
    let body = cx.call(shown_ref, vec![argument]);
    let caller = cx.function("bad", vec![], None, body);

    cx.check(vec![show, shown, caller]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("no instance of `Show`"));
}

/// Surface types built purely from concrete heads survive the pipeline
/// structurally unchanged.
#[test]
fn concrete_types_round_trip() {
    let mut cx = TestCx::new();
    let i64_ty = cx.ty_i64();
    let bool_ty = cx.ty_bool();
    let inner = cx.ty_tuple(vec![i64_ty, bool_ty]);
    let char_ty = cx.ty_char();
    let param_ty = cx.ty_tuple(vec![inner, char_ty]);
    let body = cx.unit();
    let definition = cx.function("f", vec![("x", Some(param_ty))], None, body);

    let module = cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    // x is unused, which is fine for this test.
    let f = cx.find_fn(&module, "f");
    assert_eq!(
        f.parameters[0].ty,
        Ty::Tuple(vec![
            Ty::Tuple(vec![Ty::Int(IntTy::I64), Ty::Bool]),
            Ty::Char,
        ])
    );
}

#[test]
fn take_reference_of_immutable_as_mutable_reports() {
    let mut cx = TestCx::new();
    let one = cx.int(1);
    let binding = cx.let_binding("x", None, one);
    let span = cx.span();
    let name = cx.name("x");
    let reference = cx.expr(tarn_ast::ExprKind::TakeReference {
        mutability: tarn_ast::Mutability { kind: tarn_ast::MutabilityKind::Mut, span },
        name,
    });
    let body = cx.block(vec![binding], Some(reference));
    let definition = cx.function("f", vec![], None, body);

    cx.check(vec![definition]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("mutable reference to immutable"));
}
