//! Namespace registration and qualified-name lookup tests.

mod common;

use common::TestCx;
use tarn_ast as ast;
use tarn_ast::IntTy;
use tarn_typeck::mir;
use tarn_typeck::ty::Ty;

#[test]
fn qualified_call_descends_child_namespaces() {
    let mut cx = TestCx::new();
    let param_ty = cx.ty_i64();
    let x = cx.var("x");
    let one = cx.int(1);
    let double_body = cx.binop("+", x, one);
    let double = cx.function("incr", vec![("x", Some(param_ty))], None, double_body);
    let math = cx.namespace_def("math", vec![double]);

    let callee = cx.path(&["math"], "incr");
    let callee = cx.var_path(callee);
    let two = cx.int(2);
    let body = cx.call(callee, vec![two]);
    let caller = cx.function("three", vec![], None, body);

    let module = cx.check(vec![math, caller]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    assert_eq!(cx.find_fn(&module, "three").return_type, Ty::Int(IntTy::I64));
}

#[test]
fn relative_lookup_walks_parent_namespaces() {
    let mut cx = TestCx::new();
    // `outer::helper` is visible from inside `outer::inner` without any
    // qualifier.
    let helper_body = cx.int(1);
    let helper = cx.function("helper", vec![], None, helper_body);

    let callee = cx.var("helper");
    let inner_body = cx.call(callee, vec![]);
    let inner_fn = cx.function("go", vec![], None, inner_body);
    let inner = cx.namespace_def("inner", vec![inner_fn]);

    let outer = cx.namespace_def("outer", vec![helper, inner]);
    let module = cx.check(vec![outer]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());

    // Both functions resolved, nested in declaration order.
    let mir::Definition::Namespace { definitions, .. } = &module.definitions[0] else {
        panic!("expected the outer namespace");
    };
    assert_eq!(definitions.len(), 2);
}

#[test]
fn missing_qualifier_reports() {
    let mut cx = TestCx::new();
    let callee = cx.path(&["nowhere"], "f");
    let callee = cx.var_path(callee);
    let body = cx.call(callee, vec![]);
    let caller = cx.function("go", vec![], None, body);

    cx.check(vec![caller]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("no such qualifier `nowhere`"));
}

#[test]
fn duplicate_function_reports_citing_the_first() {
    let mut cx = TestCx::new();
    let first_body = cx.int(1);
    let first = cx.function("f", vec![], None, first_body);
    let second_body = cx.int(2);
    let second = cx.function("f", vec![], None, second_body);

    cx.check(vec![first, second]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("duplicate definition of `f`"));
    assert_eq!(errors[0].labels.len(), 2, "cites both definitions");
}

#[test]
fn duplicate_across_categories_is_allowed() {
    let mut cx = TestCx::new();
    // A function and a struct may share a name; they live in different
    // tables (and differ in case conventions anyway).
    let x_ty = cx.ty_i64();
    let structure = cx.struct_def("Thing", vec![("x", x_ty)]);
    let body = cx.int(1);
    let function = cx.function("thing", vec![], None, body);

    cx.check(vec![structure, function]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
}

#[test]
fn namespace_template_is_rejected() {
    let mut cx = TestCx::new();
    let t = cx.template_type_param("T", &[]);
    let span = cx.span();
    let name = cx.name("generic");
    let namespace = ast::Definition {
        kind: ast::DefinitionKind::Namespace(ast::NamespaceDef {
            name,
            template_parameters: Some(vec![t]),
            definitions: Vec::new(),
        }),
        span,
    };

    cx.check(vec![namespace]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("namespace templates are not supported"));
}

#[test]
fn capitalized_function_lookup_reports_case() {
    let mut cx = TestCx::new();
    let callee = cx.var("Frob");
    let body = cx.call(callee, vec![]);
    let caller = cx.function("go", vec![], None, body);

    cx.check(vec![caller]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("capitalized"));
}

#[test]
fn lowercase_typename_reports_case() {
    let mut cx = TestCx::new();
    let bad_ty = cx.ty_named("point");
    let body = cx.unit();
    let definition = cx.function("f", vec![("p", Some(bad_ty))], None, body);

    cx.check(vec![definition]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("lowercase"));
}

#[test]
fn unknown_name_reports() {
    let mut cx = TestCx::new();
    let body = cx.var("ghost");
    let definition = cx.function("f", vec![], None, body);

    cx.check(vec![definition]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("cannot find `ghost`"));
}

#[test]
fn implementation_on_primitive_reports_no_associated_namespace() {
    let mut cx = TestCx::new();
    let target = cx.ty_bool();
    let impl_block = cx.impl_def(target, vec![]);

    cx.check(vec![impl_block]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("does not have an associated namespace"));
}

#[test]
fn instantiation_missing_required_function_reports() {
    let mut cx = TestCx::new();
    // class Eq { fn eq(a: I64, b: I64) -> Bool }
    let span = cx.span();
    let class_name = cx.name("Eq");
    let signature_name = cx.name("eq");
    let a_ty = cx.ty_i64();
    let b_ty = cx.ty_i64();
    let ret_ty = cx.ty_bool();
    let class = ast::Definition {
        kind: ast::DefinitionKind::Typeclass(ast::TypeclassDef {
            name: class_name,
            template_parameters: None,
            function_signatures: vec![ast::FunctionSignature {
                name: signature_name,
                parameter_types: vec![a_ty, b_ty],
                return_type: Some(ret_ty),
                span: signature_name.span,
            }],
            type_signatures: Vec::new(),
        }),
        span,
    };
    let x_ty = cx.ty_i64();
    let point = cx.struct_def("Point", vec![("x", x_ty)]);
    let target = cx.ty_named("Point");
    let inst = cx.inst_def("Eq", target, vec![]);

    cx.check(vec![class, point, inst]);
    let errors = cx.errors();
    assert_eq!(errors.len(), 1, "errors: {errors:?}");
    assert!(errors[0].message.contains("missing function `eq`"));
}

#[test]
fn local_type_alias_resolves_and_warns_when_unused() {
    let mut cx = TestCx::new();
    let aliased = cx.ty_i64();
    let alias_name = cx.name("Local");
    let alias = cx.expr(ast::ExprKind::LocalTypeAlias {
        name: alias_name,
        ty: Box::new(aliased),
    });
    let result = cx.unit();
    let body = cx.block(vec![alias], Some(result));
    let definition = cx.function("f", vec![], None, body);

    cx.check(vec![definition]);
    assert!(!cx.sink.has_errors(), "errors: {:?}", cx.errors());
    let warnings = cx.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("unused local type alias `Local`"));
}
