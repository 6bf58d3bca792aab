use islisp_core::conditions::Condition;
use islisp_core::context::Context;
use islisp_core::ilos::BuiltInClass;
use islisp_core::primitives::register_primitives;
use islisp_core::properties::{gensym, property, remove_property, set_property};
use islisp_core::types::Value;

fn new_context() -> Context {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut ctx = Context::new();
    register_primitives(&mut ctx);
    ctx
}

#[test]
fn missing_property_yields_default_or_nil() {
    let mut ctx = new_context();
    let sym = ctx.symbol("ZEUS");
    let name = ctx.symbol("CHILDREN");

    assert_eq!(property(&mut ctx, &sym, &name, &[]), Ok(Value::Nil));
    assert_eq!(
        property(&mut ctx, &sym, &name, &[Value::Integer(0)]),
        Ok(Value::Integer(0))
    );
    assert_eq!(
        property(&mut ctx, &sym, &name, &[Value::Nil, Value::Nil]),
        Err(Condition::ArityError)
    );
}

#[test]
fn set_then_get_then_remove() {
    let mut ctx = new_context();
    let sym = ctx.symbol("ZEUS");
    let name = ctx.symbol("WIFE");
    let hera = ctx.symbol("HERA");

    assert_eq!(set_property(&mut ctx, &hera, &sym, &name), Ok(hera.clone()));
    assert_eq!(property(&mut ctx, &sym, &name, &[]), Ok(hera.clone()));
    // The default is ignored once a value is stored.
    assert_eq!(property(&mut ctx, &sym, &name, &[Value::Integer(1)]), Ok(hera.clone()));

    assert_eq!(remove_property(&mut ctx, &sym, &name), Ok(hera));
    assert_eq!(property(&mut ctx, &sym, &name, &[]), Ok(Value::Nil));
    assert_eq!(remove_property(&mut ctx, &sym, &name), Ok(Value::Nil));
    assert!(ctx.properties.is_empty());
}

#[test]
fn properties_are_keyed_by_symbol_identity() {
    let mut ctx = new_context();
    let upper = ctx.symbol("ZEUS");
    let lower = ctx.symbol("zeus");
    let name = ctx.symbol("P");
    set_property(&mut ctx, &Value::Integer(1), &upper, &name).unwrap();
    assert_eq!(property(&mut ctx, &lower, &name, &[]), Ok(Value::Integer(1)));

    let other = ctx.symbol("Q");
    assert_eq!(property(&mut ctx, &upper, &other, &[]), Ok(Value::Nil));
}

#[test]
fn non_symbol_keys_are_domain_errors() {
    let mut ctx = new_context();
    let name = ctx.symbol("P");
    let text = ctx.make_string("ZEUS").unwrap();

    assert_eq!(
        property(&mut ctx, &text, &name, &[]),
        Err(Condition::domain_error(&text, BuiltInClass::Symbol))
    );
    assert_eq!(
        set_property(&mut ctx, &Value::Nil, &name, &Value::Integer(3)),
        Err(Condition::domain_error(&Value::Integer(3), BuiltInClass::Symbol))
    );
    // Class checks win over the arity check.
    assert_eq!(
        property(&mut ctx, &name, &Value::Integer(3), &[Value::Nil, Value::Nil]),
        Err(Condition::domain_error(&Value::Integer(3), BuiltInClass::Symbol))
    );
    assert!(ctx.properties.is_empty());
}

#[test]
fn gensyms_are_distinct_and_uninterned() {
    let mut ctx = new_context();
    let a = gensym(&mut ctx).unwrap();
    let b = gensym(&mut ctx).unwrap();
    assert_ne!(a, b);

    let id = ctx.symbol_id(&a).unwrap();
    let name = ctx.symbols.symbol_name(id).unwrap().to_string();
    assert!(name.starts_with("#:"));
    // Reading the same spelling interns a different symbol.
    assert_ne!(ctx.symbol(&name), a);
    assert_eq!(ctx.symbols.find(&name).map(Value::Symbol), Some(ctx.symbol(&name)));
}

#[test]
fn gensym_can_carry_properties() {
    let mut ctx = new_context();
    let g = gensym(&mut ctx).unwrap();
    let name = ctx.symbol("SEEN");
    let t = ctx.t();
    set_property(&mut ctx, &t, &g, &name).unwrap();
    assert_eq!(property(&mut ctx, &g, &name, &[]), Ok(t));
}

#[test]
fn primitives_reach_the_property_store() {
    let mut ctx = new_context();
    let set = ctx.primitive("SET-PROPERTY").unwrap();
    let get = ctx.primitive("PROPERTY").unwrap();
    let sym = ctx.symbol("ZEUS");
    let name = ctx.symbol("AGE");

    set(&mut ctx, &[Value::Integer(3000), sym.clone(), name.clone()]).unwrap();
    assert_eq!(get(&mut ctx, &[sym, name]), Ok(Value::Integer(3000)));
}
