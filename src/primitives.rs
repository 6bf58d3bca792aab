// ISLISP Primitives - the flat table of named operations
//
// Each primitive takes the context and its evaluated arguments. Required
// argument counts are checked here; optional arguments are validated by the
// operation itself, after its class checks.

use crate::arrays;
use crate::binary;
use crate::conditions::{Condition, EvalResult};
use crate::context::Context;
use crate::ilos::{self, BuiltInClass, Class};
use crate::properties;
use crate::types::Value;

/// Register all primitives of the runtime core
pub fn register_primitives(ctx: &mut Context) {
    // Classes
    ctx.register_primitive("CLASS-OF", prim_class_of);
    ctx.register_primitive("INSTANCEP", prim_instancep);
    ctx.register_primitive("SUBCLASSP", prim_subclassp);

    // Arrays
    ctx.register_primitive("BASIC-ARRAY-P", prim_basic_array_p);
    ctx.register_primitive("BASIC-ARRAY*-P", prim_basic_array_star_p);
    ctx.register_primitive("GENERAL-ARRAY*-P", prim_general_array_star_p);
    ctx.register_primitive("CREATE-ARRAY", prim_create_array);
    ctx.register_primitive("AREF", prim_aref);
    ctx.register_primitive("GAREF", prim_garef);
    ctx.register_primitive("SET-AREF", prim_set_aref);
    ctx.register_primitive("SET-GAREF", prim_set_garef);
    ctx.register_primitive("ARRAY-DIMENSIONS", prim_array_dimensions);

    // Streams
    ctx.register_primitive("STREAMP", prim_streamp);
    ctx.register_primitive("INPUT-STREAM-P", prim_input_stream_p);
    ctx.register_primitive("OUTPUT-STREAM-P", prim_output_stream_p);
    ctx.register_primitive("READ-BYTE", binary::read_byte);
    ctx.register_primitive("WRITE-BYTE", prim_write_byte);
    ctx.register_primitive("FRESH-LINE", binary::fresh_line);
    ctx.register_primitive("FINISH-OUTPUT", binary::finish_output);
    ctx.register_primitive("CLOSE", prim_close);
    ctx.register_primitive("CREATE-STRING-INPUT-STREAM", prim_create_string_input_stream);
    ctx.register_primitive("CREATE-STRING-OUTPUT-STREAM", prim_create_string_output_stream);
    ctx.register_primitive("GET-OUTPUT-STREAM-STRING", prim_get_output_stream_string);

    // Symbols
    ctx.register_primitive("SYMBOLP", prim_symbolp);
    ctx.register_primitive("PROPERTY", prim_property);
    ctx.register_primitive("SET-PROPERTY", prim_set_property);
    ctx.register_primitive("REMOVE-PROPERTY", prim_remove_property);
    ctx.register_primitive("GENSYM", prim_gensym);
}

/// At least `min` arguments.
fn required(args: &[Value], min: usize) -> Result<(), Condition> {
    if args.len() < min {
        Err(Condition::ArityError)
    } else {
        Ok(())
    }
}

fn exactly(args: &[Value], n: usize) -> Result<(), Condition> {
    if args.len() != n {
        Err(Condition::ArityError)
    } else {
        Ok(())
    }
}

fn class_arg(value: &Value) -> Result<Class, Condition> {
    match value {
        Value::Class(class) => Ok(*class),
        _ => Err(Condition::domain_error(value, BuiltInClass::Class)),
    }
}

fn prim_class_of(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(Value::Class(ilos::class_of(ctx, &args[0])))
}

fn prim_instancep(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 2)?;
    let class = class_arg(&args[1])?;
    Ok(ctx.boolean(ilos::instance_of(ctx, class, &args[0])))
}

fn prim_subclassp(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 2)?;
    let sub = class_arg(&args[0])?;
    let sup = class_arg(&args[1])?;
    Ok(ctx.boolean(ilos::subclassp(ctx, sub, sup)))
}

fn prim_basic_array_p(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(arrays::basic_array_p(ctx, &args[0]))
}

fn prim_basic_array_star_p(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(arrays::basic_array_star_p(ctx, &args[0]))
}

fn prim_general_array_star_p(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(arrays::general_array_star_p(ctx, &args[0]))
}

fn prim_create_array(ctx: &mut Context, args: &[Value]) -> EvalResult {
    required(args, 1)?;
    arrays::create_array(ctx, &args[0], &args[1..])
}

fn prim_aref(ctx: &mut Context, args: &[Value]) -> EvalResult {
    required(args, 1)?;
    arrays::aref(ctx, &args[0], &args[1..])
}

fn prim_garef(ctx: &mut Context, args: &[Value]) -> EvalResult {
    required(args, 1)?;
    arrays::garef(ctx, &args[0], &args[1..])
}

fn prim_set_aref(ctx: &mut Context, args: &[Value]) -> EvalResult {
    required(args, 2)?;
    arrays::set_aref(ctx, &args[0], &args[1], &args[2..])
}

fn prim_set_garef(ctx: &mut Context, args: &[Value]) -> EvalResult {
    required(args, 2)?;
    arrays::set_garef(ctx, &args[0], &args[1], &args[2..])
}

fn prim_array_dimensions(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    arrays::array_dimensions(ctx, &args[0])
}

fn prim_streamp(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(ctx.boolean(ilos::instance_of(ctx, BuiltInClass::Stream, &args[0])))
}

fn prim_input_stream_p(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(ctx.boolean(binary::input_stream_p(ctx, &args[0])))
}

fn prim_output_stream_p(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(ctx.boolean(binary::output_stream_p(ctx, &args[0])))
}

fn prim_write_byte(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 2)?;
    binary::write_byte(ctx, &args[0], &args[1])
}

fn prim_close(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    binary::close(ctx, &args[0])
}

fn prim_create_string_input_stream(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    binary::create_string_input_stream(ctx, &args[0])
}

fn prim_create_string_output_stream(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 0)?;
    binary::create_string_output_stream(ctx)
}

fn prim_get_output_stream_string(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    binary::get_output_stream_string(ctx, &args[0])
}

fn prim_symbolp(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 1)?;
    Ok(ctx.boolean(ilos::instance_of(ctx, BuiltInClass::Symbol, &args[0])))
}

fn prim_property(ctx: &mut Context, args: &[Value]) -> EvalResult {
    required(args, 2)?;
    properties::property(ctx, &args[0], &args[1], &args[2..])
}

fn prim_set_property(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 3)?;
    properties::set_property(ctx, &args[0], &args[1], &args[2])
}

fn prim_remove_property(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 2)?;
    properties::remove_property(ctx, &args[0], &args[1])
}

fn prim_gensym(ctx: &mut Context, args: &[Value]) -> EvalResult {
    exactly(args, 0)?;
    properties::gensym(ctx)
}
