// Byte-level and column-aware stream operations
//
// Lisp-facing wrappers over the StreamManager: they validate their arguments
// and turn I/O failures into stream-error / end-of-stream conditions.

use crate::conditions::{Condition, EvalResult};
use crate::context::Context;
use crate::ilos::{ensure, BuiltInClass};
use crate::streams::{StreamElementType, StreamId};
use crate::types::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::slice;

fn stream_id(value: &Value) -> Result<StreamId, Condition> {
    match value {
        Value::Stream(id) => Ok(*id),
        _ => Err(Condition::domain_error(value, BuiltInClass::Stream)),
    }
}

pub fn input_stream_p(ctx: &Context, obj: &Value) -> bool {
    match obj {
        Value::Stream(id) => ctx.streams.get(*id).is_some_and(|s| s.is_input()),
        _ => false,
    }
}

pub fn output_stream_p(ctx: &Context, obj: &Value) -> bool {
    match obj {
        Value::Stream(id) => ctx.streams.get(*id).is_some_and(|s| s.is_output()),
        _ => false,
    }
}

/// `(read-byte [input-stream [eos-error-p [eos-value]]])`
///
/// The stream defaults to standard input. End of input (or a read failure)
/// signals end-of-stream unless `eos-error-p` is `nil`, in which case
/// `eos-value` (default `nil`) is returned.
pub fn read_byte(ctx: &mut Context, args: &[Value]) -> EvalResult {
    let stream = match args.first() {
        Some(value) => value.clone(),
        None => Value::Stream(ctx.streams.standard_input()),
    };
    if !input_stream_p(ctx, &stream) {
        return Err(Condition::domain_error(&stream, BuiltInClass::Stream));
    }
    if args.len() > 3 {
        return Err(Condition::ArityError);
    }
    let eos_error_p = !args.get(1).is_some_and(Value::is_nil);
    let eos_value = args.get(2).cloned().unwrap_or(Value::Nil);
    let id = stream_id(&stream)?;

    match ctx.streams.read_byte(id) {
        Ok(Some(byte)) => Ok(Value::Integer(i64::from(byte))),
        Ok(None) | Err(_) if !eos_error_p => Ok(eos_value),
        Ok(None) | Err(_) => Err(Condition::EndOfStream { stream: id }),
    }
}

/// Low 8 bits of an integer, two's complement for negatives.
fn low_byte(value: &Value) -> Option<u8> {
    match value {
        Value::Integer(n) => Some(*n as u8),
        Value::BigInt(n) => (n & BigInt::from(0xff)).to_u8(),
        _ => None,
    }
}

/// `(write-byte z output-stream)`
///
/// Writes the low 8 bits of `z` and returns the byte actually written.
pub fn write_byte(ctx: &mut Context, obj: &Value, stream: &Value) -> EvalResult {
    if !output_stream_p(ctx, stream) {
        return Err(Condition::domain_error(stream, BuiltInClass::Stream));
    }
    ensure(ctx, BuiltInClass::Integer, slice::from_ref(obj))?;
    let id = stream_id(stream)?;
    let byte = low_byte(obj).ok_or_else(|| Condition::domain_error(obj, BuiltInClass::Integer))?;
    ctx.streams
        .write_bytes(id, &[byte])
        .map_err(|_| Condition::StreamError { stream: id })?;
    Ok(Value::Integer(i64::from(byte)))
}

/// `(fresh-line [output-stream])`
pub fn fresh_line(ctx: &mut Context, args: &[Value]) -> EvalResult {
    let id = optional_output_stream(ctx, args)?;
    ctx.streams
        .fresh_line(id)
        .map_err(|_| Condition::StreamError { stream: id })?;
    Ok(Value::Nil)
}

/// `(finish-output [output-stream])`
pub fn finish_output(ctx: &mut Context, args: &[Value]) -> EvalResult {
    let id = optional_output_stream(ctx, args)?;
    ctx.streams
        .finish_output(id)
        .map_err(|_| Condition::StreamError { stream: id })?;
    Ok(Value::Nil)
}

fn optional_output_stream(ctx: &Context, args: &[Value]) -> Result<StreamId, Condition> {
    let stream = match args.first() {
        Some(value) => value.clone(),
        None => Value::Stream(ctx.streams.standard_output()),
    };
    if !output_stream_p(ctx, &stream) {
        return Err(Condition::domain_error(&stream, BuiltInClass::Stream));
    }
    if args.len() > 1 {
        return Err(Condition::ArityError);
    }
    stream_id(&stream)
}

/// `(close stream)`
pub fn close(ctx: &mut Context, stream: &Value) -> EvalResult {
    ensure(ctx, BuiltInClass::Stream, slice::from_ref(stream))?;
    let id = stream_id(stream)?;
    ctx.streams
        .close(id)
        .map_err(|_| Condition::StreamError { stream: id })?;
    Ok(Value::Nil)
}

/// `(create-string-input-stream string)`
pub fn create_string_input_stream(ctx: &mut Context, string: &Value) -> EvalResult {
    ensure(ctx, BuiltInClass::String, slice::from_ref(string))?;
    let text = ctx
        .string_content(string)
        .ok_or_else(|| Condition::domain_error(string, BuiltInClass::String))?;
    let id = ctx
        .streams
        .open_bytes(text.into_bytes(), StreamElementType::Character);
    Ok(Value::Stream(id))
}

/// `(create-string-output-stream)`
pub fn create_string_output_stream(ctx: &mut Context) -> EvalResult {
    Ok(Value::Stream(ctx.streams.open_buffer(StreamElementType::Character)))
}

/// `(get-output-stream-string stream)` - drains the accumulated output.
pub fn get_output_stream_string(ctx: &mut Context, stream: &Value) -> EvalResult {
    ensure(ctx, BuiltInClass::Stream, slice::from_ref(stream))?;
    let id = stream_id(stream)?;
    let bytes = ctx
        .streams
        .take_output(id)
        .ok_or_else(|| Condition::domain_error(stream, BuiltInClass::Stream))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    ctx.make_string(&text)
}
