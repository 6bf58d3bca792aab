use islisp_core::binary::{
    close, fresh_line, get_output_stream_string, input_stream_p, output_stream_p, read_byte,
    write_byte,
};
use islisp_core::conditions::Condition;
use islisp_core::config::RuntimeConfig;
use islisp_core::context::Context;
use islisp_core::ilos::BuiltInClass;
use islisp_core::streams::{StreamElementType, StreamId};
use islisp_core::types::Value;
use num_bigint::BigInt;
use std::io::{self, Write};

fn new_context() -> Context {
    let _ = env_logger::builder().is_test(true).try_init();
    Context::new()
}

fn byte_input(ctx: &mut Context, bytes: &[u8]) -> (StreamId, Value) {
    let id = ctx.streams.open_bytes(bytes.to_vec(), StreamElementType::Byte);
    (id, Value::Stream(id))
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

#[test]
fn read_byte_returns_each_byte_then_signals_end() {
    let mut ctx = new_context();
    let (id, stream) = byte_input(&mut ctx, &[0, 128, 255]);

    assert_eq!(read_byte(&mut ctx, &[stream.clone()]), Ok(Value::Integer(0)));
    assert_eq!(read_byte(&mut ctx, &[stream.clone()]), Ok(Value::Integer(128)));
    assert_eq!(read_byte(&mut ctx, &[stream.clone()]), Ok(Value::Integer(255)));
    assert_eq!(
        read_byte(&mut ctx, &[stream.clone()]),
        Err(Condition::EndOfStream { stream: id })
    );
    let t = ctx.t();
    assert_eq!(
        read_byte(&mut ctx, &[stream, t]),
        Err(Condition::EndOfStream { stream: id })
    );
}

#[test]
fn read_byte_without_eos_error_returns_eos_value() {
    let mut ctx = new_context();
    let (_, stream) = byte_input(&mut ctx, &[]);

    assert_eq!(read_byte(&mut ctx, &[stream.clone(), Value::Nil]), Ok(Value::Nil));
    let marker = ctx.symbol("EOF");
    assert_eq!(
        read_byte(&mut ctx, &[stream, Value::Nil, marker.clone()]),
        Ok(marker)
    );
}

#[test]
fn read_byte_validates_arguments() {
    let mut ctx = new_context();
    let (_, stream) = byte_input(&mut ctx, &[1]);

    assert_eq!(
        read_byte(&mut ctx, &[Value::Integer(1)]),
        Err(Condition::domain_error(&Value::Integer(1), BuiltInClass::Stream))
    );
    let output = Value::Stream(ctx.streams.open_buffer(StreamElementType::Byte));
    assert_eq!(
        read_byte(&mut ctx, &[output.clone()]),
        Err(Condition::domain_error(&output, BuiltInClass::Stream))
    );
    let too_many = [stream, Value::Nil, Value::Nil, Value::Nil];
    assert_eq!(read_byte(&mut ctx, &too_many), Err(Condition::ArityError));
    // Class checks first: a bad stream with too many arguments is a domain error.
    let bad = [Value::Integer(1), Value::Nil, Value::Nil, Value::Nil];
    assert!(matches!(
        read_byte(&mut ctx, &bad),
        Err(Condition::DomainError { .. })
    ));
}

#[test]
fn write_byte_appends_the_low_eight_bits() {
    let mut ctx = new_context();
    let id = ctx.streams.open_buffer(StreamElementType::Byte);
    let stream = Value::Stream(id);

    assert_eq!(write_byte(&mut ctx, &Value::Integer(200), &stream), Ok(Value::Integer(200)));
    assert_eq!(write_byte(&mut ctx, &Value::Integer(0x1_41), &stream), Ok(Value::Integer(0x41)));
    assert_eq!(write_byte(&mut ctx, &Value::Integer(-1), &stream), Ok(Value::Integer(255)));
    let big = Value::from(BigInt::from(u64::MAX) * 256 + 7);
    assert_eq!(write_byte(&mut ctx, &big, &stream), Ok(Value::Integer(7)));

    assert_eq!(ctx.streams.output_bytes(id), Some(&[0xC8, 0x41, 0xFF, 0x07][..]));
}

#[test]
fn write_byte_checks_stream_then_integer() {
    let mut ctx = new_context();
    let (_, input) = byte_input(&mut ctx, &[]);
    assert_eq!(
        write_byte(&mut ctx, &Value::Character('a'), &input),
        Err(Condition::domain_error(&input, BuiltInClass::Stream))
    );

    let output = Value::Stream(ctx.streams.open_buffer(StreamElementType::Byte));
    assert_eq!(
        write_byte(&mut ctx, &Value::Character('a'), &output),
        Err(Condition::domain_error(&Value::Character('a'), BuiltInClass::Integer))
    );
}

#[test]
fn failing_sink_signals_stream_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = RuntimeConfig {
        stream_buffer_capacity: 0,
        ..RuntimeConfig::default()
    };
    let mut ctx = Context::with_config(config);
    let id = ctx.streams.open_output(Box::new(Broken), StreamElementType::Byte);

    assert_eq!(
        write_byte(&mut ctx, &Value::Integer(1), &Value::Stream(id)),
        Err(Condition::StreamError { stream: id })
    );
}

#[test]
fn closed_streams_keep_their_direction() {
    let mut ctx = new_context();
    let (id, input) = byte_input(&mut ctx, &[1, 2]);
    let output_id = ctx.streams.open_buffer(StreamElementType::Byte);
    let output = Value::Stream(output_id);

    close(&mut ctx, &input).unwrap();
    close(&mut ctx, &output).unwrap();
    assert!(input_stream_p(&ctx, &input));
    assert!(output_stream_p(&ctx, &output));

    assert_eq!(read_byte(&mut ctx, &[input.clone()]), Err(Condition::EndOfStream { stream: id }));
    assert_eq!(read_byte(&mut ctx, &[input, Value::Nil]), Ok(Value::Nil));
    assert_eq!(
        write_byte(&mut ctx, &Value::Integer(1), &output),
        Err(Condition::StreamError { stream: output_id })
    );
}

#[test]
fn fresh_line_follows_the_column() {
    let mut ctx = new_context();
    let id = ctx.streams.open_buffer(StreamElementType::Character);
    let stream = Value::Stream(id);

    fresh_line(&mut ctx, &[stream.clone()]).unwrap();
    assert_eq!(ctx.streams.column(id), Some(0));

    ctx.streams.write_string(id, "abc").unwrap();
    assert_eq!(ctx.streams.column(id), Some(3));
    fresh_line(&mut ctx, &[stream.clone()]).unwrap();
    fresh_line(&mut ctx, &[stream.clone()]).unwrap();
    assert_eq!(ctx.streams.column(id), Some(0));

    write_byte(&mut ctx, &Value::Integer(i64::from(b'x')), &stream).unwrap();
    assert_eq!(ctx.streams.column(id), Some(1));

    let text = get_output_stream_string(&mut ctx, &stream).unwrap();
    assert_eq!(ctx.string_content(&text).as_deref(), Some("abc\nx"));
}

#[test]
fn file_streams_round_trip_bytes() {
    let mut ctx = new_context();
    let path = std::env::temp_dir().join(format!("islisp-core-bytes-{}.bin", std::process::id()));

    let out_id = ctx
        .streams
        .open_output_file(&path, StreamElementType::Byte)
        .unwrap();
    let out = Value::Stream(out_id);
    for byte in [7, 300, -2] {
        write_byte(&mut ctx, &Value::Integer(byte), &out).unwrap();
    }
    close(&mut ctx, &out).unwrap();

    let in_id = ctx
        .streams
        .open_input_file(&path, StreamElementType::Byte)
        .unwrap();
    let input = Value::Stream(in_id);
    let mut read = Vec::new();
    while let Ok(Value::Integer(b)) = read_byte(&mut ctx, &[input.clone(), Value::Nil]) {
        read.push(b);
    }
    assert_eq!(read, vec![7, 44, 254]);
    std::fs::remove_file(&path).unwrap();
}
