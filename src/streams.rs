// ISLISP Streams
//
// A stream bundles a pull-based reader, a push-based sink and the output
// column used by fresh-line and tabbing. Streams live in the StreamManager
// and are referenced by StreamId.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// Stream identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u32);

/// Element type for streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamElementType {
    Character,
    Byte,
}

enum Sink {
    /// In-memory output, readable back with `take_output`
    Buffer(Vec<u8>),
    Writer(BufWriter<Box<dyn Write>>),
}

pub struct Stream {
    pub element_type: StreamElementType,
    column: usize,
    input: Option<Box<dyn BufRead>>,
    output: Option<Sink>,
    readable: bool,
    writable: bool,
    open: bool,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("element_type", &self.element_type)
            .field("column", &self.column)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("open", &self.open)
            .finish()
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "stream is closed")
}

impl Stream {
    pub fn input(reader: Box<dyn BufRead>, element_type: StreamElementType) -> Self {
        Self {
            element_type,
            column: 0,
            input: Some(reader),
            output: None,
            readable: true,
            writable: false,
            open: true,
        }
    }

    pub fn output(writer: Box<dyn Write>, capacity: usize, element_type: StreamElementType) -> Self {
        Self {
            element_type,
            column: 0,
            input: None,
            output: Some(Sink::Writer(BufWriter::with_capacity(capacity, writer))),
            readable: false,
            writable: true,
            open: true,
        }
    }

    pub fn buffer(element_type: StreamElementType) -> Self {
        Self {
            element_type,
            column: 0,
            input: None,
            output: Some(Sink::Buffer(Vec::new())),
            readable: false,
            writable: true,
            open: true,
        }
    }

    /// Direction survives `close`; only the I/O itself starts failing.
    pub fn is_input(&self) -> bool {
        self.readable
    }

    pub fn is_output(&self) -> bool {
        self.writable
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current output column, 0-based.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Write a chunk, updating the column: without a newline the chunk
    /// length is added, otherwise the column becomes the byte count after
    /// the last newline.
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.open {
            return Err(closed());
        }
        let sink = self.output.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "not an output stream")
        })?;
        match sink {
            Sink::Buffer(buffer) => buffer.extend_from_slice(bytes),
            Sink::Writer(writer) => writer.write_all(bytes)?,
        }
        match bytes.iter().rposition(|&b| b == b'\n') {
            Some(nl) => self.column = bytes.len() - nl - 1,
            None => self.column += bytes.len(),
        }
        Ok(())
    }

    /// Read exactly one byte. `Ok(None)` at end of input.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !self.open {
            return Err(closed());
        }
        let reader = self.input.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "not an input stream")
        })?;
        let mut buf = [0u8; 1];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if !self.open {
            return Err(closed());
        }
        match &mut self.output {
            Some(Sink::Writer(writer)) => writer.flush(),
            _ => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let flushed = self.flush();
        self.open = false;
        self.input = None;
        if matches!(self.output, Some(Sink::Writer(_))) {
            self.output = None;
        }
        flushed
    }
}

/// Stream manager - handles all stream operations
pub struct StreamManager {
    streams: Vec<Stream>,
    standard_input: StreamId,
    standard_output: StreamId,
    buffer_capacity: usize,
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new(8 * 1024)
    }
}

impl StreamManager {
    /// Create a new stream manager with standard streams
    pub fn new(buffer_capacity: usize) -> Self {
        let mut manager = Self {
            streams: Vec::new(),
            standard_input: StreamId(0),
            standard_output: StreamId(1),
            buffer_capacity,
        };

        let stdin = Box::new(BufReader::new(io::stdin()));
        manager.alloc(Stream::input(stdin, StreamElementType::Character)); // 0
        manager.alloc(Stream::output(
            Box::new(io::stdout()),
            buffer_capacity,
            StreamElementType::Character,
        )); // 1
        manager.alloc(Stream::output(
            Box::new(io::stderr()),
            0,
            StreamElementType::Character,
        )); // 2

        manager
    }

    pub fn standard_input(&self) -> StreamId {
        self.standard_input
    }

    pub fn standard_output(&self) -> StreamId {
        self.standard_output
    }

    pub fn error_output(&self) -> StreamId {
        StreamId(2)
    }

    /// Rebind the default input stream, e.g. to feed a script from memory.
    pub fn set_standard_input(&mut self, id: StreamId) {
        self.standard_input = id;
    }

    pub fn set_standard_output(&mut self, id: StreamId) {
        self.standard_output = id;
    }

    /// Allocate a new stream
    pub fn alloc(&mut self, stream: Stream) -> StreamId {
        let id = StreamId(self.streams.len() as u32);
        log::debug!("open {:?} as stream {}", stream, id.0);
        self.streams.push(stream);
        id
    }

    pub fn open_input(&mut self, reader: Box<dyn BufRead>, element_type: StreamElementType) -> StreamId {
        self.alloc(Stream::input(reader, element_type))
    }

    pub fn open_output(&mut self, writer: Box<dyn Write>, element_type: StreamElementType) -> StreamId {
        let capacity = self.buffer_capacity;
        self.alloc(Stream::output(writer, capacity, element_type))
    }

    /// Input stream over an in-memory byte sequence.
    pub fn open_bytes(&mut self, bytes: Vec<u8>, element_type: StreamElementType) -> StreamId {
        self.open_input(Box::new(Cursor::new(bytes)), element_type)
    }

    /// Output stream that accumulates in memory.
    pub fn open_buffer(&mut self, element_type: StreamElementType) -> StreamId {
        self.alloc(Stream::buffer(element_type))
    }

    pub fn open_input_file(&mut self, path: &Path, element_type: StreamElementType) -> io::Result<StreamId> {
        let file = File::open(path)?;
        Ok(self.open_input(Box::new(BufReader::new(file)), element_type))
    }

    pub fn open_output_file(&mut self, path: &Path, element_type: StreamElementType) -> io::Result<StreamId> {
        let file = File::create(path)?;
        Ok(self.open_output(Box::new(file), element_type))
    }

    /// Get a stream by ID
    pub fn get(&self, id: StreamId) -> Option<&Stream> {
        self.streams.get(id.0 as usize)
    }

    /// Get a mutable stream by ID
    pub fn get_mut(&mut self, id: StreamId) -> Option<&mut Stream> {
        self.streams.get_mut(id.0 as usize)
    }

    fn stream_mut(&mut self, id: StreamId) -> io::Result<&mut Stream> {
        self.get_mut(id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such stream"))
    }

    /// Close a stream. Standard streams stay open; later I/O on a closed
    /// stream fails.
    pub fn close(&mut self, id: StreamId) -> io::Result<bool> {
        if id.0 <= 2 {
            return Ok(false);
        }
        let stream = self.stream_mut(id)?;
        if !stream.is_open() {
            return Ok(false);
        }
        log::debug!("close stream {}", id.0);
        stream.close()?;
        Ok(true)
    }

    pub fn write_bytes(&mut self, id: StreamId, bytes: &[u8]) -> io::Result<()> {
        self.stream_mut(id)?.write(bytes)
    }

    pub fn write_string(&mut self, id: StreamId, s: &str) -> io::Result<()> {
        self.write_bytes(id, s.as_bytes())
    }

    pub fn column(&self, id: StreamId) -> Option<usize> {
        self.get(id).map(Stream::column)
    }

    /// Fresh line - write newline only if not at column 0
    pub fn fresh_line(&mut self, id: StreamId) -> io::Result<bool> {
        let stream = self.stream_mut(id)?;
        if stream.column() != 0 {
            stream.write(b"\n")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn read_byte(&mut self, id: StreamId) -> io::Result<Option<u8>> {
        self.stream_mut(id)?.read_byte()
    }

    /// Flush output stream
    pub fn finish_output(&mut self, id: StreamId) -> io::Result<()> {
        self.stream_mut(id)?.flush()
    }

    /// Bytes written so far to an in-memory output stream.
    pub fn output_bytes(&self, id: StreamId) -> Option<&[u8]> {
        match self.get(id).and_then(|s| s.output.as_ref()) {
            Some(Sink::Buffer(buffer)) => Some(buffer.as_slice()),
            _ => None,
        }
    }

    /// Drain an in-memory output stream, resetting its column.
    pub fn take_output(&mut self, id: StreamId) -> Option<Vec<u8>> {
        let stream = self.get_mut(id)?;
        match &mut stream.output {
            Some(Sink::Buffer(buffer)) => {
                stream.column = 0;
                Some(std::mem::take(buffer))
            }
            _ => None,
        }
    }
}
