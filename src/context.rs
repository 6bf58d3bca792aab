use crate::arena::{Arena, Node};
use crate::arrays::ArrayStore;
use crate::conditions::EvalResult;
use crate::config::RuntimeConfig;
use crate::fastmap::HashMap;
use crate::ilos::ClassRegistry;
use crate::properties::PropertyStore;
use crate::streams::StreamManager;
use crate::symbol::{SymbolId, SymbolTable};
use crate::types::Value;

/// Type for primitive functions
pub type PrimitiveFn = fn(&mut Context, &[Value]) -> EvalResult;

/// Execution context threaded through every operation.
///
/// Owns every mutable store of the runtime core. It is built once per
/// evaluator and never shared between threads.
pub struct Context {
    pub config: RuntimeConfig,
    pub symbols: SymbolTable,
    pub classes: ClassRegistry,
    pub heap: Arena,
    pub arrays: ArrayStore,
    pub streams: StreamManager,
    pub properties: PropertyStore,
    primitives: HashMap<SymbolId, PrimitiveFn>,

    // Cached standard symbols
    pub t_sym: SymbolId,
    pub nil_sym: SymbolId,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut symbols = SymbolTable::new();
        let nil_sym = symbols.intern("NIL");
        let t_sym = symbols.intern("T");
        let streams = StreamManager::new(config.stream_buffer_capacity);

        Self {
            config,
            symbols,
            classes: ClassRegistry::new(),
            heap: Arena::new(),
            arrays: ArrayStore::new(),
            streams,
            properties: PropertyStore::new(),
            primitives: HashMap::default(),
            t_sym,
            nil_sym,
        }
    }

    pub fn register_primitive(&mut self, name: &str, func: PrimitiveFn) {
        let sym = self.symbols.intern(name);
        self.primitives.insert(sym, func);
    }

    pub fn primitive(&self, name: &str) -> Option<PrimitiveFn> {
        let sym = self.symbols.find(name)?;
        self.primitives.get(&sym).copied()
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// The symbol named `name` as a value; `NIL` reads back as `Value::Nil`.
    pub fn symbol(&mut self, name: &str) -> Value {
        let id = self.symbols.intern(name);
        self.symbol_value(id)
    }

    pub fn symbol_value(&self, id: SymbolId) -> Value {
        if id == self.nil_sym {
            Value::Nil
        } else {
            Value::Symbol(id)
        }
    }

    /// Symbol identity of a value, treating `nil` as the symbol NIL.
    pub fn symbol_id(&self, value: &Value) -> Option<SymbolId> {
        match value {
            Value::Nil => Some(self.nil_sym),
            Value::Symbol(id) => Some(*id),
            _ => None,
        }
    }

    pub fn t(&self) -> Value {
        Value::Symbol(self.t_sym)
    }

    pub fn boolean(&self, b: bool) -> Value {
        if b {
            self.t()
        } else {
            Value::Nil
        }
    }

    pub fn cons(&mut self, car: Value, cdr: Value) -> EvalResult {
        Ok(Value::Cons(self.heap.alloc(Node::Cons(car, cdr))?))
    }

    pub fn make_list(&mut self, items: &[Value]) -> EvalResult {
        let mut list = Value::Nil;
        for item in items.iter().rev() {
            list = self.cons(item.clone(), list)?;
        }
        Ok(list)
    }

    /// Elements of a proper list, or `None` for anything else.
    pub fn list_to_vec(&self, list: &Value) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        let mut current = list;
        loop {
            match current {
                Value::Nil => return Some(items),
                Value::Cons(id) => match self.heap.get(*id) {
                    Some(Node::Cons(car, cdr)) => {
                        items.push(car.clone());
                        current = cdr;
                    }
                    _ => return None,
                },
                _ => return None,
            }
        }
    }

    pub fn make_string(&mut self, text: &str) -> EvalResult {
        Ok(Value::String(self.arrays.alloc_text(text.chars().collect())?))
    }

    pub fn make_vector(&mut self, items: Vec<Value>) -> EvalResult {
        Ok(Value::GeneralVector(self.arrays.alloc_vector(items)?))
    }

    /// Contents of a string value.
    pub fn string_content(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(id) => self.arrays.text(*id).map(|chars| chars.iter().collect()),
            _ => None,
        }
    }
}
