// Symbol properties and gensym
//
// Properties are keyed by (symbol, property-name) and live in the context,
// independent of any lexical binding.

use crate::conditions::{Condition, EvalResult};
use crate::context::Context;
use crate::fastmap::HashMap;
use crate::ilos::{ensure, BuiltInClass};
use crate::symbol::SymbolId;
use crate::types::Value;

#[derive(Debug, Default)]
pub struct PropertyStore {
    entries: HashMap<(SymbolId, SymbolId), Value>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: SymbolId, name: SymbolId) -> Option<&Value> {
        self.entries.get(&(symbol, name))
    }

    pub fn set(&mut self, symbol: SymbolId, name: SymbolId, value: Value) {
        self.entries.insert((symbol, name), value);
    }

    pub fn remove(&mut self, symbol: SymbolId, name: SymbolId) -> Option<Value> {
        self.entries.remove(&(symbol, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Both arguments must be symbols; `nil` counts as the symbol NIL.
fn property_key(ctx: &Context, symbol: &Value, name: &Value) -> Result<(SymbolId, SymbolId), Condition> {
    ensure(ctx, BuiltInClass::Symbol, &[symbol.clone(), name.clone()])?;
    match (ctx.symbol_id(symbol), ctx.symbol_id(name)) {
        (Some(s), Some(n)) => Ok((s, n)),
        _ => Err(Condition::domain_error(symbol, BuiltInClass::Symbol)),
    }
}

/// `(property symbol property-name [obj])`
pub fn property(ctx: &mut Context, symbol: &Value, name: &Value, default: &[Value]) -> EvalResult {
    let (s, n) = property_key(ctx, symbol, name)?;
    if default.len() > 1 {
        return Err(Condition::ArityError);
    }
    match ctx.properties.get(s, n) {
        Some(value) => Ok(value.clone()),
        None => Ok(default.first().cloned().unwrap_or(Value::Nil)),
    }
}

/// `(set-property obj symbol property-name)`
pub fn set_property(ctx: &mut Context, value: &Value, symbol: &Value, name: &Value) -> EvalResult {
    let (s, n) = property_key(ctx, symbol, name)?;
    ctx.properties.set(s, n, value.clone());
    Ok(value.clone())
}

/// `(remove-property symbol property-name)`
pub fn remove_property(ctx: &mut Context, symbol: &Value, name: &Value) -> EvalResult {
    let (s, n) = property_key(ctx, symbol, name)?;
    Ok(ctx.properties.remove(s, n).unwrap_or(Value::Nil))
}

/// `(gensym)` - a fresh uninterned symbol no reader can produce.
pub fn gensym(ctx: &mut Context) -> EvalResult {
    let id = ctx.symbols.gensym(&ctx.config.gensym_prefix);
    Ok(Value::Symbol(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_upsert_and_remove() {
        let mut store = PropertyStore::new();
        let (a, b) = (SymbolId(1), SymbolId(2));
        assert!(store.get(a, b).is_none());
        store.set(a, b, Value::Integer(1));
        store.set(a, b, Value::Integer(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(a, b), Some(&Value::Integer(2)));
        assert_eq!(store.get(b, a), None);
        assert_eq!(store.remove(a, b), Some(Value::Integer(2)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_nil_is_a_valid_key() {
        let mut ctx = Context::new();
        let p = ctx.symbol("P");
        set_property(&mut ctx, &Value::Integer(7), &Value::Nil, &p).unwrap();
        assert_eq!(property(&mut ctx, &Value::Nil, &p, &[]), Ok(Value::Integer(7)));
        assert_eq!(property(&mut ctx, &p, &Value::Nil, &[]), Ok(Value::Nil));
    }
}
