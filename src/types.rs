use num_bigint::BigInt;
use num_traits::ToPrimitive;

pub use crate::arrays::{StringId, VectorId};
pub use crate::ilos::{Class, InstanceId};
pub use crate::streams::StreamId;
pub use crate::symbol::SymbolId;

/// Handle to a heap node (array node or cons cell) in the `Arena`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u32);

/// A runtime value.
///
/// Everything that lives in a store (strings, vectors, array nodes, conses,
/// streams) is referenced by handle, so cloning a `Value` aliases the object
/// rather than copying it.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Integer(i64),
    BigInt(BigInt),     // Arbitrary precision integer
    Float(f64),
    Character(char),
    Symbol(SymbolId),
    String(StringId),   // Text in the array store
    GeneralVector(VectorId),
    GeneralArray(NodeId), // Root node of a general-array*
    Cons(NodeId),
    Stream(StreamId),
    Class(Class),
    Instance(InstanceId),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Integer payload as an index. Negative integers and bignums that do not
    /// fit a `usize` yield `None`.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Integer(n) => usize::try_from(*n).ok(),
            Value::BigInt(n) => n.to_usize(),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Character(c)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        // Keep the small representation canonical
        match n.to_i64() {
            Some(small) => Value::Integer(small),
            None => Value::BigInt(n),
        }
    }
}
