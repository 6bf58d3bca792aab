// ISLISP Arrays - the basic-array family
//
// Text and general vectors are flat and live in the ArrayStore. Every other
// rank lives in the heap arena as a tree of nodes: a leaf per element, an
// interior node per index level. Rank-1 requests to `create_array` are always
// flattened into a general vector.

use crate::arena::{Arena, Dimensions, Node};
use crate::conditions::{Condition, EvalResult};
use crate::context::Context;
use crate::ilos::{ensure, instance_of, BuiltInClass};
use crate::types::{NodeId, Value};
use num_traits::Signed;
use std::slice;

/// Handle to a text string (index into ArrayStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringId(pub u32);

/// Handle to a general vector (index into ArrayStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorId(pub u32);

/// Storage for flat arrays. Elements mutate in place; lengths never change.
#[derive(Debug, Default)]
pub struct ArrayStore {
    texts: Vec<Vec<char>>,
    vectors: Vec<Vec<Value>>,
}

impl ArrayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a string. Fails once the handle space is used up.
    pub fn alloc_text(&mut self, content: Vec<char>) -> Result<StringId, Condition> {
        let idx = next_handle(self.texts.len(), content.len())?;
        self.texts.push(content);
        Ok(StringId(idx))
    }

    /// Allocate a vector from existing content
    pub fn alloc_vector(&mut self, content: Vec<Value>) -> Result<VectorId, Condition> {
        let idx = next_handle(self.vectors.len(), content.len())?;
        self.vectors.push(content);
        Ok(VectorId(idx))
    }

    /// Allocate a vector of `size` copies of `fill`, failing instead of
    /// aborting if the memory is not available.
    pub fn try_alloc_vector(&mut self, size: usize, fill: &Value) -> Result<VectorId, Condition> {
        let mut content = Vec::new();
        content
            .try_reserve_exact(size)
            .map_err(|_| storage_exhausted(size))?;
        content.resize(size, fill.clone());
        self.alloc_vector(content)
    }

    pub fn text(&self, id: StringId) -> Option<&[char]> {
        self.texts.get(id.0 as usize).map(Vec::as_slice)
    }

    pub fn vector(&self, id: VectorId) -> Option<&[Value]> {
        self.vectors.get(id.0 as usize).map(Vec::as_slice)
    }

    /// Set character at index. False if out of range.
    pub fn set_char(&mut self, id: StringId, index: usize, c: char) -> bool {
        match self.texts.get_mut(id.0 as usize).and_then(|t| t.get_mut(index)) {
            Some(slot) => {
                *slot = c;
                true
            }
            None => false,
        }
    }

    /// Set element at index. False if out of range.
    pub fn set_element(&mut self, id: VectorId, index: usize, value: Value) -> bool {
        match self.vectors.get_mut(id.0 as usize).and_then(|v| v.get_mut(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// Handle for the next slot of a store holding `len` entries.
fn next_handle(len: usize, requested: usize) -> Result<u32, Condition> {
    u32::try_from(len).map_err(|_| storage_exhausted(requested))
}

fn storage_exhausted(requested: usize) -> Condition {
    log::warn!("cannot create array of {} elements", requested);
    Condition::StorageExhausted { requested }
}

fn is_negative(value: &Value) -> bool {
    match value {
        Value::Integer(n) => *n < 0,
        Value::BigInt(n) => n.is_negative(),
        _ => false,
    }
}

/// The single index a flat array accepts.
fn single_index(indices: &[Value]) -> Result<usize, Condition> {
    match indices {
        [index] => index.as_index().ok_or(Condition::IndexOutOfRange),
        _ => Err(Condition::ArityError),
    }
}

/// Walk from `root` one index per level and return the leaf reached.
///
/// Every step must land on an interior node with enough children, and the
/// walk must end exactly on a leaf; stopping above one means too few indices.
fn locate(heap: &Arena, root: NodeId, indices: &[Value]) -> Result<NodeId, Condition> {
    let mut current = root;
    for index in indices {
        let i = index.as_index().ok_or(Condition::IndexOutOfRange)?;
        current = heap.child(current, i).ok_or(Condition::IndexOutOfRange)?;
    }
    match heap.get(current) {
        Some(Node::Leaf(_)) => Ok(current),
        _ => Err(Condition::IndexOutOfRange),
    }
}

/// Build the tree for `dims` bottom-up: allocate the lowest level first, then
/// wrap each run of `d` consecutive nodes into a parent, one level at a time.
///
/// A zero dimension cuts the tree there: the lowest level is then one `Empty`
/// node per position above it, each remembering the dimensions below.
fn build_node(heap: &mut Arena, dims: &[usize], fill: &Value) -> Result<NodeId, Condition> {
    let (upper, bottom) = match dims.iter().position(|&d| d == 0) {
        Some(zero) => (&dims[..zero], Node::Empty(Dimensions::from_slice(&dims[zero + 1..]))),
        None => (dims, Node::Leaf(fill.clone())),
    };
    let width = upper
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| storage_exhausted(usize::MAX))?;

    let mut level = Vec::new();
    level
        .try_reserve_exact(width)
        .map_err(|_| storage_exhausted(width))?;
    for _ in 0..width {
        level.push(heap.alloc(bottom.clone())?);
    }

    for &d in upper.iter().rev() {
        let mut parents = Vec::new();
        parents
            .try_reserve_exact(level.len() / d)
            .map_err(|_| storage_exhausted(level.len() / d))?;
        for run in level.chunks_exact(d) {
            parents.push(heap.alloc(Node::Branch(run.to_vec()))?);
        }
        level = parents;
    }

    match level.as_slice() {
        [root] => Ok(*root),
        _ => Err(storage_exhausted(level.len())),
    }
}

/// Number of arena nodes a tree of shape `dims` needs, if it fits a usize.
fn node_count(dims: &[usize]) -> Option<usize> {
    let mut level = 1usize;
    let mut total = 1usize;
    for &d in dims {
        if d == 0 {
            break;
        }
        level = level.checked_mul(d)?;
        total = total.checked_add(level)?;
    }
    Some(total)
}

/// `(create-array dimensions [initial-element])`
///
/// `dimensions` must be a proper list of non-negative integers. Rank 0 gives
/// a single leaf, rank 1 a general vector, higher ranks a node tree whose
/// leaves all start as `fill` (default `nil`).
pub fn create_array(ctx: &mut Context, dimensions: &Value, fill: &[Value]) -> EvalResult {
    ensure(ctx, BuiltInClass::List, slice::from_ref(dimensions))?;
    let items = ctx
        .list_to_vec(dimensions)
        .ok_or_else(|| Condition::domain_error(dimensions, BuiltInClass::List))?;
    ensure(ctx, BuiltInClass::Integer, &items)?;
    if let Some(negative) = items.iter().find(|item| is_negative(item)) {
        return Err(Condition::domain_error(negative, BuiltInClass::Integer));
    }
    if fill.len() > 1 {
        return Err(Condition::ArityError);
    }
    let fill = fill.first().cloned().unwrap_or(Value::Nil);

    let mut dims = Dimensions::with_capacity(items.len());
    for item in &items {
        dims.push(item.as_index().ok_or_else(|| storage_exhausted(usize::MAX))?);
    }
    let count = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| storage_exhausted(usize::MAX))?;
    if count > ctx.config.max_array_elements {
        return Err(storage_exhausted(count));
    }
    log::trace!("create-array {:?} ({} elements)", dims.as_slice(), count);

    if let [length] = dims.as_slice() {
        let id = ctx.arrays.try_alloc_vector(*length, &fill)?;
        return Ok(Value::GeneralVector(id));
    }
    let nodes = node_count(&dims).ok_or_else(|| storage_exhausted(usize::MAX))?;
    if nodes > ctx.config.max_array_elements {
        return Err(storage_exhausted(nodes));
    }
    ctx.heap.reserve(nodes)?;
    let root = build_node(&mut ctx.heap, &dims, &fill)?;
    Ok(Value::GeneralArray(root))
}

/// `(aref basic-array z*)`
pub fn aref(ctx: &Context, array: &Value, indices: &[Value]) -> EvalResult {
    ensure(ctx, BuiltInClass::BasicArray, slice::from_ref(array))?;
    ensure(ctx, BuiltInClass::Integer, indices)?;
    match array {
        Value::String(id) => {
            let index = single_index(indices)?;
            ctx.arrays
                .text(*id)
                .and_then(|text| text.get(index))
                .map(|&c| Value::Character(c))
                .ok_or(Condition::IndexOutOfRange)
        }
        Value::GeneralVector(id) => vector_ref(ctx, *id, indices),
        _ => garef(ctx, array, indices),
    }
}

fn vector_ref(ctx: &Context, id: VectorId, indices: &[Value]) -> EvalResult {
    let index = single_index(indices)?;
    ctx.arrays
        .vector(id)
        .and_then(|v| v.get(index))
        .cloned()
        .ok_or(Condition::IndexOutOfRange)
}

fn ensure_general_array(ctx: &Context, array: &Value) -> Result<(), Condition> {
    if instance_of(ctx, BuiltInClass::GeneralVector, array)
        || instance_of(ctx, BuiltInClass::GeneralArrayStar, array)
    {
        Ok(())
    } else {
        Err(Condition::domain_error(array, BuiltInClass::GeneralArrayStar))
    }
}

/// `(garef general-array z*)`
pub fn garef(ctx: &Context, array: &Value, indices: &[Value]) -> EvalResult {
    ensure_general_array(ctx, array)?;
    ensure(ctx, BuiltInClass::Integer, indices)?;
    match array {
        Value::GeneralVector(id) => vector_ref(ctx, *id, indices),
        Value::GeneralArray(root) => {
            let leaf = locate(&ctx.heap, *root, indices)?;
            match ctx.heap.get(leaf) {
                Some(Node::Leaf(value)) => Ok(value.clone()),
                _ => Err(Condition::IndexOutOfRange),
            }
        }
        _ => Err(Condition::domain_error(array, BuiltInClass::GeneralArrayStar)),
    }
}

/// `(set-aref obj basic-array z*)`
pub fn set_aref(ctx: &mut Context, value: &Value, array: &Value, indices: &[Value]) -> EvalResult {
    ensure(ctx, BuiltInClass::BasicArray, slice::from_ref(array))?;
    ensure(ctx, BuiltInClass::Integer, indices)?;
    match array {
        Value::String(id) => {
            ensure(ctx, BuiltInClass::Character, slice::from_ref(value))?;
            let index = single_index(indices)?;
            let c = match value {
                Value::Character(c) => *c,
                _ => return Err(Condition::domain_error(value, BuiltInClass::Character)),
            };
            if !ctx.arrays.set_char(*id, index, c) {
                return Err(Condition::IndexOutOfRange);
            }
            Ok(value.clone())
        }
        Value::GeneralVector(id) => vector_set(ctx, value, *id, indices),
        _ => set_garef(ctx, value, array, indices),
    }
}

fn vector_set(ctx: &mut Context, value: &Value, id: VectorId, indices: &[Value]) -> EvalResult {
    let index = single_index(indices)?;
    if !ctx.arrays.set_element(id, index, value.clone()) {
        return Err(Condition::IndexOutOfRange);
    }
    Ok(value.clone())
}

/// `(set-garef obj general-array z*)`
///
/// Writes through to the shared leaf: every value aliasing this array (or a
/// sub-array containing the leaf) observes the new element.
pub fn set_garef(ctx: &mut Context, value: &Value, array: &Value, indices: &[Value]) -> EvalResult {
    ensure_general_array(ctx, array)?;
    ensure(ctx, BuiltInClass::Integer, indices)?;
    match array {
        Value::GeneralVector(id) => vector_set(ctx, value, *id, indices),
        Value::GeneralArray(root) => {
            let leaf = locate(&ctx.heap, *root, indices)?;
            match ctx.heap.get_mut(leaf) {
                Some(Node::Leaf(slot)) => {
                    *slot = value.clone();
                    Ok(value.clone())
                }
                _ => Err(Condition::IndexOutOfRange),
            }
        }
        _ => Err(Condition::domain_error(array, BuiltInClass::GeneralArrayStar)),
    }
}

/// Shape of a basic-array.
///
/// Nested arrays are measured along index 0 at every level, which is exact
/// for the rectangular trees `create_array` builds.
pub fn dimensions(ctx: &Context, array: &Value) -> Result<Dimensions, Condition> {
    ensure(ctx, BuiltInClass::BasicArray, slice::from_ref(array))?;
    match array {
        Value::String(id) => {
            let len = ctx.arrays.text(*id).map_or(0, |text| text.len());
            Ok(Dimensions::from_slice(&[len]))
        }
        Value::GeneralVector(id) => {
            let len = ctx.arrays.vector(*id).map_or(0, |v| v.len());
            Ok(Dimensions::from_slice(&[len]))
        }
        Value::GeneralArray(root) => Ok(ctx.heap.shape(*root)),
        _ => Err(Condition::domain_error(array, BuiltInClass::GeneralArrayStar)),
    }
}

/// `(array-dimensions basic-array)` as a list of integers.
pub fn array_dimensions(ctx: &mut Context, array: &Value) -> EvalResult {
    let dims = dimensions(ctx, array)?;
    let items: Vec<Value> = dims.iter().map(|&d| Value::Integer(d as i64)).collect();
    ctx.make_list(&items)
}

pub fn basic_array_p(ctx: &Context, obj: &Value) -> Value {
    ctx.boolean(instance_of(ctx, BuiltInClass::BasicArray, obj))
}

pub fn basic_array_star_p(ctx: &Context, obj: &Value) -> Value {
    ctx.boolean(instance_of(ctx, BuiltInClass::BasicArrayStar, obj))
}

pub fn general_array_star_p(ctx: &Context, obj: &Value) -> Value {
    ctx.boolean(instance_of(ctx, BuiltInClass::GeneralArrayStar, obj))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(ctx: &mut Context, shape: &[i64]) -> Value {
        let items: Vec<Value> = shape.iter().map(|&d| Value::Integer(d)).collect();
        ctx.make_list(&items).unwrap()
    }

    #[test]
    fn test_handle_space_is_bounded() {
        assert_eq!(next_handle(0, 5), Ok(0));
        assert_eq!(next_handle(u32::MAX as usize, 5), Ok(u32::MAX));
        assert_eq!(
            next_handle(u32::MAX as usize + 1, 5),
            Err(Condition::StorageExhausted { requested: 5 })
        );
    }

    #[test]
    fn test_node_count() {
        assert_eq!(node_count(&[]), Some(1));
        assert_eq!(node_count(&[2, 3]), Some(1 + 2 + 6));
        assert_eq!(node_count(&[2, 0, 5]), Some(3));
        assert_eq!(node_count(&[usize::MAX, 2]), None);
    }

    #[test]
    fn test_shared_subarray_aliases_writes() {
        let mut ctx = Context::new();
        let shape = dims(&mut ctx, &[2, 2]);
        let array = create_array(&mut ctx, &shape, &[Value::Integer(0)]).unwrap();
        let root = match array {
            Value::GeneralArray(root) => root,
            ref other => panic!("expected general array, got {:?}", other),
        };

        // Make row 1 the same node as row 0.
        let row0 = ctx.heap.child(root, 0).unwrap();
        if let Some(Node::Branch(children)) = ctx.heap.get_mut(root) {
            children[1] = row0;
        }

        let idx = [Value::Integer(0), Value::Integer(1)];
        set_aref(&mut ctx, &Value::Integer(5), &array, &idx).unwrap();
        assert_eq!(
            aref(&ctx, &array, &[Value::Integer(1), Value::Integer(1)]),
            Ok(Value::Integer(5))
        );
    }

    #[test]
    fn test_garef_rejects_text() {
        let mut ctx = Context::new();
        let text = ctx.make_string("abc").unwrap();
        assert_eq!(
            garef(&ctx, &text, &[Value::Integer(0)]),
            Err(Condition::domain_error(&text, BuiltInClass::GeneralArrayStar))
        );
    }

    #[test]
    fn test_negative_and_bignum_indices_are_out_of_range() {
        let mut ctx = Context::new();
        let v = ctx.make_vector(vec![Value::Nil; 3]).unwrap();
        assert_eq!(aref(&ctx, &v, &[Value::Integer(-1)]), Err(Condition::IndexOutOfRange));
        let huge = Value::from(num_bigint::BigInt::from(u64::MAX) * 8);
        assert_eq!(aref(&ctx, &v, &[huge]), Err(Condition::IndexOutOfRange));
    }
}
