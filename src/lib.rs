// ISLISP runtime core
// Value and class model, the basic-array family, byte streams, symbol
// properties and the condition catalogue. Reader, evaluator and printer
// live outside this crate and call in through `primitives`.

pub mod types;
pub mod fastmap;
pub mod config;
pub mod arena;
pub mod symbol;
pub mod ilos;
pub mod conditions;
pub mod arrays;
pub mod streams;
pub mod binary;
pub mod properties;
pub mod context;
pub mod primitives;

pub use conditions::{Condition, EvalResult};
pub use config::RuntimeConfig;
pub use context::Context;
pub use types::Value;
