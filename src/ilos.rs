// ILOS - the ISLISP Object System class model
//
// Built-in classes are a closed enumeration with static direct superclasses;
// user-defined classes live in the registry. Every class carries its full
// ancestor set, so `instance_of` is a membership test and multiple
// inheritance needs no linearization.

use crate::conditions::Condition;
use crate::context::Context;
use crate::fastmap::HashSet;
use crate::symbol::SymbolId;
use crate::types::Value;
use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a user-defined class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// Handle to an instance of a user-defined class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInClass {
    Object,
    BasicArray,
    BasicArrayStar,
    GeneralArrayStar,
    BasicVector,
    GeneralVector,
    String,
    Class,
    BuiltInClass,
    StandardClass,
    Character,
    Function,
    GenericFunction,
    StandardGenericFunction,
    List,
    Cons,
    Null,
    Symbol,
    Number,
    Integer,
    Float,
    SeriousCondition,
    Error,
    ArithmeticError,
    DivisionByZero,
    FloatingPointOverflow,
    FloatingPointUnderflow,
    ControlError,
    ParseError,
    ProgramError,
    DomainError,
    ArityError,
    IndexOutOfRange,
    UndefinedEntity,
    UnboundVariable,
    UndefinedFunction,
    SimpleError,
    StreamError,
    EndOfStream,
    StorageExhausted,
    StandardObject,
    Stream,
}

impl BuiltInClass {
    pub const ALL: [BuiltInClass; 42] = {
        use self::BuiltInClass::*;
        [
            Object, BasicArray, BasicArrayStar, GeneralArrayStar, BasicVector,
            GeneralVector, String, Class, BuiltInClass, StandardClass, Character,
            Function, GenericFunction, StandardGenericFunction, List, Cons, Null,
            Symbol, Number, Integer, Float, SeriousCondition, Error,
            ArithmeticError, DivisionByZero, FloatingPointOverflow,
            FloatingPointUnderflow, ControlError, ParseError, ProgramError,
            DomainError, ArityError, IndexOutOfRange, UndefinedEntity,
            UnboundVariable, UndefinedFunction, SimpleError, StreamError,
            EndOfStream, StorageExhausted, StandardObject, Stream,
        ]
    };

    /// Direct superclasses.
    pub fn supers(self) -> &'static [BuiltInClass] {
        use self::BuiltInClass::*;
        match self {
            Object => &[],
            BasicArray => &[Object],
            BasicArrayStar => &[BasicArray],
            GeneralArrayStar => &[BasicArrayStar],
            BasicVector => &[BasicArray],
            GeneralVector => &[BasicVector],
            String => &[BasicVector, BasicArrayStar],
            Class => &[Object],
            BuiltInClass => &[Class],
            StandardClass => &[Class],
            Character => &[Object],
            Function => &[Object],
            GenericFunction => &[Function],
            StandardGenericFunction => &[GenericFunction],
            List => &[Object],
            Cons => &[List],
            Null => &[Symbol, List],
            Symbol => &[Object],
            Number => &[Object],
            Integer => &[Number],
            Float => &[Number],
            SeriousCondition => &[Object],
            Error => &[SeriousCondition],
            ArithmeticError => &[Error],
            DivisionByZero => &[ArithmeticError],
            FloatingPointOverflow => &[ArithmeticError],
            FloatingPointUnderflow => &[ArithmeticError],
            ControlError => &[Error],
            ParseError => &[Error],
            ProgramError => &[Error],
            DomainError => &[ProgramError],
            ArityError => &[ProgramError],
            IndexOutOfRange => &[ProgramError],
            UndefinedEntity => &[ProgramError],
            UnboundVariable => &[UndefinedEntity],
            UndefinedFunction => &[UndefinedEntity],
            SimpleError => &[Error],
            StreamError => &[Error],
            EndOfStream => &[StreamError],
            StorageExhausted => &[SeriousCondition],
            StandardObject => &[Object],
            Stream => &[Object],
        }
    }

    pub fn name(self) -> &'static str {
        use self::BuiltInClass::*;
        match self {
            Object => "<object>",
            BasicArray => "<basic-array>",
            BasicArrayStar => "<basic-array*>",
            GeneralArrayStar => "<general-array*>",
            BasicVector => "<basic-vector>",
            GeneralVector => "<general-vector>",
            String => "<string>",
            Class => "<class>",
            BuiltInClass => "<built-in-class>",
            StandardClass => "<standard-class>",
            Character => "<character>",
            Function => "<function>",
            GenericFunction => "<generic-function>",
            StandardGenericFunction => "<standard-generic-function>",
            List => "<list>",
            Cons => "<cons>",
            Null => "<null>",
            Symbol => "<symbol>",
            Number => "<number>",
            Integer => "<integer>",
            Float => "<float>",
            SeriousCondition => "<serious-condition>",
            Error => "<error>",
            ArithmeticError => "<arithmetic-error>",
            DivisionByZero => "<division-by-zero>",
            FloatingPointOverflow => "<floating-point-overflow>",
            FloatingPointUnderflow => "<floating-point-underflow>",
            ControlError => "<control-error>",
            ParseError => "<parse-error>",
            ProgramError => "<program-error>",
            DomainError => "<domain-error>",
            ArityError => "<arity-error>",
            IndexOutOfRange => "<index-out-of-range>",
            UndefinedEntity => "<undefined-entity>",
            UnboundVariable => "<unbound-variable>",
            UndefinedFunction => "<undefined-function>",
            SimpleError => "<simple-error>",
            StreamError => "<stream-error>",
            EndOfStream => "<end-of-stream>",
            StorageExhausted => "<storage-exhausted>",
            StandardObject => "<standard-object>",
            Stream => "<stream>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    BuiltIn(BuiltInClass),
    Standard(ClassId),
}

impl From<BuiltInClass> for Class {
    fn from(class: BuiltInClass) -> Self {
        Class::BuiltIn(class)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::BuiltIn(b) => f.write_str(b.name()),
            Class::Standard(id) => write!(f, "#<standard-class {}>", id.0),
        }
    }
}

type Ancestors = SmallVec<[Class; 8]>;

/// A user-defined class descriptor
#[derive(Debug, Clone)]
pub struct StandardClassDef {
    pub name: SymbolId,
    pub supers: Vec<Class>,
    /// Every class this one is a subclass of, itself included
    ancestors: HashSet<Class>,
}

/// The class registry: precomputed built-in ancestry plus runtime-defined
/// classes and their instances.
pub struct ClassRegistry {
    builtin_ancestors: Vec<Ancestors>,
    classes: Vec<StandardClassDef>,
    instances: Vec<ClassId>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        let builtin_ancestors = BuiltInClass::ALL
            .iter()
            .map(|&class| {
                let mut acc = Ancestors::new();
                collect_builtin_ancestors(class, &mut acc);
                acc
            })
            .collect();
        Self {
            builtin_ancestors,
            classes: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Register a user-defined class. Standard classes always inherit
    /// `<standard-object>`.
    pub fn define_class(&mut self, name: SymbolId, supers: Vec<Class>) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        let mut ancestors = HashSet::default();
        ancestors.insert(Class::Standard(id));
        ancestors.insert(Class::BuiltIn(BuiltInClass::StandardObject));
        ancestors.insert(Class::BuiltIn(BuiltInClass::Object));
        for &sup in &supers {
            match sup {
                Class::BuiltIn(b) => ancestors.extend(self.builtin_ancestors(b).iter().copied()),
                Class::Standard(sid) => {
                    if let Some(def) = self.classes.get(sid.0 as usize) {
                        ancestors.extend(def.ancestors.iter().copied());
                    }
                }
            }
        }
        self.classes.push(StandardClassDef {
            name,
            supers,
            ancestors,
        });
        id
    }

    pub fn get_class(&self, id: ClassId) -> Option<&StandardClassDef> {
        self.classes.get(id.0 as usize)
    }

    pub fn make_instance(&mut self, class: ClassId) -> Value {
        let id = InstanceId(self.instances.len() as u32);
        self.instances.push(class);
        Value::Instance(id)
    }

    fn builtin_ancestors(&self, class: BuiltInClass) -> &[Class] {
        &self.builtin_ancestors[class as usize]
    }

    /// Most specific class of a value. Total.
    pub fn class_of(&self, value: &Value) -> Class {
        let builtin = match value {
            Value::Nil => BuiltInClass::Null,
            Value::Integer(_) | Value::BigInt(_) => BuiltInClass::Integer,
            Value::Float(_) => BuiltInClass::Float,
            Value::Character(_) => BuiltInClass::Character,
            Value::Symbol(_) => BuiltInClass::Symbol,
            Value::String(_) => BuiltInClass::String,
            Value::GeneralVector(_) => BuiltInClass::GeneralVector,
            Value::GeneralArray(_) => BuiltInClass::GeneralArrayStar,
            Value::Cons(_) => BuiltInClass::Cons,
            Value::Stream(_) => BuiltInClass::Stream,
            Value::Class(Class::BuiltIn(_)) => BuiltInClass::BuiltInClass,
            Value::Class(Class::Standard(_)) => BuiltInClass::StandardClass,
            Value::Instance(id) => {
                return match self.instances.get(id.0 as usize) {
                    Some(&class) => Class::Standard(class),
                    None => Class::BuiltIn(BuiltInClass::StandardObject),
                }
            }
        };
        Class::BuiltIn(builtin)
    }

    /// True if `sub` is `sup` or inherits from it through any path.
    pub fn subclassp(&self, sub: Class, sup: Class) -> bool {
        match sub {
            Class::BuiltIn(b) => self.builtin_ancestors(b).contains(&sup),
            Class::Standard(id) => self
                .classes
                .get(id.0 as usize)
                .is_some_and(|def| def.ancestors.contains(&sup)),
        }
    }

    pub fn instance_of(&self, class: Class, value: &Value) -> bool {
        self.subclassp(self.class_of(value), class)
    }

    /// Check each value against `expected`, reporting the first failure.
    pub fn ensure<'a, I>(&self, expected: Class, values: I) -> Result<(), Condition>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for value in values {
            if !self.instance_of(expected, value) {
                return Err(Condition::DomainError {
                    object: value.clone(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

fn collect_builtin_ancestors(class: BuiltInClass, acc: &mut Ancestors) {
    let class_ref = Class::BuiltIn(class);
    if acc.contains(&class_ref) {
        return;
    }
    acc.push(class_ref);
    for &sup in class.supers() {
        collect_builtin_ancestors(sup, acc);
    }
}

pub fn class_of(ctx: &Context, value: &Value) -> Class {
    ctx.classes.class_of(value)
}

pub fn instance_of(ctx: &Context, class: impl Into<Class>, value: &Value) -> bool {
    ctx.classes.instance_of(class.into(), value)
}

pub fn subclassp(ctx: &Context, sub: impl Into<Class>, sup: impl Into<Class>) -> bool {
    ctx.classes.subclassp(sub.into(), sup.into())
}

/// The type-check gate every operation applies before touching data.
pub fn ensure(ctx: &Context, expected: impl Into<Class>, values: &[Value]) -> Result<(), Condition> {
    ctx.classes.ensure(expected.into(), values)
}
