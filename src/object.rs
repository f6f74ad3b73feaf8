use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a live object in the inspected page's graph. Cloning copies the
/// handle; identity is pointer identity.
pub type ObjectRef = Rc<RefCell<ObjectData>>;

/// Shared handle to a live array. Element lists mutate between polls, so readers
/// never assume a stable length.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Callable attached to an object. Receives the owning object and the call
/// arguments; returns `Value::Null` when it has nothing to say.
pub type Method = Rc<dyn Fn(&ObjectRef, &[Value]) -> Value>;

/// A value observed in the inspected graph. The set is closed: anything the
/// inspector cannot classify stays opaque behind `Object`.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(ArrayRef),
    Object(ObjectRef),
    Bytes(Rc<[u8]>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn bytes(data: impl Into<Rc<[u8]>>) -> Self {
        Value::Bytes(data.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(data) => Some(data),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Bytes(a), Value::Bytes(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Graphs carry parent/owner back-references; never recurse into them.
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(items) => write!(f, "[array; {}]", items.borrow().len()),
            Value::Object(obj) => match obj.borrow().class_name() {
                Some(class) => write!(f, "[object {class}]"),
                None => write!(f, "[object]"),
            },
            Value::Bytes(data) => write!(f, "[bytes; {}]", data.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

/// One live object: an ordered field map, an optional class name and a method
/// table. Methods are deliberately kept out of the field map so the enumerable
/// key list only ever yields data.
#[derive(Default)]
pub struct ObjectData {
    class_name: Option<String>,
    fields: IndexMap<String, Value>,
    methods: HashMap<String, Method>,
}

impl ObjectData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(name: impl Into<String>) -> Self {
        Self { class_name: Some(name.into()), ..Self::default() }
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.fields.get(key).cloned()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Enumerable keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn define_method(&mut self, name: impl Into<String>, method: impl Fn(&ObjectRef, &[Value]) -> Value + 'static) {
        self.methods.insert(name.into(), Rc::new(method));
    }

    pub fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

pub fn new_object() -> ObjectRef {
    Rc::new(RefCell::new(ObjectData::new()))
}

pub fn object_with_class(name: impl Into<String>) -> ObjectRef {
    Rc::new(RefCell::new(ObjectData::with_class(name)))
}

pub fn field(obj: &ObjectRef, key: &str) -> Option<Value> {
    obj.borrow().get(key)
}

pub fn field_object(obj: &ObjectRef, key: &str) -> Option<ObjectRef> {
    match obj.borrow().get(key) {
        Some(Value::Object(inner)) => Some(inner),
        _ => None,
    }
}

pub fn field_array(obj: &ObjectRef, key: &str) -> Option<ArrayRef> {
    match obj.borrow().get(key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

pub fn field_f64(obj: &ObjectRef, key: &str) -> Option<f64> {
    obj.borrow().get(key).and_then(|v| v.as_f64())
}

pub fn field_str(obj: &ObjectRef, key: &str) -> Option<String> {
    match obj.borrow().get(key) {
        Some(Value::Str(s)) => Some(s),
        _ => None,
    }
}

pub fn field_bool(obj: &ObjectRef, key: &str) -> Option<bool> {
    obj.borrow().get(key).and_then(|v| v.as_bool())
}

pub fn set_field(obj: &ObjectRef, key: impl Into<String>, value: impl Into<Value>) {
    obj.borrow_mut().set(key, value);
}

pub fn class_of(obj: &ObjectRef) -> Option<String> {
    obj.borrow().class_name().map(str::to_string)
}

/// Calls a method if the object defines one. The method handle is cloned out
/// before invocation so the callee may re-borrow its owner.
pub fn call_method(obj: &ObjectRef, name: &str, args: &[Value]) -> Option<Value> {
    let method = obj.borrow().method(name)?;
    Some(method(obj, args))
}

/// Walks nested object fields. Returns the value at the end of the path, or
/// `None` the moment any hop is missing or not an object.
pub fn walk_path(obj: &ObjectRef, path: &[&str]) -> Option<Value> {
    let (last, rest) = path.split_last()?;
    let mut current = obj.clone();
    for hop in rest {
        current = field_object(&current, hop)?;
    }
    field(&current, last)
}
