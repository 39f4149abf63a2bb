use super::errors::LoweringError;
use evalir_core::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One lexical scope. Child scopes share their parent through `Rc`.
#[derive(Debug, Default)]
pub struct Environment {
    record: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new_root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn child(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Self {
            record: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Bind `name` in this scope only. A later definition of the same name replaces the earlier one.
    pub fn define(&self, name: &str, value: Value) -> Value {
        self.record
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        value
    }

    /// Resolve `name`, innermost scope first.
    pub fn lookup(&self, name: &str) -> Result<Value, LoweringError> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(value) = env.record.borrow().get(name) {
                return Ok(value.clone());
            }
            scope = env.parent.as_deref();
        }
        Err(LoweringError::UnboundVariable {
            name: name.to_string(),
            span: None,
        })
    }

    pub fn defines_locally(&self, name: &str) -> bool {
        self.record.borrow().contains_key(name)
    }

    /// Number of ancestors above this scope.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self.parent.as_deref();
        while let Some(env) = scope {
            depth += 1;
            scope = env.parent.as_deref();
        }
        depth
    }
}
