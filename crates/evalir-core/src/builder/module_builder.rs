use super::{BlockBuilder, IRContext};
use crate::{
    block::BlockId,
    function::{Function, FunctionBody, FunctionSignature, Linkage},
    module::{GlobalVariable, Module, StringConstant},
    types::Type,
    values::{Constant, GlobalId, StringId, Value},
    IrError, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// What `define_global` does when the name already has a storage cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedefinitionPolicy {
    /// Replace the initializer of the existing cell.
    #[default]
    Overwrite,
    Error,
}

pub struct ModuleBuilder {
    module: Module,
    context: IRContext,
    interned: HashMap<String, StringId>,
}

impl ModuleBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            module: Module::new(name),
            context: IRContext::new(),
            interned: HashMap::new(),
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    pub fn context(&self) -> &IRContext {
        &self.context
    }

    /// Register a callable with no body. Redeclaring with the same signature is a no-op.
    pub fn declare_external_function(
        &mut self,
        name: &str,
        params: Vec<Type>,
        returns: Type,
        is_variadic: bool,
    ) -> Result<Value> {
        let signature = FunctionSignature::new(name, params, returns, is_variadic);

        if let Some(existing) = self.module.get_function(name) {
            if existing.signature != signature {
                return Err(IrError::DuplicateDefinition(format!(
                    "@{} is already declared as {}",
                    name,
                    existing.signature.function_type()
                )));
            }
            return Ok(Value::Function(name.to_string()));
        }
        if self.module.has_symbol(name) {
            return Err(IrError::DuplicateDefinition(format!(
                "@{} is already a data symbol",
                name
            )));
        }

        debug!(name, ty = %signature.function_type(), "declare external function");
        self.module
            .functions
            .insert(name.to_string(), Function::declaration(signature));
        Ok(Value::Function(name.to_string()))
    }

    /// Create the storage cell for `name`, or replace its initializer when it already exists.
    pub fn define_global(
        &mut self,
        name: &str,
        initializer: Constant,
        policy: RedefinitionPolicy,
    ) -> Result<GlobalId> {
        let ty = initializer.ty();

        if self.module.functions.contains_key(name) {
            return Err(IrError::DuplicateDefinition(format!(
                "@{} is already a function",
                name
            )));
        }
        if self.module.strings.iter().any(|s| s.name == name) {
            return Err(IrError::DuplicateDefinition(format!(
                "@{} is already a string constant",
                name
            )));
        }

        if let Some(existing) = self.module.globals.get_mut(name) {
            if policy == RedefinitionPolicy::Error {
                return Err(IrError::DuplicateDefinition(format!(
                    "global @{} is already defined",
                    name
                )));
            }
            if existing.ty != ty {
                return Err(IrError::TypeMismatch {
                    expected: format!("{} initializer for @{}", existing.ty, name),
                    found: ty.to_string(),
                });
            }
            debug!(name, %initializer, "overwrite global initializer");
            existing.initializer = initializer;
            return Ok(existing.id);
        }

        let id = GlobalId(self.context.next_global_id());
        debug!(name, %ty, %initializer, "define global");
        self.module.globals.insert(
            name.to_string(),
            GlobalVariable {
                id,
                name: name.to_string(),
                alignment: ty.alignment(),
                ty,
                initializer,
                mutable: true,
            },
        );
        Ok(id)
    }

    /// Materialize `text` as a private read-only constant and return its address.
    pub fn string_constant(&mut self, text: &str, intern: bool) -> Value {
        if intern {
            if let Some(id) = self.interned.get(text) {
                return Value::Constant(Constant::Str(*id));
            }
        }

        let (raw, name) = loop {
            let (raw, name) = self.context.next_string_name();
            if !self.module.has_symbol(&name) {
                break (raw, name);
            }
        };
        let id = StringId(raw);
        self.module.strings.push(StringConstant {
            id,
            name,
            value: text.to_string(),
        });
        if intern {
            self.interned.insert(text.to_string(), id);
        }
        Value::Constant(Constant::Str(id))
    }

    /// Get or create the prototype for `name`, give it a body and move the cursor to its entry block.
    pub fn create_function(&mut self, signature: FunctionSignature) -> Result<BlockId> {
        let name = signature.name.clone();

        if self.module.globals.contains_key(&name)
            || self.module.strings.iter().any(|s| s.name == name)
        {
            return Err(IrError::DuplicateDefinition(format!(
                "@{} is already a data symbol",
                name
            )));
        }

        let function = self
            .module
            .functions
            .entry(name.clone())
            .or_insert_with(|| Function::declaration(signature.clone()));

        if function.signature != signature {
            return Err(IrError::TypeMismatch {
                expected: format!("{} for @{}", function.signature.function_type(), name),
                found: signature.function_type().to_string(),
            });
        }
        if function.body.is_some() {
            return Err(IrError::DuplicateDefinition(format!(
                "@{} already has a body",
                name
            )));
        }

        let body = FunctionBody::new();
        let entry = body.entry_block();
        function.body = Some(body);
        function.linkage = Linkage::Export;

        debug!(name = %name, "create function");
        self.context.set_position(name, entry);
        Ok(entry)
    }

    /// Add a block to the function under the cursor without moving the cursor.
    pub fn create_block(&mut self, name: &str) -> Result<BlockId> {
        let function = self.current_function_name()?;
        let body = self
            .module
            .get_function_mut(&function)
            .and_then(|f| f.body.as_mut())
            .ok_or_else(|| IrError::FunctionNotFound(function.clone()))?;
        Ok(body.create_block(name))
    }

    pub fn position_at_end(&mut self, function: &str, block: BlockId) -> Result<()> {
        let exists = self
            .module
            .get_function(function)
            .and_then(|f| f.body.as_ref())
            .map(|body| body.get_block(block).is_some())
            .unwrap_or(false);
        if !exists {
            return Err(IrError::BuilderError(format!(
                "Block {} does not exist in @{}",
                block, function
            )));
        }
        self.context.set_position(function.to_string(), block);
        Ok(())
    }

    fn current_function_name(&self) -> Result<String> {
        self.context
            .current_function()
            .map(str::to_string)
            .ok_or_else(|| IrError::BuilderError("Cursor not positioned".to_string()))
    }

    pub fn current_function(&self) -> Result<&Function> {
        let name = self.current_function_name()?;
        self.module
            .get_function(&name)
            .ok_or(IrError::FunctionNotFound(name))
    }

    /// Builder for the block under the cursor.
    pub fn block(&mut self) -> Result<BlockBuilder<'_>> {
        let function = self.current_function_name()?;
        let block = self
            .context
            .current_block()
            .ok_or_else(|| IrError::BuilderError("Cursor not positioned".to_string()))?;

        let body = self
            .module
            .get_function_mut(&function)
            .and_then(|f| f.body.as_mut())
            .ok_or_else(|| IrError::FunctionNotFound(function.clone()))?;
        let (block, values) = body.block_and_values(block).ok_or_else(|| {
            IrError::BuilderError(format!("Block {} does not exist in @{}", block, function))
        })?;
        Ok(BlockBuilder::new(block, values))
    }

    pub fn value_type(&self, value: &Value) -> Result<Type> {
        match value {
            Value::Temp(_) => self.module.value_type(self.current_function()?, value),
            Value::Constant(c) => Ok(c.ty()),
            Value::Global(_) | Value::Function(_) => Ok(Type::Ptr),
        }
    }

    pub fn global_type(&self, id: GlobalId) -> Result<Type> {
        self.module
            .global_by_id(id)
            .map(|g| g.ty.clone())
            .ok_or_else(|| IrError::BuilderError(format!("Global {} does not exist", id)))
    }

    /// Read the current contents of a storage cell, typed to its initializer.
    pub fn build_load(&mut self, global: GlobalId) -> Result<Value> {
        let ty = self.global_type(global)?;
        self.block()?.load(global, ty)
    }

    /// Call `callee` with positional `args`, checked against its declared signature.
    pub fn build_call(&mut self, callee: &str, args: Vec<Value>) -> Result<Value> {
        let signature = self
            .module
            .get_function(callee)
            .map(|f| f.signature.clone())
            .ok_or_else(|| IrError::FunctionNotFound(callee.to_string()))?;

        let arg_types = args
            .iter()
            .map(|arg| self.value_type(arg))
            .collect::<Result<Vec<_>>>()?;
        signature.check_call(&arg_types)?;

        self.block()?.call(callee, args, signature.returns)
    }

    pub fn build_return(&mut self, value: Option<Value>) -> Result<()> {
        let expected = self.current_function()?.signature.returns.clone();
        let found = match &value {
            Some(v) => self.value_type(v)?,
            None => Type::Void,
        };
        if expected != found {
            return Err(IrError::TypeMismatch {
                expected: format!("{} return value", expected),
                found: found.to_string(),
            });
        }
        self.block()?.return_value(value)
    }

    /// Every defined function must have all of its blocks terminated.
    pub fn validate(&self) -> Result<()> {
        for function in self.module.defined_functions() {
            if let Some(body) = &function.body {
                if let Some(block) = body.blocks.values().find(|b| !b.is_terminated()) {
                    return Err(IrError::BuilderError(format!(
                        "Block {} in @{} has no terminator",
                        block.name,
                        function.name()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Module> {
        self.validate()?;
        self.context.clear_position();
        Ok(self.module)
    }
}
