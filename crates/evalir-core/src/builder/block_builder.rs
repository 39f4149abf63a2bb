use crate::{
    block::{BasicBlock, BlockId, Terminator},
    function::ValueTable,
    instructions::Instruction,
    types::Type,
    values::{GlobalId, Value},
    IrError, Result,
};
use tracing::trace;

/// Appends instructions to the end of one block.
///
/// Operand types are checked by [`super::ModuleBuilder`] before anything reaches this type.
pub struct BlockBuilder<'a> {
    block: &'a mut BasicBlock,
    values: &'a mut ValueTable,
}

impl<'a> BlockBuilder<'a> {
    pub(crate) fn new(block: &'a mut BasicBlock, values: &'a mut ValueTable) -> Self {
        Self { block, values }
    }

    pub fn block_id(&self) -> BlockId {
        self.block.id
    }

    pub fn is_terminated(&self) -> bool {
        self.block.is_terminated()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.block.is_terminated() {
            return Err(IrError::BuilderError(format!(
                "Block {} is already terminated",
                self.block.name
            )));
        }
        Ok(())
    }

    fn push_instruction(&mut self, inst: Instruction) {
        trace!(block = %self.block.name, ?inst, "append");
        self.block.add_instruction(inst);
    }

    pub fn load(&mut self, global: GlobalId, ty: Type) -> Result<Value> {
        self.ensure_open()?;
        let result = self.values.fresh(ty.clone());
        self.push_instruction(Instruction::Load {
            result: result.clone(),
            ty,
            global,
        });
        Ok(result)
    }

    pub fn call(&mut self, callee: &str, args: Vec<Value>, ty: Type) -> Result<Value> {
        self.ensure_open()?;
        let result = self.values.fresh(ty.clone());
        self.push_instruction(Instruction::Call {
            result: result.clone(),
            callee: callee.to_string(),
            args,
            ty,
        });
        Ok(result)
    }

    pub fn return_value(&mut self, value: Option<Value>) -> Result<()> {
        self.ensure_open()?;
        self.block.set_terminator(Terminator::Return(value));
        Ok(())
    }
}
