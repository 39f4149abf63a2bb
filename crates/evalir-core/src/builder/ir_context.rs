use crate::block::BlockId;

/// Where the next instruction goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorPosition {
    None,
    BlockEnd { function: String, block: BlockId },
}

/// The mutable construction state of one module build: the insertion cursor plus name counters.
#[derive(Debug)]
pub struct IRContext {
    position: CursorPosition,
    next_string: u32,
    next_global: u32,
}

impl IRContext {
    pub fn new() -> Self {
        Self {
            position: CursorPosition::None,
            next_string: 0,
            next_global: 0,
        }
    }

    pub fn set_position(&mut self, function: String, block: BlockId) {
        self.position = CursorPosition::BlockEnd { function, block };
    }

    pub fn position(&self) -> &CursorPosition {
        &self.position
    }

    pub fn current_function(&self) -> Option<&str> {
        match &self.position {
            CursorPosition::BlockEnd { function, .. } => Some(function),
            CursorPosition::None => None,
        }
    }

    pub fn current_block(&self) -> Option<BlockId> {
        match &self.position {
            CursorPosition::BlockEnd { block, .. } => Some(*block),
            CursorPosition::None => None,
        }
    }

    pub fn clear_position(&mut self) {
        self.position = CursorPosition::None;
    }

    /// `.str`, `.str.1`, `.str.2`, ...
    pub fn next_string_name(&mut self) -> (u32, String) {
        let id = self.next_string;
        self.next_string += 1;
        let name = if id == 0 {
            ".str".to_string()
        } else {
            format!(".str.{}", id)
        };
        (id, name)
    }

    pub fn next_global_id(&mut self) -> u32 {
        let id = self.next_global;
        self.next_global += 1;
        id
    }
}

impl Default for IRContext {
    fn default() -> Self {
        Self::new()
    }
}
