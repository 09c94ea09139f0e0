use std::collections::HashMap;

use tracing::trace;

use crate::lang::thunk::Thunk;
use crate::lang::value::Value;
use crate::runtime::Machine;
use crate::runtime::runtime_error::{Result, RuntimeError};

#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub max_stack_size: usize,
    pub max_steps: Option<usize>,
    /// Maximum nesting of quotes running inside quotes.
    pub max_call_depth: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            max_stack_size: 10_000,
            max_steps: None,
            max_call_depth: 1000,
        }
    }
}

/// The concrete machine: executes thunks immediately and authoritatively.
///
/// The symbol table is flat and last-write-wins. A running quote gets a
/// scope frame holding the previous value of every name it binds; the frame
/// is unwound when the quote exits, so parameters and locals of a callee
/// never leak into its caller.
#[derive(Debug)]
pub struct Interpreter {
    stack: Vec<Value>,
    symbols: HashMap<String, Value>,
    // One frame per running quote: name -> binding before the quote wrote it
    scopes: Vec<HashMap<String, Option<Value>>>,
    // Lines written by `print`, drained by the top-level loop
    output: Vec<String>,
    config: MachineConfig,
    call_depth: usize,
    steps: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Interpreter {
            stack: Vec::new(),
            symbols: HashMap::new(),
            scopes: Vec::new(),
            output: Vec::new(),
            config,
            call_depth: 0,
            steps: 0,
        }
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn symbols(&self) -> &HashMap<String, Value> {
        &self.symbols
    }

    /// Remove and return every value above `height`, bottom first.
    pub fn take_above(&mut self, height: usize) -> Vec<Value> {
        if height >= self.stack.len() {
            return Vec::new();
        }
        self.stack.split_off(height)
    }

    /// Take every line emitted since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Invoke each thunk in order, stopping at the first failure.
    pub fn execute(&mut self, thunks: &[Thunk]) -> Result<()> {
        for thunk in thunks {
            self.invoke(thunk)?;
        }
        Ok(())
    }

    fn check_limits(&mut self) -> Result<()> {
        self.steps += 1;
        if let Some(max) = self.config.max_steps {
            if self.steps > max {
                return Err(RuntimeError::StepLimit(max));
            }
        }
        Ok(())
    }

    fn run_quote(&mut self, ops: &[Thunk]) -> Result<()> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::CallDepthLimit(self.config.max_call_depth));
        }
        self.call_depth += 1;
        self.scopes.push(HashMap::new());
        let result = self.execute(ops);
        self.unwind_scope();
        self.call_depth -= 1;
        result
    }

    fn unwind_scope(&mut self) {
        let Some(frame) = self.scopes.pop() else {
            return;
        };
        for (name, previous) in frame {
            match previous {
                Some(value) => self.symbols.insert(name, value),
                None => self.symbols.remove(&name),
            };
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for Interpreter {
    fn push(&mut self, value: Value) -> Result<()> {
        if self.stack.len() >= self.config.max_stack_size {
            return Err(RuntimeError::StackLimit(self.config.max_stack_size));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    fn bind(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.scopes.last_mut() {
            if !frame.contains_key(name) {
                frame.insert(name.to_string(), self.symbols.get(name).cloned());
            }
        }
        self.symbols.insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        self.symbols
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnboundSymbol(name.to_string()))
    }

    fn invoke(&mut self, thunk: &Thunk) -> Result<()> {
        self.check_limits()?;
        trace!(op = %thunk.describe(), depth = self.stack.len(), "interpret");

        match thunk {
            Thunk::Push(value) => self.push(value.clone()),
            Thunk::Lookup(name) => {
                let value = self.lookup(name)?;
                self.push(value)
            }
            Thunk::Builtin(builtin) => builtin.apply(self),
            Thunk::Quote(ops) => self.run_quote(ops),
        }
    }

    fn emit(&mut self, line: String) -> Result<()> {
        self.output.push(line);
        Ok(())
    }
}
