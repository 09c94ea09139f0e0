use tracing::{debug, warn};

use crate::frontend::source::Source;
use crate::lang::builtin::Builtin;
use crate::lang::thunk::Thunk;
use crate::lang::value::Value;
use crate::residual::stack_check;
use crate::runtime::Machine;
use crate::runtime::compiler::Compiler;
use crate::runtime::runtime_error::{Result, RuntimeError};

/// Recursive-descent reader for the prefix-parenthesized syntax.
///
/// The reader has no output of its own: every form it recognizes is turned
/// straight into pushes and invocations on the machine it is handed.
///
/// Grammar:
/// - `123`, `-7`: push a number
/// - `name`: look the symbol up
/// - `(let name expr)`: bind and leave the value
/// - `(def name (params...) body...)`: stage a definition
/// - `(builtin args...)`: up to its operand count of arguments, then the
///   built-in
/// - `(name args...)`: arguments, then the quote bound to `name`
pub struct Reader {
    source: Source,
}

impl Reader {
    pub fn new(text: &str) -> Self {
        Reader {
            source: Source::new(text),
        }
    }

    /// Reads one expression into `m`. Returns `false` at end of input or at a
    /// closing paren, without consuming it.
    pub fn accept_expr(&mut self, m: &mut dyn Machine) -> Result<bool> {
        self.source.skip_whitespace();
        match self.source.current() {
            None | Some(')') => return Ok(false),
            Some(c) if c.is_ascii_digit() => {
                let n = self.read_number()?;
                m.push(Value::Number(n))?;
            }
            Some('-') if self.source.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let n = self.read_number()?;
                m.push(Value::Number(n))?;
            }
            Some(c) if is_symbol_start(c) => {
                let name = self.expect_symbol()?;
                m.invoke(&Thunk::Lookup(name))?;
            }
            Some('(') => self.expect_form(m)?,
            Some(c) => {
                return Err(self.source.error(format!("unexpected character '{}'", c)).into());
            }
        }
        Ok(true)
    }

    /// Reads expressions until end of input or `)`, returning how many.
    pub fn accept_exprs(&mut self, m: &mut dyn Machine) -> Result<usize> {
        let mut count = 0;
        while self.accept_expr(m)? {
            count += 1;
        }
        Ok(count)
    }

    fn expect_expr(&mut self, m: &mut dyn Machine) -> Result<()> {
        if self.accept_expr(m)? {
            Ok(())
        } else {
            Err(self.source.error("expected expression").into())
        }
    }

    /// Fails unless only whitespace and comments remain.
    pub fn expect_end(&mut self) -> Result<()> {
        self.source.skip_whitespace();
        match self.source.current() {
            None => Ok(()),
            Some(c) => Err(self
                .source
                .error(format!("unexpected character '{}'", c))
                .into()),
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        self.source.skip_whitespace();
        match self.source.current() {
            Some(c) if c == expected => {
                self.source.advance();
                Ok(())
            }
            Some(c) => Err(self
                .source
                .error(format!("expected '{}', got '{}'", expected, c))
                .into()),
            None => Err(self
                .source
                .error(format!("expected '{}', got end of input", expected))
                .into()),
        }
    }

    fn read_number(&mut self) -> Result<i64> {
        let start = self.source.span();
        let mut text = String::new();
        if self.source.current() == Some('-') {
            text.push('-');
            self.source.advance();
        }
        while let Some(c) = self.source.current() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.source.advance();
        }
        text.parse::<i64>().map_err(|_| {
            self.source
                .error_at(start, format!("number out of range: {}", text))
                .into()
        })
    }

    fn accept_symbol(&mut self) -> Option<String> {
        match self.source.current() {
            Some(c) if is_symbol_start(c) => {}
            _ => return None,
        }
        let mut name = String::new();
        while let Some(c) = self.source.current() {
            if !is_symbol_char(c) {
                break;
            }
            name.push(c);
            self.source.advance();
        }
        Some(name)
    }

    fn expect_symbol(&mut self) -> Result<String> {
        self.source.skip_whitespace();
        match self.accept_symbol() {
            Some(name) => Ok(name),
            None => {
                let found = match self.source.current() {
                    Some(c) => format!("'{}'", c),
                    None => "end of input".to_string(),
                };
                Err(self
                    .source
                    .error(format!("expected symbol, got {}", found))
                    .into())
            }
        }
    }

    /// `( keyword ... )`, dispatched on the leading symbol.
    fn expect_form(&mut self, m: &mut dyn Machine) -> Result<()> {
        self.expect_char('(')?;
        let start = self.source.span();
        let name = self.expect_symbol()?;

        match name.as_str() {
            "let" => {
                let sym = self.expect_symbol()?;
                m.push(Value::Symbol(sym))?;
                self.expect_expr(m)?;
                m.invoke(&Thunk::Builtin(Builtin::Let))?;
            }
            "def" => self.expect_def(m)?,
            _ => match Builtin::from_name(&name) {
                Some(builtin) => {
                    let got = self.accept_exprs(m)?;
                    let (pops, _) = builtin.effect();
                    // Fewer arguments than operands is fine: the rest come
                    // from the stack.
                    if got > pops {
                        return Err(self
                            .source
                            .error_at(
                                start,
                                format!("'{}' takes at most {} arguments, got {}", name, pops, got),
                            )
                            .into());
                    }
                    m.invoke(&Thunk::Builtin(builtin))?;
                }
                None => {
                    self.accept_exprs(m)?;
                    call(m, &name)?;
                }
            },
        }

        self.expect_char(')')
    }

    /// `(def name (params...) body...)`
    ///
    /// Stages the body in a fresh compiler parented to `m`, then binds the
    /// residual program under `name` in `m`.
    fn expect_def(&mut self, m: &mut dyn Machine) -> Result<()> {
        let name = self.expect_symbol()?;
        let params = self.expect_params()?;

        let quote = {
            let mut compiler = Compiler::new(&*m);
            // The caller pushes arguments left to right, so the last
            // parameter is on top.
            for param in params.iter().rev() {
                compiler.bind_param(param)?;
            }
            self.accept_exprs(&mut compiler)?;

            if let Err(e) = stack_check::check_ops_with_initial(compiler.quote(), params.len()) {
                warn!(definition = %name, "{}", e);
            }
            compiler.into_quote()
        };

        debug!(definition = %name, params = params.len(), ops = quote.len(), "staged definition");
        m.bind(&name, Value::Quote(quote));
        m.push(Value::Unit)
    }

    fn expect_params(&mut self) -> Result<Vec<String>> {
        self.expect_char('(')?;
        let mut params = Vec::new();
        loop {
            self.source.skip_whitespace();
            match self.accept_symbol() {
                Some(param) => params.push(param),
                None => break,
            }
        }
        self.expect_char(')')?;
        Ok(params)
    }
}

/// Invoke the quote bound to `name` on `m`.
fn call(m: &mut dyn Machine, name: &str) -> Result<()> {
    match m.lookup(name)? {
        Value::Quote(ops) => m.invoke(&Thunk::Quote(ops)),
        Value::Unknown => Err(RuntimeError::CannotLift(name.to_string())),
        other => Err(RuntimeError::type_mismatch(name, "quote", &other)),
    }
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '?' | '!')
}
