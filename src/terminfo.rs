//! Terminal capability database access.
//!
//! [`lookup`] reads the handful of capabilities the curses renderer needs
//! from the terminfo database, and [`expand`] evaluates a parameterized
//! capability string such as `setaf` for a given color number.
//!
//! ```
//! use cmdcolor::terminfo::expand;
//!
//! let setaf = "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m";
//! assert_eq!(expand(setaf, &[1]).unwrap(), "\x1b[31m");
//! assert_eq!(expand(setaf, &[9]).unwrap(), "\x1b[91m");
//! assert_eq!(expand(setaf, &[196]).unwrap(), "\x1b[38;5;196m");
//! ```

use std::fmt;

use termini::{NumberCapability, StringCapability, TermInfo};

/// Capabilities read from the terminfo database for one terminal type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermCaps {
    /// Terminal type the entry was looked up under.
    pub name: String,
    /// `colors`, or 0 when the entry has none.
    pub colors: i32,
    /// `setaf`: set ANSI foreground.
    pub setaf: Option<String>,
    /// `setab`: set ANSI background.
    pub setab: Option<String>,
    /// `bold`: enter bold mode.
    pub bold: Option<String>,
}

/// The capability database could not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No terminal type was declared (`TERM` unset or empty).
    NoTerminalType,
    /// The database has no usable entry for the terminal type.
    Database { term: String, message: String },
    /// The entry lacks a capability the renderer cannot do without.
    MissingCapability { term: String, capability: &'static str },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTerminalType => write!(f, "No terminal type declared"),
            Self::Database { term, message } => {
                write!(f, "Terminfo lookup for {term:?} failed: {message}")
            }
            Self::MissingCapability { term, capability } => {
                write!(f, "Terminfo entry {term:?} has no {capability} capability")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Look up `term` in the terminfo database.
///
/// # Errors
///
/// Returns [`LookupError::NoTerminalType`] for an empty name and
/// [`LookupError::Database`] when no entry can be loaded.
pub fn lookup(term: &str) -> Result<TermCaps, LookupError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(LookupError::NoTerminalType);
    }

    let info = TermInfo::from_name(term).map_err(|e| LookupError::Database {
        term: term.to_string(),
        message: e.to_string(),
    })?;

    let string_cap = |cap: StringCapability| info.utf8_string_cap(cap).map(|s| s.to_string());

    Ok(TermCaps {
        name: term.to_string(),
        colors: info.number_cap(NumberCapability::MaxColors).unwrap_or(0),
        setaf: string_cap(StringCapability::SetAnsiForeground),
        setab: string_cap(StringCapability::SetAnsiBackground),
        bold: string_cap(StringCapability::EnterBoldMode),
    })
}

/// Error evaluating a parameterized capability string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// An operator needed more operands than the stack held.
    StackUnderflow(char),
    /// Unknown `%` operator.
    UnknownOperator(char),
    /// A `%{...}` or `%'c'` constant was not terminated.
    UnterminatedConstant,
    /// `%P`/`%g` with an invalid variable name.
    InvalidVariable(char),
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackUnderflow(op) => write!(f, "Stack underflow at %{op}"),
            Self::UnknownOperator(op) => write!(f, "Unknown operator %{op}"),
            Self::UnterminatedConstant => write!(f, "Unterminated constant"),
            Self::InvalidVariable(name) => write!(f, "Invalid variable name {name:?}"),
        }
    }
}

impl std::error::Error for ExpandError {}

/// Expand a parameterized capability string with integer parameters.
///
/// Supports the operators terminfo color capabilities use in practice:
/// parameters, constants, arithmetic, comparisons, `%?…%t…%e…%;`
/// conditionals, variables and `%i`. Padding (`$<…>`) is dropped.
///
/// # Errors
///
/// Returns [`ExpandError`] for malformed templates.
pub fn expand(template: &str, params: &[i32]) -> Result<String, ExpandError> {
    Expander::new(template, params).run()
}

struct Expander {
    chars: Vec<char>,
    pos: usize,
    params: [i32; 9],
    stack: Vec<i32>,
    dynamic: [i32; 26],
    fixed: [i32; 26],
    out: String,
}

/// Where a skipped conditional branch ends.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SkipTo {
    /// `%e` or `%;` at the current nesting level.
    ElseOrEnd,
    /// `%;` at the current nesting level.
    End,
}

impl Expander {
    fn new(template: &str, params: &[i32]) -> Self {
        let mut fixed_params = [0; 9];
        for (slot, value) in fixed_params.iter_mut().zip(params) {
            *slot = *value;
        }
        Self {
            chars: template.chars().collect(),
            pos: 0,
            params: fixed_params,
            stack: Vec::new(),
            dynamic: [0; 26],
            fixed: [0; 26],
            out: String::new(),
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        self.pos += 1;
        c
    }

    fn pop(&mut self, op: char) -> Result<i32, ExpandError> {
        self.stack.pop().ok_or(ExpandError::StackUnderflow(op))
    }

    fn run(mut self) -> Result<String, ExpandError> {
        while let Some(c) = self.next() {
            match c {
                '%' => self.operator()?,
                '$' if self.chars.get(self.pos) == Some(&'<') => self.skip_padding(),
                _ => self.out.push(c),
            }
        }
        Ok(self.out)
    }

    fn skip_padding(&mut self) {
        while let Some(c) = self.next() {
            if c == '>' {
                break;
            }
        }
    }

    fn operator(&mut self) -> Result<(), ExpandError> {
        let Some(op) = self.next() else {
            return Ok(());
        };
        match op {
            '%' => self.out.push('%'),
            'c' => {
                let value = self.pop(op)?;
                if let Some(ch) = u32::try_from(value).ok().and_then(char::from_u32) {
                    self.out.push(ch);
                }
            }
            'd' | 'o' | 'x' | 'X' | 's' | ':' | '0'..='9' | '.' => self.format(op)?,
            'p' => {
                let index = self.next().and_then(|d| d.to_digit(10)).unwrap_or(0);
                let value = match index {
                    1..=9 => self.params[index as usize - 1],
                    _ => return Err(ExpandError::UnknownOperator('p')),
                };
                self.stack.push(value);
            }
            'P' | 'g' => self.variable(op)?,
            '\'' => {
                let ch = self.next().ok_or(ExpandError::UnterminatedConstant)?;
                if self.next() != Some('\'') {
                    return Err(ExpandError::UnterminatedConstant);
                }
                self.stack.push(ch as i32);
            }
            '{' => {
                let mut value: i32 = 0;
                loop {
                    match self.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => {
                            value = value.saturating_mul(10).saturating_add(d as i32 - '0' as i32);
                        }
                        _ => return Err(ExpandError::UnterminatedConstant),
                    }
                }
                self.stack.push(value);
            }
            'l' => {
                // Strings never reach the stack, so length is that of the number.
                let value = self.pop(op)?;
                let len = i32::try_from(value.to_string().len()).unwrap_or(i32::MAX);
                self.stack.push(len);
            }
            '+' | '-' | '*' | '/' | 'm' | '&' | '|' | '^' | '=' | '<' | '>' | 'A' | 'O' => {
                let rhs = self.pop(op)?;
                let lhs = self.pop(op)?;
                self.stack.push(binary(op, lhs, rhs));
            }
            '!' => {
                let value = self.pop(op)?;
                self.stack.push(i32::from(value == 0));
            }
            '~' => {
                let value = self.pop(op)?;
                self.stack.push(!value);
            }
            'i' => {
                self.params[0] += 1;
                self.params[1] += 1;
            }
            '?' | ';' => {}
            't' => {
                if self.pop(op)? == 0 {
                    self.skip(SkipTo::ElseOrEnd);
                }
            }
            'e' => self.skip(SkipTo::End),
            other => return Err(ExpandError::UnknownOperator(other)),
        }
        Ok(())
    }

    fn variable(&mut self, op: char) -> Result<(), ExpandError> {
        let name = self.next().ok_or(ExpandError::InvalidVariable(' '))?;
        let slot = match name {
            'a'..='z' => &mut self.dynamic[name as usize - 'a' as usize],
            'A'..='Z' => &mut self.fixed[name as usize - 'A' as usize],
            other => return Err(ExpandError::InvalidVariable(other)),
        };
        if op == 'P' {
            let value = self.stack.pop().ok_or(ExpandError::StackUnderflow(op))?;
            *slot = value;
        } else {
            let value = *slot;
            self.stack.push(value);
        }
        Ok(())
    }

    /// `%[[:]flags][width[.precision]][doxXs]`
    fn format(&mut self, first: char) -> Result<(), ExpandError> {
        let mut spec = String::new();
        let mut c = first;
        if c == ':' {
            c = self.next().ok_or(ExpandError::UnknownOperator(':'))?;
        }
        while !matches!(c, 'd' | 'o' | 'x' | 'X' | 's') {
            spec.push(c);
            c = self.next().ok_or(ExpandError::UnknownOperator(first))?;
        }

        let value = self.pop(c)?;
        let body = match c {
            'o' => format!("{value:o}"),
            'x' => format!("{value:x}"),
            'X' => format!("{value:X}"),
            _ => value.to_string(),
        };

        let left = spec.contains('-');
        let zero = spec.trim_start_matches(['-', '+', '#', ' ']).starts_with('0');
        let width: usize = spec
            .trim_start_matches(['-', '+', '#', ' ', '0'])
            .split('.')
            .next()
            .and_then(|w| w.parse().ok())
            .unwrap_or(0);

        let padded = if left {
            format!("{body:<width$}")
        } else if zero {
            format!("{body:0>width$}")
        } else {
            format!("{body:>width$}")
        };
        self.out.push_str(&padded);
        Ok(())
    }

    fn skip(&mut self, target: SkipTo) {
        let mut depth = 0usize;
        while let Some(c) = self.next() {
            if c != '%' {
                continue;
            }
            match self.next() {
                Some('?') => depth += 1,
                Some(';') if depth == 0 => return,
                Some(';') => depth -= 1,
                Some('e') if depth == 0 && target == SkipTo::ElseOrEnd => return,
                _ => {}
            }
        }
    }
}

fn binary(op: char, lhs: i32, rhs: i32) -> i32 {
    match op {
        '+' => lhs.wrapping_add(rhs),
        '-' => lhs.wrapping_sub(rhs),
        '*' => lhs.wrapping_mul(rhs),
        '/' => lhs.checked_div(rhs).unwrap_or(0),
        'm' => lhs.checked_rem(rhs).unwrap_or(0),
        '&' => lhs & rhs,
        '|' => lhs | rhs,
        '^' => lhs ^ rhs,
        '=' => i32::from(lhs == rhs),
        '<' => i32::from(lhs < rhs),
        '>' => i32::from(lhs > rhs),
        'A' => i32::from(lhs != 0 && rhs != 0),
        'O' => i32::from(lhs != 0 || rhs != 0),
        _ => 0,
    }
}
