//! Syntax tree for the agent language.

use super::error::LoadError;
use super::parser;

/// Name of the required agent entry point.
pub const ENTRY_POINT: &str = "make_guess";

/// A parsed, load-checked agent program: a flat list of function
/// declarations, one of which is [`ENTRY_POINT`].
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: Vec<FnDecl>,
}

impl Program {
    /// Parse source text and verify its structure: no duplicate function
    /// names, and a `make_guess` entry point taking exactly one parameter.
    pub fn load(source: &str) -> Result<Self, LoadError> {
        let program = parser::parse_program(source)?;

        for (i, decl) in program.functions.iter().enumerate() {
            if program.functions[..i].iter().any(|d| d.name == decl.name) {
                return Err(LoadError::DuplicateFunction {
                    name: decl.name.clone(),
                });
            }
        }

        match program.functions.iter().find(|d| d.name == ENTRY_POINT) {
            None => return Err(LoadError::MissingEntryPoint),
            Some(entry) if entry.params.len() != 1 => {
                return Err(LoadError::EntryPointArity {
                    found: entry.params.len(),
                });
            }
            Some(_) => {}
        }

        Ok(program)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: String,
        value: Expr,
    },
    Assign {
        target: AssignTarget,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Return {
        value: Option<Expr>,
    },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `x = …`
    Name(String),
    /// `x[i] = …`
    Index { name: String, index: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Expr>),
    Var(String),
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        target: Box<Expr>,
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_requires_entry_point() {
        let err = Program::load("fn helper(x) { return x; }").unwrap_err();
        assert_eq!(err, LoadError::MissingEntryPoint);
    }

    #[test]
    fn test_load_checks_entry_arity() {
        let err = Program::load("fn make_guess(a, b) { return []; }").unwrap_err();
        assert_eq!(err, LoadError::EntryPointArity { found: 2 });
    }

    #[test]
    fn test_load_rejects_duplicate_functions() {
        let source = "fn make_guess(s) { return []; } fn make_guess(s) { return []; }";
        match Program::load(source).unwrap_err() {
            LoadError::DuplicateFunction { name } => assert_eq!(name, "make_guess"),
            other => panic!("expected DuplicateFunction, got {other:?}"),
        }
    }

    #[test]
    fn test_load_accepts_helpers() {
        let source = "fn pick(xs) { return xs[0]; } fn make_guess(state) { return [pick([0])]; }";
        let program = Program::load(source).unwrap();
        assert_eq!(program.functions.len(), 2);
    }
}
