//! Tree-walking interpreter with fuel and deadline preemption.
//!
//! One [`Interp`] is built per execution and discarded afterwards; it owns
//! every mutable piece of the run (scopes, fuel, logs) so nothing leaks
//! between executions. Every statement and expression step charges fuel, and
//! the wall-clock deadline is re-checked at a fixed stride of steps — agent
//! code cannot run except through this dispatch loop, so expiry is
//! preemptive from the agent's point of view: no loop shape can suppress it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::sandbox::capability::CapabilitySet;
use crate::state::GameStateSnapshot;

use super::ast::{AssignTarget, BinOp, Expr, FnDecl, Program, Stmt, UnOp, ENTRY_POINT};
use super::builtins;
use super::error::EvalError;
use super::value::{snapshot_value, Value};

/// Bitmask selecting how often the wall clock is consulted: every 256 steps.
const DEADLINE_CHECK_MASK: u64 = 0xFF;

/// Resource bounds for one execution.
#[derive(Debug, Clone)]
pub struct InterpLimits {
    /// Wall-clock budget for the whole run.
    pub timeout: Duration,
    /// Total statement/expression steps before the run is cut off.
    pub fuel_budget: u64,
    /// Maximum user-function call depth.
    pub max_call_depth: usize,
    /// Maximum lines retained from the `log` builtin.
    pub max_log_lines: usize,
}

impl Default for InterpLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2000),
            fuel_budget: 1_000_000_000,
            max_call_depth: 64,
            max_log_lines: 100,
        }
    }
}

enum Flow {
    Normal,
    Return(Value),
}

/// Single-use interpreter for one agent execution.
pub struct Interp<'a> {
    functions: HashMap<&'a str, &'a FnDecl>,
    granted: &'a CapabilitySet,
    snapshot: &'a GameStateSnapshot,
    scopes: Vec<HashMap<String, Value>>,
    fuel_remaining: u64,
    fuel_budget: u64,
    deadline: Instant,
    limit_ms: u64,
    depth: usize,
    max_call_depth: usize,
    logs: Vec<String>,
    max_log_lines: usize,
}

impl<'a> Interp<'a> {
    pub fn new(
        program: &'a Program,
        snapshot: &'a GameStateSnapshot,
        granted: &'a CapabilitySet,
        limits: &InterpLimits,
    ) -> Self {
        let functions = program
            .functions
            .iter()
            .map(|decl| (decl.name.as_str(), decl))
            .collect();
        Self {
            functions,
            granted,
            snapshot,
            scopes: Vec::new(),
            fuel_remaining: limits.fuel_budget,
            fuel_budget: limits.fuel_budget,
            deadline: Instant::now() + limits.timeout,
            limit_ms: limits.timeout.as_millis() as u64,
            depth: 0,
            max_call_depth: limits.max_call_depth,
            logs: Vec::new(),
            max_log_lines: limits.max_log_lines,
        }
    }

    /// Invoke the entry point with a fresh copy of the snapshot.
    pub fn run(&mut self) -> Result<Value, EvalError> {
        let state = snapshot_value(self.snapshot);
        self.call_function(ENTRY_POINT, vec![state])
    }

    /// Drain the lines the agent logged, in emission order.
    pub fn take_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.logs)
    }

    /// The authoritative snapshot for this execution. Inference builtins read
    /// this, never the agent's copy.
    pub(crate) fn snapshot(&self) -> &GameStateSnapshot {
        self.snapshot
    }

    pub(crate) fn push_log(&mut self, line: String) {
        if self.logs.len() < self.max_log_lines {
            self.logs.push(line);
        }
    }

    fn charge(&mut self) -> Result<(), EvalError> {
        if self.fuel_remaining == 0 {
            return Err(EvalError::FuelExhausted {
                budget: self.fuel_budget,
            });
        }
        self.fuel_remaining -= 1;
        if self.fuel_remaining & DEADLINE_CHECK_MASK == 0 && Instant::now() >= self.deadline {
            return Err(EvalError::DeadlineExceeded {
                limit_ms: self.limit_ms,
            });
        }
        Ok(())
    }

    fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        // User functions shadow builtins of the same name. Copy the &FnDecl
        // out so the map borrow ends before the body runs.
        let user_decl: Option<&'a FnDecl> = self.functions.get(name).copied();
        if let Some(decl) = user_decl {
            if args.len() != decl.params.len() {
                return Err(EvalError::fault(format!(
                    "`{name}` expects {} argument(s), got {}",
                    decl.params.len(),
                    args.len()
                )));
            }
            if self.depth >= self.max_call_depth {
                return Err(EvalError::CallDepthExceeded {
                    limit: self.max_call_depth,
                });
            }
            self.depth += 1;

            let scope: HashMap<String, Value> =
                decl.params.iter().cloned().zip(args).collect();
            // Functions see their own scope only, never the caller's locals.
            let saved = std::mem::replace(&mut self.scopes, vec![scope]);
            let flow = self.exec_stmts(&decl.body);
            self.scopes = saved;

            self.depth -= 1;
            match flow? {
                Flow::Return(value) => Ok(value),
                Flow::Normal => Ok(Value::Unit),
            }
        } else if let Some(builtin) = builtins::lookup(name) {
            if !self.granted.allows(builtin.capability) {
                return Err(EvalError::CapabilityDenied {
                    name: name.to_string(),
                    capability: builtin.capability,
                });
            }
            (builtin.run)(self, args)
        } else {
            Err(EvalError::UnknownFunction {
                name: name.to_string(),
            })
        }
    }

    fn exec_block(&mut self, block: &[Stmt]) -> Result<Flow, EvalError> {
        self.scopes.push(HashMap::new());
        let flow = self.exec_stmts(block);
        self.scopes.pop();
        flow
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow, EvalError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EvalError> {
        self.charge()?;
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.eval(value)?;
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            Stmt::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval_condition(cond)? {
                    self.exec_block(then_block)
                } else if let Some(block) = else_block {
                    self.exec_block(block)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body } => {
                loop {
                    self.charge()?;
                    if !self.eval_condition(cond)? {
                        break;
                    }
                    if let Flow::Return(value) = self.exec_block(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For {
                var,
                iterable,
                body,
            } => {
                let items = match self.eval(iterable)? {
                    Value::List(items) => items,
                    other => {
                        return Err(EvalError::fault(format!(
                            "`for` needs a list to iterate, got {}",
                            other.type_name()
                        )))
                    }
                };
                for item in items {
                    self.charge()?;
                    let mut scope = HashMap::new();
                    scope.insert(var.clone(), item);
                    self.scopes.push(scope);
                    let flow = self.exec_stmts(body);
                    self.scopes.pop();
                    if let Flow::Return(value) = flow? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return { value } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Unit,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn assign(&mut self, target: &AssignTarget, value: Value) -> Result<(), EvalError> {
        match target {
            AssignTarget::Name(name) => {
                for scope in self.scopes.iter_mut().rev() {
                    if let Some(slot) = scope.get_mut(name) {
                        *slot = value;
                        return Ok(());
                    }
                }
                Err(EvalError::fault(format!(
                    "assignment to undeclared variable `{name}`; declare it with `let` first"
                )))
            }
            AssignTarget::Index { name, index } => {
                let index = match self.eval(index)? {
                    Value::Int(i) if i >= 0 => i as usize,
                    Value::Int(i) => {
                        return Err(EvalError::fault(format!("negative list index {i}")))
                    }
                    other => {
                        return Err(EvalError::fault(format!(
                            "list index must be an integer, got {}",
                            other.type_name()
                        )))
                    }
                };
                for scope in self.scopes.iter_mut().rev() {
                    if let Some(slot) = scope.get_mut(name) {
                        return match slot {
                            Value::List(items) => {
                                if index >= items.len() {
                                    return Err(EvalError::fault(format!(
                                        "list index {index} out of bounds (len {})",
                                        items.len()
                                    )));
                                }
                                items[index] = value;
                                Ok(())
                            }
                            other => Err(EvalError::fault(format!(
                                "cannot index-assign into {}",
                                other.type_name()
                            ))),
                        };
                    }
                }
                Err(EvalError::fault(format!("undefined variable `{name}`")))
            }
        }
    }

    fn eval_condition(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::fault(format!(
                "condition must be a boolean, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.charge()?;
        match expr {
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Float(v) => Ok(Value::Float(*v)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Var(name) => {
                for scope in self.scopes.iter().rev() {
                    if let Some(value) = scope.get(name) {
                        return Ok(value.clone());
                    }
                }
                Err(EvalError::fault(format!("undefined variable `{name}`")))
            }
            Expr::Unary { op, expr } => {
                let value = self.eval(expr)?;
                match (op, value) {
                    (UnOp::Neg, Value::Int(v)) => v
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| EvalError::fault("integer overflow")),
                    (UnOp::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
                    (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnOp::Neg, other) => Err(EvalError::fault(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))),
                    (UnOp::Not, other) => Err(EvalError::fault(format!(
                        "`!` needs a boolean, got {}",
                        other.type_name()
                    ))),
                }
            }
            Expr::Binary { op, lhs, rhs } => match op {
                BinOp::And => {
                    if !self.eval_condition(lhs)? {
                        Ok(Value::Bool(false))
                    } else {
                        Ok(Value::Bool(self.eval_condition(rhs)?))
                    }
                }
                BinOp::Or => {
                    if self.eval_condition(lhs)? {
                        Ok(Value::Bool(true))
                    } else {
                        Ok(Value::Bool(self.eval_condition(rhs)?))
                    }
                }
                _ => {
                    let lhs = self.eval(lhs)?;
                    let rhs = self.eval(rhs)?;
                    apply_binary(*op, lhs, rhs)
                }
            },
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                self.call_function(name, values)
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                match (target, index) {
                    (Value::List(items), Value::Int(i)) => {
                        if i < 0 || i as usize >= items.len() {
                            return Err(EvalError::fault(format!(
                                "list index {i} out of bounds (len {})",
                                items.len()
                            )));
                        }
                        Ok(items[i as usize].clone())
                    }
                    (Value::List(_), other) => Err(EvalError::fault(format!(
                        "list index must be an integer, got {}",
                        other.type_name()
                    ))),
                    (other, _) => Err(EvalError::fault(format!(
                        "cannot index a {}",
                        other.type_name()
                    ))),
                }
            }
            Expr::Field { target, name } => match self.eval(target)? {
                Value::Record(fields) => fields.get(name).cloned().ok_or_else(|| {
                    EvalError::fault(format!("record has no field `{name}`"))
                }),
                other => Err(EvalError::fault(format!(
                    "field access on {}, records only",
                    other.type_name()
                ))),
            },
        }
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}

fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    let type_fault = |op: &str, lhs: &Value, rhs: &Value| {
        EvalError::fault(format!(
            "cannot {op} {} and {}",
            lhs.type_name(),
            rhs.type_name()
        ))
    };

    match op {
        BinOp::Add => match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::fault("integer overflow")),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (a, b) => match (as_f64(&a), as_f64(&b)) {
                (Some(x), Some(y)) => Ok(Value::Float(x + y)),
                _ => Err(type_fault("add", &a, &b)),
            },
        },
        BinOp::Sub => match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::fault("integer overflow")),
            (a, b) => match (as_f64(&a), as_f64(&b)) {
                (Some(x), Some(y)) => Ok(Value::Float(x - y)),
                _ => Err(type_fault("subtract", &a, &b)),
            },
        },
        BinOp::Mul => match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::fault("integer overflow")),
            (a, b) => match (as_f64(&a), as_f64(&b)) {
                (Some(x), Some(y)) => Ok(Value::Float(x * y)),
                _ => Err(type_fault("multiply", &a, &b)),
            },
        },
        // Division always yields a float; use floor() to get an index back.
        BinOp::Div => match (as_f64(&lhs), as_f64(&rhs)) {
            (Some(_), Some(y)) if y == 0.0 => Err(EvalError::fault("division by zero")),
            (Some(x), Some(y)) => Ok(Value::Float(x / y)),
            _ => Err(type_fault("divide", &lhs, &rhs)),
        },
        BinOp::Rem => match (lhs, rhs) {
            (Value::Int(_), Value::Int(0)) => Err(EvalError::fault("remainder by zero")),
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_rem(b))),
            (a, b) => Err(type_fault("take remainder of", &a, &b)),
        },
        BinOp::Eq => Ok(Value::Bool(lhs.loose_eq(&rhs))),
        BinOp::Ne => Ok(Value::Bool(!lhs.loose_eq(&rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = match (&lhs, &rhs) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                (a, b) => match (as_f64(a), as_f64(b)) {
                    (Some(x), Some(y)) => x.partial_cmp(&y),
                    _ => None,
                },
            };
            match ordering {
                Some(ordering) => {
                    let result = match op {
                        BinOp::Lt => ordering.is_lt(),
                        BinOp::Le => ordering.is_le(),
                        BinOp::Gt => ordering.is_gt(),
                        _ => ordering.is_ge(),
                    };
                    Ok(Value::Bool(result))
                }
                None => Err(type_fault("compare", &lhs, &rhs)),
            }
        }
        BinOp::And | BinOp::Or => unreachable!("short-circuit ops evaluated in eval()"),
    }
}
