// ABOUTME: Tree-walking interpreter: scope/call-stack management, expression evaluation, dispatch

use crate::ast::*;
use crate::config::ENTRY_FUNCTION_NAME;
use crate::env::{Scope, ScopeRef};
use crate::error::SemanticError;
use crate::token::Position;
use crate::value::{FunctionValue, Value};
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

/// Runs `program`'s `Main` entry point, writing the statement/expression trace to `out`.
/// On success, returns `Main`'s own top-level scope so callers (tests, mainly) can inspect the
/// final value of any variable it declared.
pub fn run<W: Write>(program: &Program, out: &mut W) -> Result<ScopeRef, SemanticError> {
    Interpreter::new(program, out).run_main()
}

/// What a block's execution produced: either it ran to completion, or a `Return` fired partway
/// through and the remaining statements were skipped.
enum Flow {
    Normal,
    Returned(Option<Value>),
}

struct Interpreter<'a, W: Write> {
    functions: HashMap<&'a str, Rc<FunctionDefinition>>,
    current: ScopeRef,
    call_stack: Vec<ScopeRef>,
    depth: usize,
    out: &'a mut W,
}

impl<'a, W: Write> Interpreter<'a, W> {
    fn new(program: &'a Program, out: &'a mut W) -> Self {
        let functions = program
            .function_definitions
            .iter()
            .map(|d| (d.identifier.as_str(), Rc::clone(d)))
            .collect();
        Interpreter {
            functions,
            current: Scope::root(true),
            call_stack: Vec::new(),
            depth: 0,
            out,
        }
    }

    fn run_main(&mut self) -> Result<ScopeRef, SemanticError> {
        let main_def = self
            .functions
            .get(ENTRY_FUNCTION_NAME)
            .cloned()
            .ok_or(SemanticError::MainNotFound)?;
        if !main_def.parameters.is_empty() {
            return Err(SemanticError::ArityMismatch {
                name: ENTRY_FUNCTION_NAME.to_string(),
                expected: 0,
                actual: main_def.parameters.len(),
                position: main_def.position,
            });
        }
        self.trace_function_entry(ENTRY_FUNCTION_NAME, &[]);
        let saved = std::mem::replace(&mut self.current, Scope::root(true));
        self.call_stack.push(saved);
        self.depth += 1;
        let flow = self.exec_block(&main_def.body);
        self.depth -= 1;
        let main_scope = Rc::clone(&self.current);
        self.current = self.call_stack.pop().expect("call stack underflow");
        // A missing `return` is tolerated for `Main` specifically: it is the only call site
        // with no caller of its own to hand a value back to.
        flow?;
        Ok(main_scope)
    }

    // ---- statement execution ----

    fn exec_block(&mut self, block: &Block) -> Result<Flow, SemanticError> {
        for stmt in &block.statements {
            match self.exec_statement(stmt)? {
                Flow::Normal => {}
                returned @ Flow::Returned(_) => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    /// Runs `block` in a fresh child scope, as every block/conditional-arm/loop-body entry does.
    fn exec_nested_block(&mut self, block: &Block) -> Result<Flow, SemanticError> {
        let saved = Rc::clone(&self.current);
        self.current = Scope::child(&saved);
        self.depth += 1;
        let flow = self.exec_block(block);
        self.depth -= 1;
        self.current = saved;
        flow
    }

    fn exec_statement(&mut self, stmt: &Statement) -> Result<Flow, SemanticError> {
        match stmt {
            Statement::Block { block, .. } => self.exec_nested_block(block),

            Statement::Declaration {
                mutable,
                identifier,
                initializer,
                position,
            } => {
                if self.functions.contains_key(identifier.as_str()) {
                    return Err(SemanticError::NameClashWithFunction {
                        name: identifier.clone(),
                        position: *position,
                    });
                }
                if Scope::is_declared(&self.current, identifier) {
                    return Err(SemanticError::RedeclaredVariable {
                        name: identifier.clone(),
                        position: *position,
                    });
                }
                let value = match initializer {
                    Some(expr) => Some(self.eval_expression(expr)?),
                    None => None,
                };
                self.trace_declaration(identifier, value.as_ref());
                Scope::declare(&self.current, *mutable, identifier.clone(), value);
                Ok(Flow::Normal)
            }

            Statement::Assignment {
                identifier,
                expression,
                position,
            } => match Scope::mutability(&self.current, identifier) {
                None => Err(SemanticError::UnknownIdentifier {
                    name: identifier.clone(),
                    position: *position,
                }),
                Some(false) => Err(SemanticError::AssignmentToImmutable {
                    name: identifier.clone(),
                    position: *position,
                }),
                Some(true) => {
                    let value = self.eval_expression(expression)?;
                    self.trace_assignment(identifier, &value);
                    Scope::assign(&self.current, identifier, value);
                    Ok(Flow::Normal)
                }
            },

            Statement::Conditional {
                condition,
                then_block,
                else_block,
                position,
            } => {
                let truthy = self.eval_expression(condition)?.to_bool(*position)?;
                self.trace(format!("Conditional {truthy}"));
                if truthy {
                    self.exec_nested_block(then_block)
                } else if let Some(eb) = else_block {
                    self.exec_nested_block(eb)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Statement::WhileLoop {
                condition,
                body,
                position,
            } => {
                loop {
                    let truthy = self.eval_expression(condition)?.to_bool(*position)?;
                    self.trace(format!("While {truthy}"));
                    if !truthy {
                        return Ok(Flow::Normal);
                    }
                    match self.exec_nested_block(body)? {
                        Flow::Normal => {}
                        returned @ Flow::Returned(_) => return Ok(returned),
                    }
                }
            }

            Statement::Return {
                expression,
                position,
            } => {
                let value_expected = self.current.borrow().value_expected;
                if value_expected {
                    let expr = expression.as_ref().ok_or(SemanticError::ReturnValueRequired {
                        position: *position,
                    })?;
                    let value = self.eval_expression(expr)?;
                    self.trace(format!("Return {}", value.textual_form()));
                    Ok(Flow::Returned(Some(value)))
                } else {
                    match expression {
                        Some(expr) => {
                            let value = self.eval_expression(expr)?;
                            self.trace(format!("Return {}", value.textual_form()));
                        }
                        None => self.trace("Return".to_string()),
                    }
                    // A call that discarded its value expects nothing back, regardless of
                    // whatever expression (if any) the `return` carried.
                    Ok(Flow::Returned(None))
                }
            }

            Statement::FunctionCallStatement { call, .. } => {
                self.trace("FunctionCallStatement".to_string());
                self.call(call, false)?;
                Ok(Flow::Normal)
            }
        }
    }

    // ---- function call dispatch ----

    fn call(&mut self, call: &FunctionCall, value_expected: bool) -> Result<Option<Value>, SemanticError> {
        let args = call
            .arguments
            .iter()
            .map(|e| self.eval_expression(e))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(def) = self.functions.get(call.callee.as_str()).cloned() {
            self.call_definition(&def, args, value_expected)
        } else if let Some(value) = Scope::get(&self.current, &call.callee) {
            self.call_value(&value, args, value_expected, call.position)
        } else {
            Err(SemanticError::UnknownIdentifier {
                name: call.callee.clone(),
                position: call.position,
            })
        }
    }

    fn call_definition(
        &mut self,
        def: &Rc<FunctionDefinition>,
        args: Vec<Value>,
        value_expected: bool,
    ) -> Result<Option<Value>, SemanticError> {
        if def.parameters.len() != args.len() {
            return Err(SemanticError::ArityMismatch {
                name: def.identifier.clone(),
                expected: def.parameters.len(),
                actual: args.len(),
                position: def.position,
            });
        }
        self.trace_function_entry(&def.identifier, &args);
        let returned = self.invoke(&def.body, &def.parameters, args, value_expected);
        self.require_value(returned, value_expected, def.position)
    }

    fn call_value(
        &mut self,
        value: &Value,
        args: Vec<Value>,
        value_expected: bool,
        position: Position,
    ) -> Result<Option<Value>, SemanticError> {
        let Value::Function(f) = value else {
            return Err(SemanticError::TypeNotCoercible {
                operator: "call".to_string(),
                position,
            });
        };

        let mut all = f.bound_arguments.clone();
        all.extend(args);

        let expected = f.expected_arity();
        if all.len() != expected {
            return Err(SemanticError::ArityMismatch {
                name: "<function>".to_string(),
                expected,
                actual: all.len(),
                position,
            });
        }

        if let Some(composed_of) = &f.composed_of {
            let inner = Value::Function(Rc::new((**composed_of).clone()));
            let piped = self
                .call_value(&inner, all, true, position)?
                .ok_or(SemanticError::ReturnedNoValueWhereExpected { position })?;
            all = vec![piped];
        }

        self.trace_function_entry("<function>", &all);
        let returned = self.invoke(&f.body, &f.parameters, all, value_expected);
        self.require_value(returned, value_expected, position)
    }

    /// Enters a fresh function-call frame (a root scope with no parent), binds `params` to
    /// `args` one-to-one, interprets `body`, then restores the caller's scope. This is the one
    /// place the saved-scope call stack is pushed/popped; block entry/exit nests `current`
    /// itself instead (see `exec_nested_block`).
    fn invoke(
        &mut self,
        body: &Rc<Block>,
        params: &[Parameter],
        args: Vec<Value>,
        value_expected: bool,
    ) -> Result<Flow, SemanticError> {
        let saved = std::mem::replace(&mut self.current, Scope::root(value_expected));
        self.call_stack.push(saved);
        self.depth += 1;
        for (param, arg) in params.iter().zip(args) {
            Scope::declare(&self.current, param.mutable, param.identifier.clone(), Some(arg));
        }
        let flow = self.exec_block(body);
        self.depth -= 1;
        self.current = self.call_stack.pop().expect("call stack underflow");
        flow
    }

    fn require_value(
        &self,
        flow: Result<Flow, SemanticError>,
        value_expected: bool,
        position: Position,
    ) -> Result<Option<Value>, SemanticError> {
        let returned = match flow? {
            Flow::Returned(v) => v,
            Flow::Normal => None,
        };
        if value_expected && returned.is_none() {
            return Err(SemanticError::ReturnedNoValueWhereExpected { position });
        }
        Ok(returned)
    }

    // ---- expression evaluation ----

    fn eval_expression(&mut self, expr: &Expression) -> Result<Value, SemanticError> {
        match expr {
            Expression::Standard(se) => self.eval_standard_expression(se),
            Expression::Func(fe) => self.eval_func_expression(fe),
        }
    }

    fn eval_standard_expression(&mut self, se: &StandardExpression) -> Result<Value, SemanticError> {
        let mut conjunctions = se.conjunctions.iter();
        let first = conjunctions.next().expect("StandardExpression is non-empty");
        let value = self.eval_conjunction(first)?;
        if se.conjunctions.len() == 1 {
            return Ok(value);
        }
        if value.to_bool(conjunction_position(first))? {
            return Ok(Value::Bool(true));
        }
        for c in conjunctions {
            let value = self.eval_conjunction(c)?;
            if value.to_bool(conjunction_position(c))? {
                return Ok(Value::Bool(true));
            }
        }
        Ok(Value::Bool(false))
    }

    fn eval_conjunction(&mut self, conj: &Conjunction) -> Result<Value, SemanticError> {
        let mut relations = conj.relations.iter();
        let first = relations.next().expect("Conjunction is non-empty");
        let value = self.eval_relation(first)?;
        if conj.relations.len() == 1 {
            return Ok(value);
        }
        if !value.to_bool(relation_position(first))? {
            return Ok(Value::Bool(false));
        }
        for r in relations {
            let value = self.eval_relation(r)?;
            if !value.to_bool(relation_position(r))? {
                return Ok(Value::Bool(false));
            }
        }
        Ok(Value::Bool(true))
    }

    fn eval_relation(&mut self, rel: &Relation) -> Result<Value, SemanticError> {
        let first = self.eval_additive(&rel.first)?;
        let Some(second) = &rel.second else {
            return Ok(first);
        };
        let operator = rel.operator.expect("second present implies operator present");
        let second = self.eval_additive(second)?;
        let position = additive_position(&rel.first);
        let result = match operator {
            RelationOp::Eq => first.equals(&second, position)?,
            RelationOp::NotEq => first.not_equals(&second, position)?,
            RelationOp::Less => first.less(&second, position)?,
            RelationOp::LessEq => first.less_eq(&second, position)?,
            RelationOp::Greater => first.greater(&second, position)?,
            RelationOp::GreaterEq => first.greater_eq(&second, position)?,
        };
        Ok(Value::Bool(result))
    }

    fn eval_additive(&mut self, add: &Additive) -> Result<Value, SemanticError> {
        let mut value = self.eval_multiplicative(&add.first)?;
        for (op, m) in add.operators.iter().zip(add.rest.iter()) {
            let rhs = self.eval_multiplicative(m)?;
            let position = multiplicative_position(m);
            value = match op {
                AddSub::Add => value.add(&rhs, position)?,
                AddSub::Sub => value.sub(&rhs, position)?,
            };
        }
        if add.negated {
            value = value.negate(multiplicative_position(&add.first))?;
        }
        Ok(value)
    }

    fn eval_multiplicative(&mut self, mul: &Multiplicative) -> Result<Value, SemanticError> {
        let mut value = self.eval_factor(&mul.first)?;
        for (op, f) in mul.operators.iter().zip(mul.rest.iter()) {
            let rhs = self.eval_factor(f)?;
            let position = factor_position(f);
            value = match op {
                MulDiv::Mul => value.mul(&rhs, position)?,
                MulDiv::Div => value.div(&rhs, position)?,
            };
        }
        Ok(value)
    }

    fn eval_factor(&mut self, factor: &Factor) -> Result<Value, SemanticError> {
        let (mut value, negated, position) = match factor {
            Factor::Literal {
                literal,
                negated,
                position,
            } => (eval_literal(literal), *negated, *position),
            Factor::Parenthesised {
                expression,
                negated,
                position,
            } => (self.eval_standard_expression(expression)?, *negated, *position),
            Factor::Call {
                call,
                negated,
                position,
            } => {
                let value = self
                    .call(call, true)?
                    .ok_or(SemanticError::ReturnedNoValueWhereExpected { position: *position })?;
                (value, *negated, *position)
            }
            Factor::Identifier {
                name,
                negated,
                position,
            } => (self.lookup_variable(name, *position)?, *negated, *position),
        };
        if negated {
            value = value.logical_not(position)?;
        }
        Ok(value)
    }

    fn lookup_variable(&self, name: &str, position: Position) -> Result<Value, SemanticError> {
        match Scope::get(&self.current, name) {
            Some(value) => Ok(value),
            None if Scope::is_declared(&self.current, name) => {
                Err(SemanticError::UninitializedVariable {
                    name: name.to_string(),
                    position,
                })
            }
            None => Err(SemanticError::UnknownIdentifier {
                name: name.to_string(),
                position,
            }),
        }
    }

    // ---- func_expression / composable / bindable ----

    fn eval_func_expression(&mut self, fe: &FuncExpression) -> Result<Value, SemanticError> {
        let mut composables = fe.composables.iter();
        let first = composables.next().expect("FuncExpression is non-empty");
        let mut value = self.eval_composable(first)?;
        for c in composables {
            let rhs = self.eval_composable(c)?;
            let position = bindable_position(&c.bindable);
            value = value.compose(&rhs, position)?;
        }
        Ok(value)
    }

    fn eval_composable(&mut self, composable: &Composable) -> Result<Value, SemanticError> {
        let value = self.eval_bindable(&composable.bindable)?;
        match &composable.bind_arguments {
            Some(arg_exprs) => {
                let args = arg_exprs
                    .iter()
                    .map(|e| self.eval_expression(e))
                    .collect::<Result<Vec<_>, _>>()?;
                value.bind(args, bindable_position(&composable.bindable))
            }
            None => Ok(value),
        }
    }

    fn eval_bindable(&mut self, bindable: &Bindable) -> Result<Value, SemanticError> {
        match bindable {
            Bindable::FunctionLiteral(lit) => Ok(Value::Function(Rc::new(FunctionValue {
                body: Rc::clone(&lit.body),
                parameters: lit.parameters.clone(),
                bound_arguments: Vec::new(),
                composed_of: None,
            }))),
            Bindable::FuncExpression(fe) => self.eval_func_expression(fe),
            Bindable::Call(call) => self
                .call(call, true)?
                .ok_or(SemanticError::ReturnedNoValueWhereExpected { position: call.position }),
            Bindable::Identifier { name, position } => match Scope::get(&self.current, name) {
                Some(value) => Ok(value),
                None if Scope::is_declared(&self.current, name) => {
                    Err(SemanticError::UninitializedVariable {
                        name: name.clone(),
                        position: *position,
                    })
                }
                None => match self.functions.get(name.as_str()) {
                    Some(def) => Ok(Value::Function(Rc::new(FunctionValue {
                        body: Rc::clone(&def.body),
                        parameters: def.parameters.clone(),
                        bound_arguments: Vec::new(),
                        composed_of: None,
                    }))),
                    None => Err(SemanticError::UnknownIdentifier {
                        name: name.clone(),
                        position: *position,
                    }),
                },
            },
        }
    }

    // ---- trace output ----

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }

    fn trace(&mut self, line: String) {
        let _ = writeln!(self.out, "{}{}", self.indent(), line);
    }

    fn trace_function_entry(&mut self, name: &str, args: &[Value]) {
        let joined = args
            .iter()
            .map(Value::textual_form)
            .collect::<Vec<_>>()
            .join(", ");
        self.trace(format!("Function: {name} Arguments: {joined}"));
    }

    fn trace_declaration(&mut self, name: &str, value: Option<&Value>) {
        match value {
            Some(v) => self.trace(format!("Declaration {name} = {}", v.textual_form())),
            None => self.trace(format!("Declaration {name}")),
        }
    }

    fn trace_assignment(&mut self, name: &str, value: &Value) {
        self.trace(format!("Assignment {name} = {}", value.textual_form()));
    }
}

fn eval_literal(literal: &Literal) -> Value {
    match literal {
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::Str(s.clone()),
    }
}

fn factor_position(factor: &Factor) -> Position {
    match factor {
        Factor::Literal { position, .. }
        | Factor::Parenthesised { position, .. }
        | Factor::Call { position, .. }
        | Factor::Identifier { position, .. } => *position,
    }
}

fn multiplicative_position(mul: &Multiplicative) -> Position {
    factor_position(&mul.first)
}

fn additive_position(add: &Additive) -> Position {
    multiplicative_position(&add.first)
}

fn relation_position(rel: &Relation) -> Position {
    additive_position(&rel.first)
}

fn conjunction_position(conj: &Conjunction) -> Position {
    relation_position(&conj.relations[0])
}

fn bindable_position(bindable: &Bindable) -> Position {
    match bindable {
        Bindable::FunctionLiteral(lit) => lit.position,
        Bindable::FuncExpression(fe) => bindable_position(&fe.composables[0].bindable),
        Bindable::Call(call) => call.position,
        Bindable::Identifier { position, .. } => *position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run_source(source: &str) -> Result<(String, ScopeRef), SemanticError> {
        let (program, lex, syn) = parse(source);
        assert!(lex.is_empty(), "unexpected lexical diagnostics: {lex:?}");
        assert!(syn.is_none(), "unexpected syntactic diagnostic: {syn:?}");
        let mut out = Vec::new();
        let scope = run(&program, &mut out)?;
        Ok((String::from_utf8(out).unwrap(), scope))
    }

    #[test]
    fn hello_arithmetic() {
        let (trace, scope) = run_source("func Main(){ var a = 21 + 21; }").unwrap();
        assert!(trace.contains("Declaration a = 42"));
        assert!(matches!(Scope::get(&scope, "a"), Some(Value::Int(42))));
    }

    #[test]
    fn conditional_and_while_loop() {
        let (trace, scope) =
            run_source("func Main(){ mut var i = 0; while(i < 3){ i = i + 1; } }").unwrap();
        assert_eq!(trace.matches("While true").count(), 3);
        assert_eq!(trace.matches("While false").count(), 1);
        assert!(matches!(Scope::get(&scope, "i"), Some(Value::Int(3))));
    }

    #[test]
    fn recursion() {
        let source = "func F(n){ if(n <= 1){ return 1; } return n * F(n - 1); } \
                       func Main(){ var x = F(5); }";
        let (_, scope) = run_source(source).unwrap();
        assert!(matches!(Scope::get(&scope, "x"), Some(Value::Int(120))));
    }

    #[test]
    fn partial_application() {
        let source = "func Add(a,b){ return a + b; } \
                       func Main(){ var f = [Add << (10)]; var y = f(5); }";
        let (_, scope) = run_source(source).unwrap();
        assert!(matches!(Scope::get(&scope, "y"), Some(Value::Int(15))));
    }

    #[test]
    fn composition() {
        let source = "func Inc(x){ return x + 1; } func Dbl(x){ return x * 2; } \
                       func Main(){ var g = [Inc >> Dbl]; var z = g(3); }";
        let (_, scope) = run_source(source).unwrap();
        assert!(matches!(Scope::get(&scope, "z"), Some(Value::Int(8))));
    }

    #[test]
    fn string_replication() {
        let (_, scope) = run_source("func Main(){ var s = 3 * \"ab\"; }").unwrap();
        assert!(matches!(Scope::get(&scope, "s"), Some(Value::Str(ref s)) if s == "ababab"));

        let (_, scope) = run_source("func Main(){ var s = 0 * \"ab\"; }").unwrap();
        assert!(matches!(Scope::get(&scope, "s"), Some(Value::Str(ref s)) if s.is_empty()));

        let err = run_source("func Main(){ var s = -1 * \"ab\"; }").unwrap_err();
        assert!(matches!(err, SemanticError::TypeNotCoercible { .. }));
    }

    #[test]
    fn assignment_to_immutable_is_fatal() {
        let err = run_source("func Main(){ var a = 1; a = 2; }").unwrap_err();
        assert!(matches!(err, SemanticError::AssignmentToImmutable { .. }));
    }

    #[test]
    fn main_missing_is_fatal() {
        let err = run_source("func Fizz(){}").unwrap_err();
        assert!(matches!(err, SemanticError::MainNotFound));
    }

    #[test]
    fn main_without_return_is_tolerated() {
        run_source("func Main(){ var a = 1; }").unwrap();
    }

    #[test]
    fn redeclaration_is_fatal() {
        let err = run_source("func Main(){ var a = 1; var a = 2; }").unwrap_err();
        assert!(matches!(err, SemanticError::RedeclaredVariable { .. }));
    }

    #[test]
    fn declaring_over_a_function_name_is_fatal() {
        let err = run_source("func F(){} func Main(){ var F = 1; }").unwrap_err();
        assert!(matches!(err, SemanticError::NameClashWithFunction { .. }));
    }

    #[test]
    fn arity_mismatch_is_fatal() {
        let err = run_source("func F(a,b){ return a; } func Main(){ var x = F(1); }").unwrap_err();
        assert!(matches!(err, SemanticError::ArityMismatch { .. }));
    }

    #[test]
    fn compose_requires_unary_right_side() {
        let source = "func Add(a,b){ return a + b; } func Inc(x){ return x + 1; } \
                       func Main(){ var g = [Add >> Inc]; }";
        run_source(source).unwrap();
        let source = "func Add(a,b){ return a + b; } func Inc(x){ return x + 1; } \
                       func Main(){ var g = [Inc >> Add]; }";
        let err = run_source(source).unwrap_err();
        assert!(matches!(err, SemanticError::FunctionComposeArity { .. }));
    }

    #[test]
    fn double_negation_round_trips_through_bool() {
        let (_, scope) = run_source("func Main(){ var a = !!true; }").unwrap();
        assert!(matches!(Scope::get(&scope, "a"), Some(Value::Bool(true))));
    }

    #[test]
    fn undefined_variable_is_fatal() {
        let err = run_source("func Main(){ var a = b; }").unwrap_err();
        assert!(matches!(err, SemanticError::UnknownIdentifier { .. }));
    }

    #[test]
    fn uninitialized_variable_use_is_fatal() {
        let err = run_source("func Main(){ mut var a; var b = a; }").unwrap_err();
        assert!(matches!(err, SemanticError::UninitializedVariable { .. }));
    }

    #[test]
    fn nested_block_scope_does_not_leak_outward() {
        let source = "func Main(){ { var inner = 1; } var outer = 2; }";
        let (_, scope) = run_source(source).unwrap();
        assert!(Scope::get(&scope, "inner").is_none());
        assert!(matches!(Scope::get(&scope, "outer"), Some(Value::Int(2))));
    }

    #[test]
    fn return_inside_nested_block_terminates_the_function() {
        let source = "func F(){ if(true){ return 1; } return 2; } func Main(){ var x = F(); }";
        let (_, scope) = run_source(source).unwrap();
        assert!(matches!(Scope::get(&scope, "x"), Some(Value::Int(1))));
    }

    #[test]
    fn while_loop_return_unwinds_through_the_loop() {
        let source = "func F(){ while(true){ return 9; } } func Main(){ var x = F(); }";
        let (_, scope) = run_source(source).unwrap();
        assert!(matches!(Scope::get(&scope, "x"), Some(Value::Int(9))));
    }
}
