// ABOUTME: Recursive-descent parser turning a token stream into the typed AST

use crate::ast::*;
use crate::error::{LexicalError, SyntacticError};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind, TokenPayload};
use std::rc::Rc;

/// Parses a complete program from source text, returning the (possibly partial) program,
/// every lexical diagnostic seen along the way, and the first fatal syntactic diagnostic, if any.
pub fn parse(source: &str) -> (Program, Vec<LexicalError>, Option<SyntacticError>) {
    Parser::new(source).parse_program()
}

/// Pulls tokens from a `Lexer` one at a time, with a single-slot pushback buffer mirroring the
/// grammar's 1-token lookahead. Productions that have not yet consumed a distinguishing token
/// fail "softly" (`Ok(None)`, nothing consumed); once a production commits — it has seen the
/// keyword or punctuation that identifies it — any further mismatch is a fatal `SyntacticError`
/// that aborts the enclosing `parse_program` call.
struct Parser {
    lexer: Lexer,
    pushback: Option<Token>,
    lexical_diagnostics: Vec<LexicalError>,
    fatal: Option<SyntacticError>,
}

impl Parser {
    fn new(source: &str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            pushback: None,
            lexical_diagnostics: Vec::new(),
            fatal: None,
        }
    }

    /// Pulls the next non-comment token, forwarding lexical diagnostics as they're produced.
    /// Once a terminating lexical diagnostic has been seen, further calls stop consulting the
    /// lexer and return a synthetic end-of-file token instead of advancing past the failure.
    fn next_token(&mut self) -> Token {
        if let Some(tok) = self.pushback.take() {
            return tok;
        }
        if self.fatal.is_some() {
            return Token::simple(TokenKind::EndOfFile, self.lexer.current_position());
        }
        loop {
            let (token, diags) = self.lexer.next_token();
            for d in &diags {
                if d.terminating() && self.fatal.is_none() {
                    self.fatal = Some(SyntacticError::Lexical(d.clone()));
                }
            }
            self.lexical_diagnostics.extend(diags);
            if token.kind == TokenKind::Comment {
                continue;
            }
            return token;
        }
    }

    fn push_back(&mut self, token: Token) {
        self.pushback = Some(token);
    }

    fn peek_kind(&mut self) -> TokenKind {
        let tok = self.next_token();
        let kind = tok.kind;
        self.push_back(tok);
        kind
    }

    /// Soft match: consumes and returns the token if its kind matches, otherwise rewinds.
    fn take(&mut self, kind: TokenKind) -> Option<Token> {
        let tok = self.next_token();
        if tok.kind == kind {
            Some(tok)
        } else {
            self.push_back(tok);
            None
        }
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.take(kind).is_some()
    }

    /// Committed match: consumes the token or raises a fatal diagnostic.
    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, SyntacticError> {
        let tok = self.next_token();
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(SyntacticError::Expected {
                expected: expected.to_string(),
                position: tok.position,
            })
        }
    }

    fn mark(&mut self) -> (usize, Option<Token>, usize) {
        (self.lexer.mark(), self.pushback.clone(), self.lexical_diagnostics.len())
    }

    fn reset(&mut self, mark: (usize, Option<Token>, usize)) {
        self.lexer.reset(mark.0);
        self.pushback = mark.1;
        self.lexical_diagnostics.truncate(mark.2);
    }

    // ---- program ----

    fn parse_program(&mut self) -> (Program, Vec<LexicalError>, Option<SyntacticError>) {
        let mut program = Program::default();
        loop {
            if self.fatal.is_some() {
                break;
            }
            match self.parse_function_definition() {
                Ok(Some(fd)) => program.function_definitions.push(Rc::new(fd)),
                Ok(None) => break,
                Err(e) => {
                    self.fatal = Some(e);
                    break;
                }
            }
        }
        if self.fatal.is_none() {
            let tok = self.next_token();
            if tok.kind != TokenKind::EndOfFile {
                self.fatal = Some(SyntacticError::Expected {
                    expected: "\"func\" or end of file".to_string(),
                    position: tok.position,
                });
            }
        }
        (
            program,
            std::mem::take(&mut self.lexical_diagnostics),
            self.fatal.take(),
        )
    }

    fn parse_function_definition(&mut self) -> Result<Option<FunctionDefinition>, SyntacticError> {
        let Some(func_tok) = self.take(TokenKind::Func) else {
            return Ok(None);
        };
        let position = func_tok.position;
        let id_tok = self.expect(TokenKind::Identifier, "identifier after \"func\"")?;
        let identifier = id_tok.text().unwrap().to_string();
        self.expect(TokenKind::LParen, "\"(\" after function name")?;
        let parameters = self.parse_parameters()?;
        self.expect(TokenKind::RParen, "\")\" to close the parameter list")?;
        let body = self.parse_block()?;
        Ok(Some(FunctionDefinition {
            identifier,
            parameters,
            body: Rc::new(body),
            position,
        }))
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, SyntacticError> {
        let mut params = Vec::new();
        if let Some(p) = self.parse_parameter()? {
            params.push(p);
            while self.at(TokenKind::Comma) {
                match self.parse_parameter()? {
                    Some(p) => params.push(p),
                    None => {
                        let tok = self.next_token();
                        return Err(SyntacticError::Expected {
                            expected: "parameter after \",\"".to_string(),
                            position: tok.position,
                        });
                    }
                }
            }
        }
        Ok(params)
    }

    fn parse_parameter(&mut self) -> Result<Option<Parameter>, SyntacticError> {
        let mutable = self.at(TokenKind::Mut);
        let Some(id_tok) = self.take(TokenKind::Identifier) else {
            if mutable {
                let tok = self.next_token();
                return Err(SyntacticError::Expected {
                    expected: "identifier after \"mut\"".to_string(),
                    position: tok.position,
                });
            }
            return Ok(None);
        };
        Ok(Some(Parameter {
            identifier: id_tok.text().unwrap().to_string(),
            mutable,
            position: id_tok.position,
        }))
    }

    fn parse_block(&mut self) -> Result<Block, SyntacticError> {
        self.expect(TokenKind::LBrace, "\"{\" to start a block")?;
        let mut statements = Vec::new();
        loop {
            if self.at(TokenKind::RBrace) {
                break;
            }
            match self.parse_statement()? {
                Some(stmt) => statements.push(stmt),
                None => {
                    let tok = self.next_token();
                    return Err(SyntacticError::Expected {
                        expected: "statement or \"}\"".to_string(),
                        position: tok.position,
                    });
                }
            }
        }
        Ok(Block { statements })
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Result<Option<Statement>, SyntacticError> {
        if let Some(s) = self.parse_conditional()? {
            return Ok(Some(s));
        }
        if let Some(s) = self.parse_while_loop()? {
            return Ok(Some(s));
        }
        if let Some(s) = self.parse_return_stmt()? {
            return Ok(Some(s));
        }
        if let Some(s) = self.parse_block_statement()? {
            return Ok(Some(s));
        }
        if let Some(s) = self.parse_declaration()? {
            return Ok(Some(s));
        }
        if let Some(s) = self.parse_assignment_or_call_stmt()? {
            return Ok(Some(s));
        }
        Ok(None)
    }

    fn parse_block_statement(&mut self) -> Result<Option<Statement>, SyntacticError> {
        if self.peek_kind() != TokenKind::LBrace {
            return Ok(None);
        }
        let position = self.peek_position();
        let block = self.parse_block()?;
        Ok(Some(Statement::Block {
            block: Rc::new(block),
            position,
        }))
    }

    fn peek_position(&mut self) -> crate::token::Position {
        let tok = self.next_token();
        let pos = tok.position;
        self.push_back(tok);
        pos
    }

    fn parse_conditional(&mut self) -> Result<Option<Statement>, SyntacticError> {
        let Some(if_tok) = self.take(TokenKind::If) else {
            return Ok(None);
        };
        let position = if_tok.position;
        self.expect(TokenKind::LParen, "\"(\" after \"if\"")?;
        let condition = self.parse_standard_expression_required()?;
        self.expect(TokenKind::RParen, "\")\" to close the condition")?;
        let then_block = self.parse_block()?;
        let else_block = if self.at(TokenKind::Else) {
            Some(Rc::new(self.parse_block()?))
        } else {
            None
        };
        Ok(Some(Statement::Conditional {
            condition: Expression::Standard(condition),
            then_block: Rc::new(then_block),
            else_block,
            position,
        }))
    }

    fn parse_while_loop(&mut self) -> Result<Option<Statement>, SyntacticError> {
        let Some(while_tok) = self.take(TokenKind::While) else {
            return Ok(None);
        };
        let position = while_tok.position;
        self.expect(TokenKind::LParen, "\"(\" after \"while\"")?;
        let condition = self.parse_standard_expression_required()?;
        self.expect(TokenKind::RParen, "\")\" to close the condition")?;
        let body = self.parse_block()?;
        Ok(Some(Statement::WhileLoop {
            condition: Expression::Standard(condition),
            body: Rc::new(body),
            position,
        }))
    }

    fn parse_return_stmt(&mut self) -> Result<Option<Statement>, SyntacticError> {
        let Some(return_tok) = self.take(TokenKind::Return) else {
            return Ok(None);
        };
        let position = return_tok.position;
        let expression = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "\";\" after return statement")?;
        Ok(Some(Statement::Return {
            expression,
            position,
        }))
    }

    fn parse_declaration(&mut self) -> Result<Option<Statement>, SyntacticError> {
        let mutable = self.at(TokenKind::Mut);
        let Some(var_tok) = self.take(TokenKind::Var) else {
            if mutable {
                let tok = self.next_token();
                return Err(SyntacticError::Expected {
                    expected: "\"var\" after \"mut\"".to_string(),
                    position: tok.position,
                });
            }
            return Ok(None);
        };
        let position = var_tok.position;
        let id_tok = self.expect(TokenKind::Identifier, "identifier after \"var\"")?;
        let identifier = id_tok.text().unwrap().to_string();
        let initializer = if self.at(TokenKind::Assign) {
            Some(self.parse_expression_required()?)
        } else {
            None
        };
        if initializer.is_none() && !mutable {
            return Err(SyntacticError::Expected {
                expected: "initializer for an immutable \"var\" declaration".to_string(),
                position,
            });
        }
        self.expect(TokenKind::Semicolon, "\";\" after declaration")?;
        Ok(Some(Statement::Declaration {
            mutable,
            identifier,
            initializer,
            position,
        }))
    }

    fn parse_assignment_or_call_stmt(&mut self) -> Result<Option<Statement>, SyntacticError> {
        let Some(id_tok) = self.take(TokenKind::Identifier) else {
            return Ok(None);
        };
        let position = id_tok.position;
        let identifier = id_tok.text().unwrap().to_string();

        if self.at(TokenKind::Assign) {
            let expression = self.parse_expression_required()?;
            self.expect(TokenKind::Semicolon, "\";\" after assignment")?;
            return Ok(Some(Statement::Assignment {
                identifier,
                expression,
                position,
            }));
        }

        if self.at(TokenKind::LParen) {
            let arguments = self.parse_arguments()?;
            self.expect(TokenKind::RParen, "\")\" to close the argument list")?;
            self.expect(TokenKind::Semicolon, "\";\" after function call")?;
            return Ok(Some(Statement::FunctionCallStatement {
                call: FunctionCall {
                    callee: identifier,
                    arguments,
                    position,
                },
                position,
            }));
        }

        // Neither "=" nor "(" followed the identifier — this isn't an assignment or call
        // statement after all, so rewind the identifier for the caller to try elsewhere.
        self.push_back(Token::new(
            TokenKind::Identifier,
            position,
            TokenPayload::Text(identifier),
        ));
        Ok(None)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, SyntacticError> {
        let mut args = Vec::new();
        if let Some(e) = self.parse_expression()? {
            args.push(e);
            while self.at(TokenKind::Comma) {
                args.push(self.parse_expression_required()?);
            }
        }
        Ok(args)
    }

    // ---- expressions ----

    fn parse_expression(&mut self) -> Result<Option<Expression>, SyntacticError> {
        if self.at(TokenKind::LSquare) {
            let fe = self.parse_func_expression_required()?;
            self.expect(TokenKind::RSquare, "\"]\" to close the function expression")?;
            return Ok(Some(Expression::Func(fe)));
        }
        match self.parse_standard_expression()? {
            Some(se) => Ok(Some(Expression::Standard(se))),
            None => Ok(None),
        }
    }

    fn parse_expression_required(&mut self) -> Result<Expression, SyntacticError> {
        match self.parse_expression()? {
            Some(e) => Ok(e),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn parse_standard_expression(&mut self) -> Result<Option<StandardExpression>, SyntacticError> {
        let Some(first) = self.parse_conjunction()? else {
            return Ok(None);
        };
        let mut conjunctions = vec![first];
        while self.at(TokenKind::LogicalOr) {
            conjunctions.push(self.parse_conjunction_required()?);
        }
        Ok(Some(StandardExpression { conjunctions }))
    }

    fn parse_standard_expression_required(&mut self) -> Result<StandardExpression, SyntacticError> {
        match self.parse_standard_expression()? {
            Some(se) => Ok(se),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn parse_conjunction(&mut self) -> Result<Option<Conjunction>, SyntacticError> {
        let Some(first) = self.parse_relation()? else {
            return Ok(None);
        };
        let mut relations = vec![first];
        while self.at(TokenKind::LogicalAnd) {
            relations.push(self.parse_relation_required()?);
        }
        Ok(Some(Conjunction { relations }))
    }

    fn parse_conjunction_required(&mut self) -> Result<Conjunction, SyntacticError> {
        match self.parse_conjunction()? {
            Some(c) => Ok(c),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression after \"||\"".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn parse_relation(&mut self) -> Result<Option<Relation>, SyntacticError> {
        let Some(first) = self.parse_additive()? else {
            return Ok(None);
        };
        let operator = self.take_relation_op();
        let second = if operator.is_some() {
            Some(self.parse_additive_required()?)
        } else {
            None
        };
        Ok(Some(Relation {
            first,
            operator,
            second,
        }))
    }

    fn parse_relation_required(&mut self) -> Result<Relation, SyntacticError> {
        match self.parse_relation()? {
            Some(r) => Ok(r),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression after \"&&\"".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn take_relation_op(&mut self) -> Option<RelationOp> {
        let tok = self.next_token();
        let op = match tok.kind {
            TokenKind::Less => Some(RelationOp::Less),
            TokenKind::LessEqual => Some(RelationOp::LessEq),
            TokenKind::Greater => Some(RelationOp::Greater),
            TokenKind::GreaterEqual => Some(RelationOp::GreaterEq),
            TokenKind::Equal => Some(RelationOp::Eq),
            TokenKind::NotEqual => Some(RelationOp::NotEq),
            _ => None,
        };
        if op.is_none() {
            self.push_back(tok);
        }
        op
    }

    fn parse_additive(&mut self) -> Result<Option<Additive>, SyntacticError> {
        let negated = self.at(TokenKind::Minus);
        let Some(first) = self.parse_multiplicative()? else {
            if negated {
                let tok = self.next_token();
                return Err(SyntacticError::Expected {
                    expected: "expression after unary \"-\"".to_string(),
                    position: tok.position,
                });
            }
            return Ok(None);
        };
        let mut operators = Vec::new();
        let mut rest = Vec::new();
        while let Some(op) = self.take_add_sub() {
            operators.push(op);
            rest.push(self.parse_multiplicative_required()?);
        }
        Ok(Some(Additive {
            negated,
            first,
            operators,
            rest,
        }))
    }

    fn parse_additive_required(&mut self) -> Result<Additive, SyntacticError> {
        match self.parse_additive()? {
            Some(a) => Ok(a),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression after relational operator".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn take_add_sub(&mut self) -> Option<AddSub> {
        let tok = self.next_token();
        let op = match tok.kind {
            TokenKind::Plus => Some(AddSub::Add),
            TokenKind::Minus => Some(AddSub::Sub),
            _ => None,
        };
        if op.is_none() {
            self.push_back(tok);
        }
        op
    }

    fn parse_multiplicative(&mut self) -> Result<Option<Multiplicative>, SyntacticError> {
        let Some(first) = self.parse_factor()? else {
            return Ok(None);
        };
        let mut operators = Vec::new();
        let mut rest = Vec::new();
        while let Some(op) = self.take_mul_div() {
            operators.push(op);
            rest.push(self.parse_factor_required()?);
        }
        Ok(Some(Multiplicative {
            first,
            operators,
            rest,
        }))
    }

    fn parse_multiplicative_required(&mut self) -> Result<Multiplicative, SyntacticError> {
        match self.parse_multiplicative()? {
            Some(m) => Ok(m),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression after \"+\" or \"-\"".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn take_mul_div(&mut self) -> Option<MulDiv> {
        let tok = self.next_token();
        let op = match tok.kind {
            TokenKind::Asterisk => Some(MulDiv::Mul),
            TokenKind::Slash => Some(MulDiv::Div),
            _ => None,
        };
        if op.is_none() {
            self.push_back(tok);
        }
        op
    }

    fn parse_factor(&mut self) -> Result<Option<Factor>, SyntacticError> {
        let negated = self.at(TokenKind::LogicalNot);
        let tok = self.next_token();
        match tok.kind {
            TokenKind::LParen => {
                let position = tok.position;
                let expr = self.parse_standard_expression_required()?;
                self.expect(TokenKind::RParen, "\")\" to close the expression")?;
                Ok(Some(Factor::Parenthesised {
                    expression: Box::new(expr),
                    negated,
                    position,
                }))
            }
            TokenKind::Identifier => {
                let position = tok.position;
                let name = tok.text().unwrap().to_string();
                if self.at(TokenKind::LParen) {
                    let arguments = self.parse_arguments()?;
                    self.expect(TokenKind::RParen, "\")\" to close the argument list")?;
                    Ok(Some(Factor::Call {
                        call: FunctionCall {
                            callee: name,
                            arguments,
                            position,
                        },
                        negated,
                        position,
                    }))
                } else {
                    Ok(Some(Factor::Identifier {
                        name,
                        negated,
                        position,
                    }))
                }
            }
            TokenKind::Integer => {
                let position = tok.position;
                let TokenPayload::Integer(v) = tok.payload else {
                    unreachable!("Integer token must carry TokenPayload::Integer")
                };
                Ok(Some(Factor::Literal {
                    literal: Literal::Int(v),
                    negated,
                    position,
                }))
            }
            TokenKind::Float => {
                let position = tok.position;
                let TokenPayload::Float(v) = tok.payload else {
                    unreachable!("Float token must carry TokenPayload::Float")
                };
                Ok(Some(Factor::Literal {
                    literal: Literal::Float(v),
                    negated,
                    position,
                }))
            }
            TokenKind::String => {
                let position = tok.position;
                let text = tok.text().unwrap().to_string();
                Ok(Some(Factor::Literal {
                    literal: Literal::String(text),
                    negated,
                    position,
                }))
            }
            TokenKind::Boolean => {
                let position = tok.position;
                let TokenPayload::Boolean(v) = tok.payload else {
                    unreachable!("Boolean token must carry TokenPayload::Boolean")
                };
                Ok(Some(Factor::Literal {
                    literal: Literal::Bool(v),
                    negated,
                    position,
                }))
            }
            _ => {
                if negated {
                    return Err(SyntacticError::Expected {
                        expected: "operand after \"!\"".to_string(),
                        position: tok.position,
                    });
                }
                self.push_back(tok);
                Ok(None)
            }
        }
    }

    fn parse_factor_required(&mut self) -> Result<Factor, SyntacticError> {
        match self.parse_factor()? {
            Some(f) => Ok(f),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "expression after \"*\" or \"/\"".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    // ---- func_expression / composable / bindable ----

    fn parse_func_expression(&mut self) -> Result<Option<FuncExpression>, SyntacticError> {
        let Some(first) = self.parse_composable()? else {
            return Ok(None);
        };
        let mut composables = vec![first];
        while self.at(TokenKind::FunctionCompose) {
            composables.push(self.parse_composable_required()?);
        }
        Ok(Some(FuncExpression { composables }))
    }

    fn parse_func_expression_required(&mut self) -> Result<FuncExpression, SyntacticError> {
        match self.parse_func_expression()? {
            Some(fe) => Ok(fe),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "function expression".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    fn parse_composable(&mut self) -> Result<Option<Composable>, SyntacticError> {
        let Some(bindable) = self.parse_bindable()? else {
            return Ok(None);
        };
        let bind_arguments = if self.at(TokenKind::FunctionBind) {
            self.expect(TokenKind::LParen, "\"(\" after \"<<\"")?;
            let args = self.parse_arguments()?;
            self.expect(TokenKind::RParen, "\")\" to close the bound argument list")?;
            Some(args)
        } else {
            None
        };
        Ok(Some(Composable {
            bindable,
            bind_arguments,
        }))
    }

    fn parse_composable_required(&mut self) -> Result<Composable, SyntacticError> {
        match self.parse_composable()? {
            Some(c) => Ok(c),
            None => {
                let tok = self.next_token();
                Err(SyntacticError::Expected {
                    expected: "composable expression after \">>\"".to_string(),
                    position: tok.position,
                })
            }
        }
    }

    /// `bindable = function_literal | identifier [ "(" arguments ")" ] | "(" func_expression ")"`.
    ///
    /// A function literal and a parenthesised func_expression both start with "(", and a
    /// parameter list reads exactly like a comma-separated sequence of bare identifiers — the
    /// same shape a single-composable func_expression can take. The two can't be told apart
    /// until we see whether a "{" follows the closing ")", so this one production gets genuine
    /// backtracking: try the parameter-list reading first, and if no block follows, rewind the
    /// lexer to the opening "(" and parse it as a parenthesised func_expression instead.
    fn parse_bindable(&mut self) -> Result<Option<Bindable>, SyntacticError> {
        if let Some(id_tok) = self.take(TokenKind::Identifier) {
            let position = id_tok.position;
            let name = id_tok.text().unwrap().to_string();
            if self.at(TokenKind::LParen) {
                let arguments = self.parse_arguments()?;
                self.expect(TokenKind::RParen, "\")\" to close the argument list")?;
                return Ok(Some(Bindable::Call(FunctionCall {
                    callee: name,
                    arguments,
                    position,
                })));
            }
            return Ok(Some(Bindable::Identifier { name, position }));
        }

        let Some(lparen) = self.take(TokenKind::LParen) else {
            return Ok(None);
        };
        let position = lparen.position;

        let mark = self.mark();
        let params_attempt = self.parse_parameters();
        if let Ok(parameters) = params_attempt {
            if self.at(TokenKind::RParen) && self.peek_kind() == TokenKind::LBrace {
                let body = self.parse_block()?;
                return Ok(Some(Bindable::FunctionLiteral(FunctionLiteral {
                    parameters,
                    body: Rc::new(body),
                    position,
                })));
            }
        }

        self.reset(mark);
        let fe = self.parse_func_expression_required()?;
        self.expect(TokenKind::RParen, "\")\" to close the function expression")?;
        Ok(Some(Bindable::FuncExpression(Box::new(fe))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Program {
        let (program, lex, syn) = parse(source);
        assert!(lex.is_empty(), "unexpected lexical diagnostics: {lex:?}");
        assert!(syn.is_none(), "unexpected syntactic diagnostic: {syn:?}");
        program
    }

    #[test]
    fn parses_empty_function() {
        let program = parse_ok("func Main() { }");
        assert_eq!(program.function_definitions.len(), 1);
        assert_eq!(program.function_definitions[0].identifier, "Main");
        assert!(program.function_definitions[0].body.statements.is_empty());
    }

    #[test]
    fn parses_parameters_with_mut() {
        let program = parse_ok("func f(a, mut b) { }");
        let params = &program.function_definitions[0].parameters;
        assert_eq!(params.len(), 2);
        assert!(!params[0].mutable);
        assert!(params[1].mutable);
    }

    #[test]
    fn rejects_immutable_declaration_without_initializer() {
        let (_, _, syn) = parse("func Main() { var x; }");
        assert!(syn.is_some());
    }

    #[test]
    fn accepts_mutable_declaration_without_initializer() {
        let program = parse_ok("func Main() { mut var x; }");
        let stmt = &program.function_definitions[0].body.statements[0];
        assert!(matches!(stmt, Statement::Declaration { mutable: true, initializer: None, .. }));
    }

    #[test]
    fn disambiguates_assignment_from_call() {
        let program = parse_ok("func Main() { a = 1; b(1, 2); }");
        let stmts = &program.function_definitions[0].body.statements;
        assert!(matches!(stmts[0], Statement::Assignment { .. }));
        assert!(matches!(stmts[1], Statement::FunctionCallStatement { .. }));
    }

    #[test]
    fn parses_conditional_with_else() {
        let program = parse_ok("func Main() { if (true) { } else { } }");
        assert!(matches!(
            program.function_definitions[0].body.statements[0],
            Statement::Conditional { else_block: Some(_), .. }
        ));
    }

    #[test]
    fn parses_while_loop() {
        let program = parse_ok("func Main() { while (a < 1) { a = a + 1; } }");
        assert!(matches!(
            program.function_definitions[0].body.statements[0],
            Statement::WhileLoop { .. }
        ));
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let program = parse_ok("func Main() { var x = 1 + 2 * 3; }");
        let Statement::Declaration { initializer: Some(Expression::Standard(se)), .. } =
            &program.function_definitions[0].body.statements[0]
        else {
            panic!("expected a standard expression declaration");
        };
        let additive = &se.conjunctions[0].relations[0].first;
        assert_eq!(additive.operators, vec![AddSub::Add]);
        assert_eq!(additive.rest[0].operators, vec![MulDiv::Mul]);
    }

    #[test]
    fn parses_function_literal_bindable() {
        let program = parse_ok("func Main() { var f = [(x) { return x; }]; }");
        let Statement::Declaration { initializer: Some(Expression::Func(fe)), .. } =
            &program.function_definitions[0].body.statements[0]
        else {
            panic!("expected a function expression declaration");
        };
        assert!(matches!(
            fe.composables[0].bindable,
            Bindable::FunctionLiteral(_)
        ));
    }

    #[test]
    fn parses_parenthesised_func_expression_composable() {
        let program = parse_ok("func Main() { var f = [(g) >> h]; }");
        let Statement::Declaration { initializer: Some(Expression::Func(fe)), .. } =
            &program.function_definitions[0].body.statements[0]
        else {
            panic!("expected a function expression declaration");
        };
        // "(g)" can't be told apart from a one-parameter function-literal head until the
        // lookahead past ")" fails to find "{" — by then it's re-parsed as a parenthesised
        // func_expression wrapping the single identifier "g", not a bare identifier.
        assert!(matches!(
            fe.composables[0].bindable,
            Bindable::FuncExpression(_)
        ));
        assert!(matches!(
            fe.composables[1].bindable,
            Bindable::Identifier { .. }
        ));
    }

    #[test]
    fn parses_bind_and_compose() {
        let program = parse_ok("func Main() { var f = [add << (1) >> negate]; }");
        let Statement::Declaration { initializer: Some(Expression::Func(fe)), .. } =
            &program.function_definitions[0].body.statements[0]
        else {
            panic!("expected a function expression declaration");
        };
        assert_eq!(fe.composables.len(), 2);
        assert!(fe.composables[0].bind_arguments.is_some());
    }

    #[test]
    fn parses_negated_and_parenthesised_factors() {
        let program = parse_ok("func Main() { var x = !(a == b); }");
        let Statement::Declaration { initializer: Some(Expression::Standard(se)), .. } =
            &program.function_definitions[0].body.statements[0]
        else {
            panic!("expected a standard expression declaration");
        };
        let factor = &se.conjunctions[0].relations[0].first.first.first;
        assert!(matches!(factor, Factor::Parenthesised { negated: true, .. }));
    }

    #[test]
    fn missing_closing_brace_is_fatal() {
        let (_, _, syn) = parse("func Main() { var x = 1;");
        assert!(syn.is_some());
    }

    #[test]
    fn terminating_lexical_error_surfaces_as_fatal_syntactic_error() {
        let long_name = "a".repeat(100);
        let source = format!("func Main() {{ var {long_name} = 1; }}");
        let (_, lex, syn) = parse(&source);
        assert!(lex.iter().any(|d| matches!(d, LexicalError::IdentifierTooLong { .. })));
        assert!(matches!(syn, Some(SyntacticError::Lexical(_))));
    }
}
