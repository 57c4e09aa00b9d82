// ABOUTME: Black-box pipeline tests: literal source text through lex -> parse -> interpret

use miniflow::env::Scope;
use miniflow::error::SemanticError;
use miniflow::interpreter;
use miniflow::parser::parse;
use miniflow::value::Value;

fn run(source: &str) -> Result<(String, miniflow::env::ScopeRef), SemanticError> {
    let (program, lexical, syntactic) = parse(source);
    assert!(lexical.is_empty(), "unexpected lexical diagnostics: {lexical:?}");
    assert!(syntactic.is_none(), "unexpected syntactic diagnostic: {syntactic:?}");
    let mut out = Vec::new();
    let scope = interpreter::run(&program, &mut out)?;
    Ok((String::from_utf8(out).unwrap(), scope))
}

#[test]
fn hello_arithmetic() {
    let (trace, scope) = run("func Main(){ var a = 40 + 2; }").unwrap();
    assert!(trace.contains("Declaration a = 42"));
    assert!(matches!(Scope::get(&scope, "a"), Some(Value::Int(42))));
}

#[test]
fn conditional_and_while_loop_reach_exact_count() {
    let source = "func Main(){ mut var i = 0; while(i < 3){ i = i + 1; } }";
    let (_, scope) = run(source).unwrap();
    assert!(matches!(Scope::get(&scope, "i"), Some(Value::Int(3))));
}

#[test]
fn recursive_factorial() {
    let source = "func Factorial(n){ if(n <= 1){ return 1; } return n * Factorial(n - 1); } \
                   func Main(){ var x = Factorial(5); }";
    let (_, scope) = run(source).unwrap();
    assert!(matches!(Scope::get(&scope, "x"), Some(Value::Int(120))));
}

#[test]
fn partial_application_binds_leading_arguments() {
    let source = "func Add(a, b){ return a + b; } \
                   func Main(){ var f = [Add << (10)]; var y = f(5); }";
    let (_, scope) = run(source).unwrap();
    assert!(matches!(Scope::get(&scope, "y"), Some(Value::Int(15))));
}

#[test]
fn composition_pipes_left_result_into_right() {
    let source = "func Inc(x){ return x + 1; } func Double(x){ return x * 2; } \
                   func Main(){ var g = [Inc >> Double]; var z = g(3); }";
    let (_, scope) = run(source).unwrap();
    assert!(matches!(Scope::get(&scope, "z"), Some(Value::Int(8))));
}

#[test]
fn string_replication_by_int() {
    let (_, scope) = run("func Main(){ var s = 3 * \"ab\"; }").unwrap();
    assert!(matches!(Scope::get(&scope, "s"), Some(Value::Str(ref s)) if s == "ababab"));
}

#[test]
fn string_replication_by_zero_is_empty() {
    let (_, scope) = run("func Main(){ var s = 0 * \"ab\"; }").unwrap();
    assert!(matches!(Scope::get(&scope, "s"), Some(Value::Str(ref s)) if s.is_empty()));
}

#[test]
fn string_replication_by_negative_is_fatal() {
    let err = run("func Main(){ var s = -1 * \"ab\"; }").unwrap_err();
    assert!(matches!(err, SemanticError::TypeNotCoercible { .. }));
}

#[test]
fn assignment_to_immutable_variable_is_fatal() {
    let err = run("func Main(){ var a = 1; a = 2; }").unwrap_err();
    assert!(matches!(err, SemanticError::AssignmentToImmutable { .. }));
}

#[test]
fn missing_main_is_fatal() {
    let err = run("func NotMain(){}").unwrap_err();
    assert!(matches!(err, SemanticError::MainNotFound));
}

#[test]
fn integer_max_value_is_accepted() {
    let source = format!("func Main(){{ var a = {}; }}", i64::MAX);
    let (_, scope) = run(&source).unwrap();
    assert!(matches!(Scope::get(&scope, "a"), Some(Value::Int(n)) if n == i64::MAX));
}

#[test]
fn identifier_at_max_length_is_accepted_and_over_is_rejected() {
    let at_max = "a".repeat(45);
    let source = format!("func Main(){{ var {at_max} = 1; }}");
    let (program, lexical, syntactic) = parse(&source);
    assert!(lexical.is_empty());
    assert!(syntactic.is_none());
    assert_eq!(program.function_definitions.len(), 1);

    let over_max = "a".repeat(46);
    let source = format!("func Main(){{ var {over_max} = 1; }}");
    let (_, lexical, _) = parse(&source);
    assert!(lexical
        .iter()
        .any(|e| e.kind_name() == "IdentifierTooLong"));
}

#[test]
fn leading_zero_multi_digit_number_is_invalid() {
    let (_, lexical, _) = parse("func Main(){ var a = 042; }");
    assert!(lexical.iter().any(|e| e.kind_name() == "InvalidNumber"));
}

#[test]
fn bare_zero_and_leading_zero_before_dot_are_accepted() {
    let (_, lexical, _) = parse("func Main(){ var a = 0; var b = 0.5; }");
    assert!(lexical.is_empty());
}

#[test]
fn unclosed_string_literal_is_fatal() {
    let (_, lexical, _) = parse("func Main(){ var a = \"unterminated; }");
    assert!(lexical
        .iter()
        .any(|e| e.kind_name() == "IncompleteStringLiteral"));
}

#[test]
fn addition_is_commutative_but_subtraction_is_not() {
    use miniflow::token::Position;
    let pos = Position::start();
    let a = Value::Int(3).add(&Value::Int(4), pos).unwrap();
    let b = Value::Int(4).add(&Value::Int(3), pos).unwrap();
    assert!(matches!((a, b), (Value::Int(x), Value::Int(y)) if x == y));

    let a = Value::Int(3).sub(&Value::Int(4), pos).unwrap();
    let b = Value::Int(4).sub(&Value::Int(3), pos).unwrap();
    assert!(!matches!((a, b), (Value::Int(x), Value::Int(y)) if x == y));
}

#[test]
fn double_negation_matches_bool_coercion() {
    let (_, scope) = run("func Main(){ var a = !!true; var b = !!false; }").unwrap();
    assert!(matches!(Scope::get(&scope, "a"), Some(Value::Bool(true))));
    assert!(matches!(Scope::get(&scope, "b"), Some(Value::Bool(false))));
}
