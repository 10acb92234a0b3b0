use super::*;

fn parse(source: &str) -> (Program, Interner) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program().unwrap();
    (program, parser.into_interner())
}

fn first_method(program: &Program) -> &MethodDecl {
    program
        .declarations
        .iter()
        .find_map(|d| match d {
            Decl::Method(m) => Some(m),
            _ => None,
        })
        .expect("program has a method")
}

#[test]
fn parse_int_literal() {
    let mut parser = Parser::new("42");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::IntLiteral(n) => assert_eq!(n, 42),
        _ => panic!("expected int literal"),
    }
}

#[test]
fn negative_literal_is_folded() {
    let mut parser = Parser::new("-2147483648");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::IntLiteral(n) => assert_eq!(n, i32::MIN),
        _ => panic!("expected folded literal"),
    }
}

#[test]
fn positive_literal_out_of_range() {
    let mut parser = Parser::new("2147483648");
    let err = parser.parse_expression().unwrap_err();
    assert!(matches!(err.error, ParserError::IntegerOutOfRange { .. }));
}

#[test]
fn parse_precedence() {
    // 1 + 2 * 3 should be 1 + (2 * 3)
    let mut parser = Parser::new("1 + 2 * 3");
    let expr = parser.parse_expression().unwrap();
    match expr.kind {
        ExprKind::Binary(bin) => {
            assert_eq!(bin.op, BinaryOp::Add);
            match bin.right.kind {
                ExprKind::Binary(inner) => assert_eq!(inner.op, BinaryOp::Mul),
                _ => panic!("expected binary on right"),
            }
        }
        _ => panic!("expected binary"),
    }
}

#[test]
fn logical_operators_bind_looser_than_comparisons() {
    let mut parser = Parser::new("a < b && c == d || e");
    let expr = parser.parse_expression().unwrap();
    let ExprKind::Binary(or) = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(or.op, BinaryOp::Or);
    let ExprKind::Binary(and) = or.left.kind else {
        panic!("expected binary");
    };
    assert_eq!(and.op, BinaryOp::And);
}

#[test]
fn postfix_chain() {
    let mut parser = Parser::new("t.pos[i].Length");
    let expr = parser.parse_expression().unwrap();
    let ExprKind::Field(length) = expr.kind else {
        panic!("expected field access");
    };
    assert!(matches!(length.object.kind, ExprKind::Index(_)));
}

#[test]
fn node_ids_are_unique() {
    let mut parser = Parser::new("f(a, b + c)");
    let expr = parser.parse_expression().unwrap();
    let ExprKind::Call(call) = &expr.kind else {
        panic!("expected call");
    };
    let mut ids = vec![expr.id, call.callee.id];
    ids.extend(call.args.iter().map(|a| a.value.id));
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn parse_program_with_all_member_kinds() {
    let source = r#"
        using CbRuntime;
        public class Sample {
            public const int size = 10;
            public const string greeting = "hi";
            public struct Pair { public int a, b; }
            public static int sum(Pair p) { return p.a + p.b; }
            public static void Main() { }
        }
    "#;
    let (program, interner) = parse(source);
    assert_eq!(program.usings.len(), 1);
    assert_eq!(interner.resolve(program.class_name), "Sample");
    assert_eq!(program.declarations.len(), 5);

    let Decl::Struct(pair) = &program.declarations[2] else {
        panic!("expected struct");
    };
    assert_eq!(pair.fields[0].names.len(), 2);

    let method = first_method(&program);
    assert_eq!(interner.resolve(method.name), "sum");
    assert_eq!(method.span.line, 7);
}

#[test]
fn statements_of_every_kind() {
    let source = r#"
        class P {
            static void Main() {
                int x, y;
                Pair p;
                Pair[] ps;
                x = 1;
                x++;
                y--;
                cbio.read(out x);
                if (x > 0) cbio.write(x); else ;
                while (true) { break; }
                ps[0].a = 3;
                return;
            }
        }
    "#;
    let (program, _) = parse(source);
    let body = &first_method(&program).body;
    let kinds: Vec<&str> = body
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::LocalDecl(_) => "decl",
            Stmt::Assign(_) => "assign",
            Stmt::Call(_) => "call",
            Stmt::Increment(_) => "inc",
            Stmt::Decrement(_) => "dec",
            Stmt::If(_) => "if",
            Stmt::While(_) => "while",
            Stmt::Break(_) => "break",
            Stmt::Return(_) => "return",
            Stmt::Block(_) => "block",
            Stmt::Empty(_) => "empty",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "decl", "decl", "decl", "assign", "inc", "dec", "call", "if", "while", "assign",
            "return"
        ]
    );

    let Stmt::Call(read) = &body.stmts[6] else {
        panic!("expected call");
    };
    let ExprKind::Call(call) = &read.call.kind else {
        panic!("expected call expression");
    };
    assert!(call.args[0].out);
}

#[test]
fn new_expressions() {
    let mut parser = Parser::new("new int[n * 2]");
    let expr = parser.parse_expression().unwrap();
    assert!(matches!(expr.kind, ExprKind::NewArray(_)));

    let mut parser = Parser::new("new Pair()");
    let expr = parser.parse_expression().unwrap();
    assert!(matches!(expr.kind, ExprKind::NewStruct(_)));
}

#[test]
fn non_literal_const_is_rejected() {
    let mut parser = Parser::new("class P { const int x = 1 + 2; }");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::ExpectedLiteral { .. }));
}

#[test]
fn expression_statement_must_have_effect() {
    let mut parser = Parser::new("class P { static void Main() { x + 1; } }");
    let err = parser.parse_program().unwrap_err();
    assert!(matches!(err.error, ParserError::InvalidStatement { .. }));
}

#[test]
fn missing_semicolon_reports_expected_token() {
    let mut parser = Parser::new("class P { static void Main() { x = 1 } }");
    let err = parser.parse_program().unwrap_err();
    match err.error {
        ParserError::ExpectedToken { expected, found, .. } => {
            assert_eq!(expected, ";");
            assert_eq!(found, "}");
        }
        other => panic!("unexpected error {:?}", other),
    }
}
