// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use promql_syntax::label::{MatchOp, Matcher, Matchers};
use promql_syntax::parser::{
    get_aggregate, get_function, parse, AggregateExpr, BinaryExpr, Call, Expr, MatrixSelector,
    MetricIdentifier, OffsetExpr, ParenExpr, Span, StringLiteral, SubqueryExpr, TokenKind,
    UnaryExpr, ValueType, VectorMatchCardinality, VectorMatching, VectorSelector,
};
use promql_syntax::typecheck::check_expr_type;
use promql_syntax::util::Duration;

fn selector(name: &str) -> VectorSelector {
    VectorSelector {
        metric: Some(MetricIdentifier::new(name)),
        matchers: Matchers::empty(),
        span: Span::NONE,
    }
}

fn rate_of(name: &str, range: Duration) -> Expr {
    Expr::Call(Call {
        func: get_function("rate").unwrap(),
        args: vec![Expr::MatrixSelector(MatrixSelector {
            vector_selector: selector(name),
            range,
            span: Span::NONE,
        })],
        span: Span::NONE,
    })
}

fn sum_by(grouping: Vec<&str>, expr: Expr) -> Expr {
    Expr::Aggregate(AggregateExpr {
        op: get_aggregate("sum").unwrap(),
        expr: Box::new(expr),
        param: None,
        grouping: grouping.into_iter().map(String::from).collect(),
        without: false,
        span: Span::NONE,
    })
}

#[test]
fn test_cpu_ratio_query() {
    let input = "sum by(job, mode) (rate(node_cpu_seconds_total[1m])) / on(job) group_left sum by(job)(rate(node_cpu_seconds_total[1m]))";
    let expr = parse(input).unwrap();

    let expected = Expr::Binary(BinaryExpr {
        op: TokenKind::Div,
        lhs: Box::new(sum_by(
            vec!["job", "mode"],
            rate_of("node_cpu_seconds_total", Duration::MINUTE),
        )),
        rhs: Box::new(sum_by(
            vec!["job"],
            rate_of("node_cpu_seconds_total", Duration::MINUTE),
        )),
        matching: Some(VectorMatching {
            card: VectorMatchCardinality::ManyToOne,
            matching: vec!["job".into()],
            on: true,
            include: vec![],
            return_bool: false,
        }),
        span: Span::NONE,
    });

    assert_eq!(expected, expr);
    assert_eq!(check_expr_type(&expr), Ok(ValueType::Vector));
}

#[test]
fn test_scalar_comparisons() {
    let expr = parse("1 > bool 1").unwrap();
    assert_eq!(check_expr_type(&expr), Ok(ValueType::Scalar));

    let expr = parse("1 > 1").unwrap();
    assert_eq!(
        check_expr_type(&expr).unwrap_err().to_string(),
        "comparisons between scalars must use bool modifier"
    );
}

#[test]
fn test_set_operator_with_scalar_operand() {
    let expr = parse("first_vector and 1").unwrap();
    assert_eq!(
        check_expr_type(&expr).unwrap_err().to_string(),
        "set operator And not allowed in binary scalar expression"
    );
}

#[test]
fn test_range_function_with_instant_vector() {
    let expr = parse("sum_over_time(instant_vector)").unwrap();
    assert_eq!(
        check_expr_type(&expr).unwrap_err().to_string(),
        "Unexpected type 'instant vector' was provided, expected range vector: 14 (line 1, column 15)"
    );
}

#[test]
fn test_subquery_with_offset() {
    let expr = parse("metric[ 1h:1m ] offset 1w").unwrap();

    let expected = Expr::Offset(OffsetExpr {
        expr: Box::new(Expr::Subquery(SubqueryExpr {
            expr: Box::new(Expr::VectorSelector(selector("metric"))),
            range: Duration::HOUR,
            step: Some(Duration::MINUTE),
            span: Span::NONE,
        })),
        offset: Duration::WEEK,
        span: Span::NONE,
    });

    assert_eq!(expected, expr);
    assert_eq!(check_expr_type(&expr), Ok(ValueType::Matrix));
}

#[test]
fn test_nested_subquery_sum() {
    let input =
        "(another_metric{one='test',two!='test2'}[1h][1d:5m]) + -vector(this_is_a_metric offset 5m)";
    let expr = parse(input).unwrap();

    let lhs = Expr::Paren(ParenExpr {
        expr: Box::new(Expr::Subquery(SubqueryExpr {
            expr: Box::new(Expr::MatrixSelector(MatrixSelector {
                vector_selector: VectorSelector {
                    metric: Some(MetricIdentifier::new("another_metric")),
                    matchers: Matchers::new(vec![
                        Matcher::new("one", MatchOp::Equal, StringLiteral::new('\'', "test"))
                            .unwrap(),
                        Matcher::new("two", MatchOp::NotEqual, StringLiteral::new('\'', "test2"))
                            .unwrap(),
                    ]),
                    span: Span::NONE,
                },
                range: Duration::HOUR,
                span: Span::NONE,
            })),
            range: Duration::DAY,
            step: Some(Duration::MINUTE * 5),
            span: Span::NONE,
        })),
        span: Span::NONE,
    });

    let rhs = Expr::Unary(UnaryExpr {
        op: TokenKind::Sub,
        expr: Box::new(Expr::Call(Call {
            func: get_function("vector").unwrap(),
            args: vec![Expr::Offset(OffsetExpr {
                expr: Box::new(Expr::VectorSelector(selector("this_is_a_metric"))),
                offset: Duration::MINUTE * 5,
                span: Span::NONE,
            })],
            span: Span::NONE,
        })),
        span: Span::NONE,
    });

    let expected = Expr::Binary(BinaryExpr {
        op: TokenKind::Add,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        matching: None,
        span: Span::NONE,
    });

    assert_eq!(expected, expr);

    let printed = expr.to_string();
    assert_eq!(
        printed,
        "(another_metric{one='test',two!='test2'}[1h][1d:5m]) + -vector(this_is_a_metric offset 5m)"
    );
    assert_eq!(parse(&printed).unwrap(), expr);
}

#[test]
fn test_round_trip_well_typed_expressions() {
    let inputs = vec![
        "up",
        "up{job=\"api\",mode!='idle'}",
        "{__name__=~'job:.*'}",
        "rate(requests_total[5m])",
        "sum by (job) (rate(requests_total[5m]))",
        "sum without (instance) (up)",
        "topk(5, up)",
        "count_values('version', build_info)",
        "1 + 2 * 3",
        "up > bool 0",
        "a / on (job) group_left (instance) b",
        "a unless ignoring (mode) b",
        "up offset 5m",
        "up offset -5m",
        "up[30m:1m]",
        "rate(up[5m])[30m:]",
        "clamp(up, 0, 1)",
        "-up",
        "avg(rate(errors_total[10m])) > bool 0.5",
    ];
    for input in inputs {
        let first = parse(input).unwrap_or_else(|e| panic!("{input}: {e}"));
        check_expr_type(&first).unwrap_or_else(|e| panic!("{input}: {e}"));

        let printed = first.to_string();
        let second = parse(&printed).unwrap_or_else(|e| panic!("{printed}: {e}"));
        assert_eq!(first, second, "round trip changed {input} (printed {printed})");
        assert_eq!(printed, second.to_string(), "printing {input} is not idempotent");
        assert_eq!(check_expr_type(&first), check_expr_type(&second));
    }
}

#[test]
fn test_keywords_as_label_names() {
    let keywords = vec![
        "sum", "avg", "count", "min", "max", "group", "stddev", "stdvar", "topk", "bottomk",
        "count_values", "quantile", "rate", "vector", "and", "or", "unless", "atan2", "by",
        "without", "on", "ignoring", "group_left", "group_right", "bool", "offset",
    ];
    for keyword in keywords {
        let input = format!("{{__name__='{keyword}'}}");
        match parse(&input).unwrap_or_else(|e| panic!("{input}: {e}")) {
            Expr::VectorSelector(vs) => {
                assert_eq!(vs.matchers.len(), 1, "wrong matcher count for {input}");
            }
            other => panic!("{input} parsed to {other:?}"),
        }

        // And as the matcher name itself.
        let input = format!("{{{keyword}='x'}}");
        match parse(&input).unwrap_or_else(|e| panic!("{input}: {e}")) {
            Expr::VectorSelector(vs) => {
                assert_eq!(vs.matchers.matchers[0].name, keyword);
            }
            other => panic!("{input} parsed to {other:?}"),
        }
    }
}

#[test]
fn test_negative_duration_only_after_offset() {
    assert!(parse("up offset -5m").is_ok());
    assert!(parse("up[-5m]").is_err());
    assert!(parse("up[1h:-1m]").is_err());
}

#[test]
fn test_span_containment() {
    let input = "sum by (job) (rate(up[5m])) / on (job) count(up offset 1h)";
    let expr = parse(input).unwrap();

    struct Containment {
        ok: bool,
    }
    impl promql_syntax::util::ExprVisitor for Containment {
        type Error = ();

        fn pre_visit(&mut self, expr: &Expr) -> Result<bool, ()> {
            let span = expr.span();
            let children: Vec<Span> = match expr {
                Expr::Binary(e) => vec![e.lhs.span(), e.rhs.span()],
                Expr::Aggregate(e) => vec![e.expr.span()],
                Expr::Call(e) => e.args.iter().map(|a| a.span()).collect(),
                Expr::Paren(e) => vec![e.expr.span()],
                Expr::Subquery(e) => vec![e.expr.span()],
                Expr::Offset(e) => vec![e.expr.span()],
                Expr::Unary(e) => vec![e.expr.span()],
                _ => vec![],
            };
            for child in children {
                if !(span.offset <= child.offset
                    && child.offset + child.length <= span.offset + span.length)
                {
                    self.ok = false;
                }
            }
            Ok(true)
        }
    }

    let mut visitor = Containment { ok: true };
    promql_syntax::util::walk_expr(&mut visitor, &expr).unwrap();
    assert!(visitor.ok, "a child span escapes its parent");
}
