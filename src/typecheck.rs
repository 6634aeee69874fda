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

//! Semantic type checking over parsed expressions.

use crate::parser::{Expr, Span, TokenKind, ValueType};

/// A type rule violation. Spans point at the offending subexpression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error(
        "Unexpected type '{}' was provided, expected {}: {}",
        .actual,
        expected_display(.expected),
        .span
    )]
    Mismatch {
        expected: Vec<ValueType>,
        actual: ValueType,
        span: Span,
    },

    #[error("comparisons between scalars must use bool modifier")]
    ScalarComparisonWithoutBool { span: Span },

    #[error("set operator {op:?} not allowed in binary scalar expression")]
    SetOperatorInScalarExpression { op: TokenKind, span: Span },
}

fn expected_display(expected: &[ValueType]) -> String {
    expected
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn expect_one_of(actual: ValueType, expected: &[ValueType], span: Span) -> Result<(), TypeError> {
    if expected.contains(&actual) {
        return Ok(());
    }
    Err(TypeError::Mismatch {
        expected: expected.to_vec(),
        actual,
        span,
    })
}

/// Computes the value type of an expression, failing on the first rule
/// violation in a depth-first walk. Purely a function of the tree.
pub fn check_expr_type(expr: &Expr) -> Result<ValueType, TypeError> {
    match expr {
        Expr::NumberLiteral(_) => Ok(ValueType::Scalar),
        Expr::StringLiteral(_) => Ok(ValueType::String),
        Expr::VectorSelector(_) => Ok(ValueType::Vector),
        Expr::MatrixSelector(_) => Ok(ValueType::Matrix),
        Expr::Paren(e) => check_expr_type(&e.expr),
        Expr::Offset(e) => check_expr_type(&e.expr),
        Expr::Unary(e) => {
            let t = check_expr_type(&e.expr)?;
            expect_one_of(t, &[ValueType::Scalar, ValueType::Vector], e.expr.span())?;
            Ok(t)
        }
        Expr::Subquery(e) => {
            let t = check_expr_type(&e.expr)?;
            expect_one_of(t, &[ValueType::Vector], e.expr.span())?;
            Ok(ValueType::Matrix)
        }
        Expr::Call(e) => {
            for (i, arg) in e.args.iter().enumerate() {
                let actual = check_expr_type(arg)?;
                // Variadic functions repeat their final argument type.
                let expected = match e.func.arg_types.get(i).or(e.func.arg_types.last()) {
                    Some(t) => *t,
                    None => continue,
                };
                expect_one_of(actual, &[expected], arg.span())?;
            }
            Ok(e.func.return_type)
        }
        Expr::Aggregate(e) => {
            if let Some(parameter_type) = e.op.parameter_type {
                match &e.param {
                    Some(param) => {
                        let t = check_expr_type(param)?;
                        expect_one_of(t, &[parameter_type], param.span())?;
                    }
                    None => {
                        return Err(TypeError::Mismatch {
                            expected: vec![parameter_type],
                            actual: ValueType::None,
                            span: e.span,
                        })
                    }
                }
            }
            let t = check_expr_type(&e.expr)?;
            expect_one_of(t, &[ValueType::Vector], e.expr.span())?;
            Ok(ValueType::Vector)
        }
        Expr::Binary(e) => {
            let lt = check_expr_type(&e.lhs)?;
            let rt = check_expr_type(&e.rhs)?;
            expect_one_of(lt, &[ValueType::Scalar, ValueType::Vector], e.lhs.span())?;
            expect_one_of(rt, &[ValueType::Scalar, ValueType::Vector], e.rhs.span())?;

            let both_scalar = lt == ValueType::Scalar && rt == ValueType::Scalar;
            if e.op.is_comparison_operator() && both_scalar && !e.return_bool() {
                return Err(TypeError::ScalarComparisonWithoutBool { span: e.span });
            }
            if e.op.is_set_operator() && (lt == ValueType::Scalar || rt == ValueType::Scalar) {
                return Err(TypeError::SetOperatorInScalarExpression {
                    op: e.op,
                    span: e.span,
                });
            }

            if both_scalar {
                Ok(ValueType::Scalar)
            } else {
                Ok(ValueType::Vector)
            }
        }
    }
}
