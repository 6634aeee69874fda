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

use crate::label::Matchers;
use crate::parser::token::{Span, TokenKind};
use crate::parser::{AggregateOperator, Function, Value, ValueType};
use crate::util::duration::Duration;
use crate::util::float;

/// How elements of two vectors are matched in a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum VectorMatchCardinality {
    OneToOne,
    ManyToOne,
    OneToMany,
}

/// VectorMatching describes how elements from two Vectors in a binary
/// operation are supposed to be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct VectorMatching {
    pub card: VectorMatchCardinality,
    /// Labels to match on (`on`) or to ignore (`ignoring`).
    pub matching: Vec<String>,
    pub on: bool,
    /// Labels copied from the "one" side; non-empty only for
    /// many-to-one and one-to-many matching.
    pub include: Vec<String>,
    /// Comparison operators return 0/1 rather than filtering.
    pub return_bool: bool,
}

impl VectorMatching {
    pub fn new(card: VectorMatchCardinality) -> Self {
        Self {
            card,
            matching: vec![],
            on: false,
            include: vec![],
            return_bool: false,
        }
    }

    pub fn is_default(&self) -> bool {
        self.card == VectorMatchCardinality::OneToOne
            && self.matching.is_empty()
            && !self.on
            && self.include.is_empty()
            && !self.return_bool
    }
}

impl Default for VectorMatching {
    fn default() -> Self {
        Self::new(VectorMatchCardinality::OneToOne)
    }
}

/// The name part of a vector selector, e.g. `node_cpu_seconds_total` or a
/// recording rule name such as `job:request_rate:sum`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct MetricIdentifier {
    pub name: String,
}

impl MetricIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// <aggr-op> [without|by (<label list>)] ([parameter,] <vector expression>)
/// or
/// <aggr-op> ([parameter,] <vector expression>) [without|by (<label list>)]
///
/// parameter is only required for count_values, quantile, topk and bottomk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct AggregateExpr {
    /// The used aggregation operation.
    pub op: AggregateOperator,
    /// The Vector expression over which is aggregated.
    pub expr: Box<Expr>,
    /// Parameter used by some aggregators.
    pub param: Option<Box<Expr>>,
    /// The labels by which to group the Vector.
    pub grouping: Vec<String>,
    /// Whether to drop the given labels rather than keep them.
    pub without: bool,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct UnaryExpr {
    /// Either `+` or `-`.
    pub op: TokenKind,
    pub expr: Box<Expr>,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct BinaryExpr {
    pub op: TokenKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    /// The matching behavior for the operation. `None` when no modifier
    /// was written.
    pub matching: Option<VectorMatching>,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

impl BinaryExpr {
    pub fn return_bool(&self) -> bool {
        self.matching.as_ref().map_or(false, |m| m.return_bool)
    }
}

/// Paren wraps an expression so it cannot be disassembled as a consequence
/// of operator precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

/// `<expr>[<range>:<step>]`, evaluating an instant-vector expression over a
/// range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct SubqueryExpr {
    pub expr: Box<Expr>,
    pub range: Duration,
    /// `None` means the evaluation default step.
    pub step: Option<Duration>,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

/// `<expr> offset <duration>`. The duration is negative for lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct OffsetExpr {
    pub expr: Box<Expr>,
    pub offset: Duration,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct NumberLiteral {
    pub val: f64,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

impl NumberLiteral {
    pub fn new(val: f64) -> Self {
        Self {
            val,
            span: Span::NONE,
        }
    }
}

impl PartialEq for NumberLiteral {
    fn eq(&self, other: &Self) -> bool {
        float::f64_equals(self.val, other.val)
    }
}

impl Eq for NumberLiteral {}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct StringLiteral {
    /// The quote style this literal was written in: `"`, `'` or a backtick.
    pub quote: char,
    pub val: String,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

impl StringLiteral {
    pub fn new(quote: char, val: impl Into<String>) -> Self {
        Self {
            quote,
            val: val.into(),
            span: Span::NONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct VectorSelector {
    pub metric: Option<MetricIdentifier>,
    pub matchers: Matchers,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

impl VectorSelector {
    /// The metric name, or the empty string for a pure matcher selector.
    pub fn name(&self) -> &str {
        self.metric.as_ref().map_or("", |m| m.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct MatrixSelector {
    pub vector_selector: VectorSelector,
    pub range: Duration,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

/// Call represents a function call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct Call {
    pub func: Function,
    pub args: Vec<Expr>,
    #[cfg_attr(feature = "ser", serde(skip))]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum Expr {
    /// Aggregate represents an aggregation operation on a Vector.
    Aggregate(AggregateExpr),

    /// Unary represents a unary operation on another expression.
    Unary(UnaryExpr),

    /// Binary represents a binary expression between two child expressions.
    Binary(BinaryExpr),

    Paren(ParenExpr),

    Subquery(SubqueryExpr),

    /// Offset shifts an instant or range selector in time.
    Offset(OffsetExpr),

    NumberLiteral(NumberLiteral),

    StringLiteral(StringLiteral),

    VectorSelector(VectorSelector),

    MatrixSelector(MatrixSelector),

    /// Call represents a function call.
    Call(Call),
}

impl Expr {
    pub fn new_vector_selector(
        metric: Option<MetricIdentifier>,
        matchers: Matchers,
    ) -> Result<Self, String> {
        if metric.is_none() && matchers.is_empty() {
            return Err("vector selector must contain at least one matcher or a metric name".into());
        }
        if let Some(metric) = &metric {
            if !crate::label::is_valid_metric_name(&metric.name) {
                return Err(format!("invalid metric name: {}", metric.name));
            }
        }
        Ok(Self::VectorSelector(VectorSelector {
            metric,
            matchers,
            span: Span::NONE,
        }))
    }

    pub fn new_unary_expr(expr: Expr, op: TokenKind) -> Result<Self, String> {
        if op != TokenKind::Add && op != TokenKind::Sub {
            return Err(format!("unary expression only supports + or -, got {op}"));
        }
        // A signed number literal is a plain number, not a unary node.
        let ue = match expr {
            Expr::NumberLiteral(NumberLiteral { val, span }) => {
                let val = if op == TokenKind::Sub { -val } else { val };
                Expr::NumberLiteral(NumberLiteral { val, span })
            }
            _ => Expr::Unary(UnaryExpr {
                op,
                expr: Box::new(expr),
                span: Span::NONE,
            }),
        };
        Ok(ue)
    }

    pub fn new_subquery_expr(
        expr: Expr,
        range: Duration,
        step: Option<Duration>,
    ) -> Result<Self, String> {
        Ok(Expr::Subquery(SubqueryExpr {
            expr: Box::new(expr),
            range,
            step,
            span: Span::NONE,
        }))
    }

    pub fn new_paren_expr(expr: Expr) -> Result<Self, String> {
        Ok(Expr::Paren(ParenExpr {
            expr: Box::new(expr),
            span: Span::NONE,
        }))
    }

    pub fn new_number_literal(val: f64) -> Result<Self, String> {
        Ok(Expr::NumberLiteral(NumberLiteral::new(val)))
    }

    pub fn new_string_literal(quote: char, val: impl Into<String>) -> Result<Self, String> {
        Ok(Expr::StringLiteral(StringLiteral::new(quote, val)))
    }

    pub fn new_matrix_selector(expr: Expr, range: Duration) -> Result<Self, String> {
        match expr {
            Expr::Offset(_) => Err("no offset modifiers allowed before range".into()),
            Expr::VectorSelector(vs) => Ok(Expr::MatrixSelector(MatrixSelector {
                vector_selector: vs,
                range,
                span: Span::NONE,
            })),
            _ => Err("ranges only allowed for vector selectors".into()),
        }
    }

    /// Attaches an offset modifier. Only selectors and subqueries can be
    /// offset, and only once.
    pub fn offset_expr(self, offset: Duration) -> Result<Self, String> {
        match self {
            Expr::VectorSelector(_) | Expr::MatrixSelector(_) | Expr::Subquery(_) => {
                Ok(Expr::Offset(OffsetExpr {
                    expr: Box::new(self),
                    offset,
                    span: Span::NONE,
                }))
            }
            Expr::Offset(_) => Err("offset may not be set multiple times".into()),
            _ => Err(
                "offset modifier must be preceded by an instant vector selector or range vector selector or a subquery"
                    .into(),
            ),
        }
    }

    pub fn new_call(func: Function, args: Vec<Expr>) -> Result<Expr, String> {
        Ok(Expr::Call(Call {
            func,
            args,
            span: Span::NONE,
        }))
    }

    pub fn new_binary_expr(
        lhs: Expr,
        op: TokenKind,
        matching: Option<VectorMatching>,
        rhs: Expr,
    ) -> Result<Expr, String> {
        if !op.is_operator() {
            return Err(format!("{op} is not a binary operator"));
        }
        Ok(Expr::Binary(BinaryExpr {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            matching,
            span: Span::NONE,
        }))
    }

    pub fn new_aggregate_expr(
        op: AggregateOperator,
        grouping: Vec<String>,
        without: bool,
        args: Vec<Expr>,
    ) -> Result<Expr, String> {
        if args.is_empty() {
            return Err("no arguments for aggregate expression provided".into());
        }

        let mut desired_args_count = 1;
        if op.parameter_type.is_some() {
            desired_args_count = 2;
        }
        if args.len() != desired_args_count {
            return Err(format!(
                "wrong number of arguments for aggregate expression provided, expected {}, got {}",
                desired_args_count,
                args.len()
            ));
        }

        let mut args = args.into_iter();
        let param = if desired_args_count == 2 {
            args.next().map(Box::new)
        } else {
            None
        };
        let expr = args
            .next()
            .map(Box::new)
            .ok_or_else(|| "no arguments for aggregate expression provided".to_string())?;

        Ok(Expr::Aggregate(AggregateExpr {
            op,
            expr,
            param,
            grouping,
            without,
            span: Span::NONE,
        }))
    }

    /// The source span this expression covers, or [Span::NONE] for nodes
    /// built outside the parser.
    pub fn span(&self) -> Span {
        match self {
            Expr::Aggregate(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Subquery(e) => e.span,
            Expr::Offset(e) => e.span,
            Expr::NumberLiteral(e) => e.span,
            Expr::StringLiteral(e) => e.span,
            Expr::VectorSelector(e) => e.span,
            Expr::MatrixSelector(e) => e.span,
            Expr::Call(e) => e.span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        match &mut self {
            Expr::Aggregate(e) => e.span = span,
            Expr::Unary(e) => e.span = span,
            Expr::Binary(e) => e.span = span,
            Expr::Paren(e) => e.span = span,
            Expr::Subquery(e) => e.span = span,
            Expr::Offset(e) => e.span = span,
            Expr::NumberLiteral(e) => e.span = span,
            Expr::StringLiteral(e) => e.span = span,
            Expr::VectorSelector(e) => e.span = span,
            Expr::MatrixSelector(e) => e.span = span,
            Expr::Call(e) => e.span = span,
        }
        self
    }
}

impl Value for Expr {
    /// The value type an expression produces, derived from its structure.
    fn value_type(&self) -> ValueType {
        match self {
            Expr::Aggregate(_) => ValueType::Vector,
            Expr::Unary(e) => e.expr.value_type(),
            Expr::Binary(e) => {
                if e.lhs.value_type() == ValueType::Scalar
                    && e.rhs.value_type() == ValueType::Scalar
                {
                    ValueType::Scalar
                } else {
                    ValueType::Vector
                }
            }
            Expr::Paren(e) => e.expr.value_type(),
            Expr::Subquery(_) => ValueType::Matrix,
            Expr::Offset(e) => e.expr.value_type(),
            Expr::NumberLiteral(_) => ValueType::Scalar,
            Expr::StringLiteral(_) => ValueType::String,
            Expr::VectorSelector(_) => ValueType::Vector,
            Expr::MatrixSelector(_) => ValueType::Matrix,
            Expr::Call(e) => e.func.return_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Matcher;
    use crate::parser::{get_aggregate, get_function};

    fn bare_selector(name: &str) -> Expr {
        Expr::new_vector_selector(Some(MetricIdentifier::new(name)), Matchers::empty()).unwrap()
    }

    #[test]
    fn test_vector_selector_needs_name_or_matcher() {
        assert!(Expr::new_vector_selector(None, Matchers::empty()).is_err());
        assert!(bare_selector("up") == bare_selector("up"));
        let only_matchers = Expr::new_vector_selector(
            None,
            Matchers::new(vec![Matcher::equal("job", "api").unwrap()]),
        );
        assert!(only_matchers.is_ok());
        assert_eq!(
            Expr::new_vector_selector(Some(MetricIdentifier::new("1bad")), Matchers::empty())
                .unwrap_err(),
            "invalid metric name: 1bad"
        );
    }

    #[test]
    fn test_unary_folds_numbers() {
        let neg = Expr::new_unary_expr(
            Expr::new_number_literal(1.5).unwrap(),
            TokenKind::Sub,
        )
        .unwrap();
        assert_eq!(neg, Expr::new_number_literal(-1.5).unwrap());

        let pos = Expr::new_unary_expr(
            Expr::new_number_literal(1.5).unwrap(),
            TokenKind::Add,
        )
        .unwrap();
        assert_eq!(pos, Expr::new_number_literal(1.5).unwrap());

        let vector = Expr::new_unary_expr(bare_selector("up"), TokenKind::Sub).unwrap();
        assert!(matches!(vector, Expr::Unary(_)));

        assert!(Expr::new_unary_expr(bare_selector("up"), TokenKind::Mul).is_err());
    }

    #[test]
    fn test_matrix_selector_construction() {
        let ok = Expr::new_matrix_selector(bare_selector("up"), Duration::MINUTE);
        assert!(ok.is_ok());

        let offset = bare_selector("up").offset_expr(Duration::MINUTE).unwrap();
        assert_eq!(
            Expr::new_matrix_selector(offset, Duration::MINUTE).unwrap_err(),
            "no offset modifiers allowed before range"
        );

        assert_eq!(
            Expr::new_matrix_selector(
                Expr::new_number_literal(1.0).unwrap(),
                Duration::MINUTE
            )
            .unwrap_err(),
            "ranges only allowed for vector selectors"
        );
    }

    #[test]
    fn test_offset_rules() {
        let vs = bare_selector("up");
        let once = vs.offset_expr(Duration::MINUTE).unwrap();
        assert_eq!(
            once.offset_expr(Duration::HOUR).unwrap_err(),
            "offset may not be set multiple times"
        );

        assert_eq!(
            Expr::new_number_literal(1.0)
                .unwrap()
                .offset_expr(Duration::MINUTE)
                .unwrap_err(),
            "offset modifier must be preceded by an instant vector selector or range vector selector or a subquery"
        );

        let sub = Expr::new_subquery_expr(bare_selector("up"), Duration::HOUR, None).unwrap();
        assert!(sub.offset_expr(Duration::MINUTE).is_ok());
    }

    #[test]
    fn test_aggregate_arity() {
        let sum = get_aggregate("sum").unwrap();
        let topk = get_aggregate("topk").unwrap();

        assert!(Expr::new_aggregate_expr(sum.clone(), vec![], false, vec![]).is_err());
        assert!(
            Expr::new_aggregate_expr(sum.clone(), vec![], false, vec![bare_selector("up")]).is_ok()
        );
        assert_eq!(
            Expr::new_aggregate_expr(
                sum,
                vec![],
                false,
                vec![bare_selector("up"), bare_selector("down")]
            )
            .unwrap_err(),
            "wrong number of arguments for aggregate expression provided, expected 1, got 2"
        );

        let ok = Expr::new_aggregate_expr(
            topk,
            vec![],
            false,
            vec![Expr::new_number_literal(5.0).unwrap(), bare_selector("up")],
        )
        .unwrap();
        match ok {
            Expr::Aggregate(agg) => {
                assert_eq!(*agg.param.unwrap(), Expr::new_number_literal(5.0).unwrap());
                assert_eq!(*agg.expr, bare_selector("up"));
            }
            _ => panic!("expected aggregate"),
        }
    }

    #[test]
    fn test_structural_value_type() {
        assert_eq!(
            Expr::new_number_literal(1.0).unwrap().value_type(),
            ValueType::Scalar
        );
        assert_eq!(
            Expr::new_string_literal('"', "x").unwrap().value_type(),
            ValueType::String
        );
        assert_eq!(bare_selector("up").value_type(), ValueType::Vector);

        let matrix = Expr::new_matrix_selector(bare_selector("up"), Duration::MINUTE).unwrap();
        assert_eq!(matrix.value_type(), ValueType::Matrix);

        let call = Expr::new_call(get_function("scalar").unwrap(), vec![bare_selector("up")])
            .unwrap();
        assert_eq!(call.value_type(), ValueType::Scalar);

        let scalar_cmp = Expr::new_binary_expr(
            Expr::new_number_literal(1.0).unwrap(),
            TokenKind::Add,
            None,
            Expr::new_number_literal(2.0).unwrap(),
        )
        .unwrap();
        assert_eq!(scalar_cmp.value_type(), ValueType::Scalar);

        let mixed = Expr::new_binary_expr(
            Expr::new_number_literal(1.0).unwrap(),
            TokenKind::Add,
            None,
            bare_selector("up"),
        )
        .unwrap();
        assert_eq!(mixed.value_type(), ValueType::Vector);
    }

    #[test]
    fn test_spans_do_not_affect_equality() {
        let spanned = bare_selector("up").with_span(Span::new(0, 1, 1, 2));
        assert_eq!(spanned, bare_selector("up"));
    }
}
