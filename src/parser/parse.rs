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

use crate::label::{MatchOp, Matcher, Matchers};
use crate::parser::lex::Lexer;
use crate::parser::token::{Span, Token, TokenKind};
use crate::parser::{
    get_aggregate, get_function, BinaryExpr, Call, Expr, MetricIdentifier, NumberLiteral,
    StringLiteral, SubqueryExpr, VectorMatchCardinality, VectorMatching,
};
use crate::util::duration::Duration;
use crate::util::{number, string};

/// A lexing or parsing failure. The position points at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            line: span.line,
            column: span.column,
            offset: span.offset,
        }
    }

    fn syntax(span: Span, actual: &str, expected: &str) -> Self {
        Self::new(
            format!(
                "Syntax error (line {}, column {}): unexpected {actual}, expected {expected}",
                span.line, span.column
            ),
            span,
        )
    }
}

/// Parses a PromQL expression into its AST.
///
/// Comments are filtered out; every other token has to belong to exactly
/// one expression. Type checking is separate, see
/// [check_expr_type](crate::typecheck::check_expr_type).
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut tokens = Vec::new();
    for item in Lexer::new(input) {
        let token = item.map_err(|e| ParseError::new(e.message, e.span))?;
        if token.kind != TokenKind::Comment {
            tokens.push(token);
        }
    }

    let mut parser = Parser::new(tokens, end_span(input));
    let expr = parser.parse_expr()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::syntax(
            token.span,
            &token.desc(),
            "end of input",
        ));
    }
    Ok(expr)
}

/// Position just past the last input character, for end-of-input errors.
fn end_span(input: &str) -> Span {
    let line = input.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let line_start = input.rfind('\n').map(|i| i + 1).unwrap_or(0);
    Span::new(input.len(), line, (input.len() - line_start) as u32 + 1, 0)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof_span: Span,
}

impl Parser {
    fn new(tokens: Vec<Token>, eof_span: Span) -> Self {
        Self {
            tokens,
            pos: 0,
            eof_span,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    /// Consumes the current token. Only call after a successful peek.
    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_kind() == Some(kind) {
            return Some(self.bump());
        }
        None
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(t) if t.kind == kind => Ok(self.bump()),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(t) => ParseError::syntax(t.span, &t.desc(), expected),
            None => ParseError::syntax(self.eof_span, "end of input", expected),
        }
    }

    /// Expr := (ExprNoBinary (op VectorMatching? ExprNoBinary)*).
    ///
    /// Binary chains are collected flat and regrouped afterwards, so
    /// precedence never shapes the recursion.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let head = self.parse_non_binary()?;

        let mut tail = Vec::new();
        while self.peek_kind().map_or(false, |k| k.is_operator()) {
            let op = self.bump();
            let matching = self.parse_vector_matching(&op)?;
            let rhs = self.parse_non_binary()?;
            tail.push((op.kind, matching, rhs));
        }

        if tail.is_empty() {
            return Ok(head);
        }
        Ok(fold_binary(head, tail))
    }

    fn parse_non_binary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.peek_kind() {
            Some(TokenKind::LeftParen) => self.parse_paren()?,
            Some(TokenKind::Number) => {
                let t = self.bump();
                let val = number::parse_f64(&t.val).map_err(|e| ParseError::new(e, t.span))?;
                Expr::NumberLiteral(NumberLiteral { val, span: t.span })
            }
            Some(TokenKind::String) => {
                let t = self.bump();
                let (quote, val) =
                    string::unquote_string(&t.val).map_err(|e| ParseError::new(e, t.span))?;
                Expr::StringLiteral(StringLiteral {
                    quote,
                    val,
                    span: t.span,
                })
            }
            Some(TokenKind::Add) | Some(TokenKind::Sub) => {
                let op = self.bump();
                let inner = self.parse_expr()?;
                let span = op.span.union(inner.span());
                Expr::new_unary_expr(inner, op.kind)
                    .map_err(|e| ParseError::new(e, op.span))?
                    .with_span(span)
            }
            Some(TokenKind::AggregateOp) => self.parse_aggregate()?,
            Some(TokenKind::Identifier)
                if self.peek_nth_kind(1) == Some(TokenKind::LeftParen) =>
            {
                self.parse_call()?
            }
            Some(TokenKind::Identifier) | Some(TokenKind::MetricIdentifier) => {
                let name = self.bump();
                self.parse_vector_selector(Some(name))?
            }
            Some(TokenKind::LeftBrace) => self.parse_vector_selector(None)?,
            _ => return Err(self.unexpected("expression")),
        };
        self.parse_suffixes(expr)
    }

    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        let open = self.bump();
        let inner = self.parse_expr()?;
        let close = self.expect(TokenKind::RightParen, "\")\"")?;
        Expr::new_paren_expr(inner)
            .map_err(|e| ParseError::new(e, open.span))
            .map(|e| e.with_span(open.span.union(close.span)))
    }

    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let ident = self.bump();
        let func = get_function(&ident.val).ok_or_else(|| {
            ParseError::new(
                format!("unknown function with name \"{}\"", ident.val),
                ident.span,
            )
        })?;

        let (args, close_span) = self.parse_paren_args()?;
        let span = ident.span.union(close_span);

        if let Some(err) = arity_error(&func, args.len()) {
            return Err(ParseError::new(err, span));
        }
        Ok(Expr::Call(Call { func, args, span }))
    }

    /// AggregateExpr := op (Modifier? Args | Args Modifier?). The grouping
    /// modifier is accepted on either side of the argument list.
    fn parse_aggregate(&mut self) -> Result<Expr, ParseError> {
        let op_tok = self.bump();
        let op = get_aggregate(&op_tok.val.to_lowercase()).ok_or_else(|| {
            ParseError::new(
                format!("unknown aggregation operator {}", op_tok.val),
                op_tok.span,
            )
        })?;

        let mut grouping = Vec::new();
        let mut without = false;
        let mut modifier_seen = false;
        if let Some(k @ (TokenKind::By | TokenKind::Without)) = self.peek_kind() {
            self.bump();
            without = k == TokenKind::Without;
            modifier_seen = true;
            grouping = self.parse_label_list()?.0;
        }

        let (args, mut end_span) = self.parse_paren_args()?;

        if !modifier_seen {
            if let Some(k @ (TokenKind::By | TokenKind::Without)) = self.peek_kind() {
                self.bump();
                without = k == TokenKind::Without;
                let (labels, close_span) = self.parse_label_list()?;
                grouping = labels;
                end_span = close_span;
            }
        }

        let span = op_tok.span.union(end_span);
        Expr::new_aggregate_expr(op, grouping, without, args)
            .map_err(|e| ParseError::new(e, span))
            .map(|e| e.with_span(span))
    }

    /// `( Expr (, Expr)* )`, also used for aggregate argument lists.
    fn parse_paren_args(&mut self) -> Result<(Vec<Expr>, Span), ParseError> {
        self.expect(TokenKind::LeftParen, "\"(\"")?;

        let mut args = Vec::new();
        if let Some(close) = self.accept(TokenKind::RightParen) {
            return Ok((args, close.span));
        }

        loop {
            args.push(self.parse_expr()?);
            if let Some(comma) = self.accept(TokenKind::Comma) {
                if self.peek_kind() == Some(TokenKind::RightParen) {
                    return Err(ParseError::new(
                        "trailing commas not allowed in function call args",
                        comma.span,
                    ));
                }
                continue;
            }
            let close = self.expect(TokenKind::RightParen, "\")\" or \",\"")?;
            return Ok((args, close.span));
        }
    }

    /// `( label (, label)* ,? )`. Keywords and aggregate names are valid
    /// label names here.
    fn parse_label_list(&mut self) -> Result<(Vec<String>, Span), ParseError> {
        self.expect(TokenKind::LeftParen, "\"(\"")?;

        let mut labels = Vec::new();
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::RightParen => {
                    let close = self.bump();
                    return Ok((labels, close.span));
                }
                Some(t) if t.kind.is_label_name() => {
                    labels.push(self.bump().val);
                }
                _ => return Err(self.unexpected("label name")),
            }
            if self.accept(TokenKind::Comma).is_none() {
                let close = self.expect(TokenKind::RightParen, "\")\" or \",\"")?;
                return Ok((labels, close.span));
            }
        }
    }

    fn parse_vector_selector(&mut self, name: Option<Token>) -> Result<Expr, ParseError> {
        let mut span = name.as_ref().map_or(Span::NONE, |t| t.span);
        let metric = name.map(|t| MetricIdentifier::new(t.val));

        let matchers = if self.peek_kind() == Some(TokenKind::LeftBrace) {
            let (matchers, close_span) = self.parse_matchers()?;
            span = span.union(close_span);
            matchers
        } else {
            Matchers::empty()
        };

        Expr::new_vector_selector(metric, matchers)
            .map_err(|e| ParseError::new(e, span))
            .map(|e| e.with_span(span))
    }

    fn parse_matchers(&mut self) -> Result<(Matchers, Span), ParseError> {
        let open = self.bump();
        let mut matchers = Matchers::empty();

        loop {
            if let Some(close) = self.accept(TokenKind::RightBrace) {
                return Ok((matchers, open.span.union(close.span)));
            }

            let name = self.expect(TokenKind::Identifier, "identifier or \"}\"")?;
            let op = match self.peek_kind() {
                Some(TokenKind::Eql) => MatchOp::Equal,
                Some(TokenKind::Neq) => MatchOp::NotEqual,
                Some(TokenKind::EqlRegex) => MatchOp::Regexp,
                Some(TokenKind::NeqRegex) => MatchOp::NotRegexp,
                _ => return Err(self.unexpected("label matching operator")),
            };
            self.bump();

            let val_tok = self.expect(TokenKind::String, "string")?;
            let (quote, val) =
                string::unquote_string(&val_tok.val).map_err(|e| ParseError::new(e, val_tok.span))?;
            let matcher = Matcher::new(
                name.val,
                op,
                StringLiteral {
                    quote,
                    val,
                    span: val_tok.span,
                },
            )
            .map_err(|e| ParseError::new(e, name.span))?;
            matchers = matchers.append(matcher);

            if self.accept(TokenKind::Comma).is_none() {
                let close = self.expect(TokenKind::RightBrace, "\"}\" or \",\"")?;
                return Ok((matchers, open.span.union(close.span)));
            }
        }
    }

    /// Attaches trailing `offset <dur>`, `[<dur>]` and `[<dur>:<dur>?]`
    /// forms, greedily and repeatedly.
    fn parse_suffixes(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.peek_kind() {
                Some(TokenKind::Offset) => {
                    self.bump();
                    let negative = self.accept(TokenKind::Sub).is_some();
                    let dur_tok = self.expect(TokenKind::Duration, "duration")?;
                    let mut offset = Duration::parse(&dur_tok.val)
                        .map_err(|e| ParseError::new(e, dur_tok.span))?;
                    if negative {
                        offset = -offset;
                    }
                    let span = expr.span().union(dur_tok.span);
                    expr = expr
                        .offset_expr(offset)
                        .map_err(|e| ParseError::new(e, span))?
                        .with_span(span);
                }
                Some(TokenKind::LeftBracket) => {
                    self.bump();
                    let range_tok = self.expect(TokenKind::Duration, "duration")?;
                    let range = Duration::parse(&range_tok.val)
                        .map_err(|e| ParseError::new(e, range_tok.span))?;

                    if self.accept(TokenKind::Colon).is_some() {
                        let step = match self.peek_kind() {
                            Some(TokenKind::Duration) => {
                                let t = self.bump();
                                Some(
                                    Duration::parse(&t.val)
                                        .map_err(|e| ParseError::new(e, t.span))?,
                                )
                            }
                            _ => None,
                        };
                        let close = self.expect(TokenKind::RightBracket, "\"]\"")?;
                        let span = expr.span().union(close.span);
                        expr = Expr::Subquery(SubqueryExpr {
                            expr: Box::new(expr),
                            range,
                            step,
                            span,
                        });
                    } else {
                        let close = self.expect(TokenKind::RightBracket, "\"]\"")?;
                        let span = expr.span().union(close.span);
                        expr = Expr::new_matrix_selector(expr, range)
                            .map_err(|e| ParseError::new(e, span))?
                            .with_span(span);
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// VectorMatching := ['bool'] [('on'|'ignoring') '(' labels ')'
    /// [('group_left'|'group_right') GroupingLabels?]].
    fn parse_vector_matching(
        &mut self,
        op: &Token,
    ) -> Result<Option<VectorMatching>, ParseError> {
        let return_bool = self.accept(TokenKind::Bool).is_some();

        let on = match self.peek_kind() {
            Some(TokenKind::On) => Some(true),
            Some(TokenKind::Ignoring) => Some(false),
            _ => None,
        };

        let matching = if let Some(on) = on {
            self.bump();
            let (labels, _) = self.parse_label_list()?;

            let mut card = VectorMatchCardinality::OneToOne;
            let mut include = Vec::new();
            if let Some(k @ (TokenKind::GroupLeft | TokenKind::GroupRight)) = self.peek_kind() {
                self.bump();
                card = if k == TokenKind::GroupLeft {
                    VectorMatchCardinality::ManyToOne
                } else {
                    VectorMatchCardinality::OneToMany
                };
                // A parenthesis directly after group_left/group_right is
                // read as the include-label list, never as the rhs.
                if self.peek_kind() == Some(TokenKind::LeftParen) {
                    include = self.parse_label_list()?.0;
                }
            }

            Some(VectorMatching {
                card,
                matching: labels,
                on,
                include,
                return_bool,
            })
        } else if return_bool {
            Some(VectorMatching {
                return_bool: true,
                ..Default::default()
            })
        } else {
            None
        };

        if return_bool && !op.kind.is_comparison_operator() {
            return Err(ParseError::new(
                "bool modifier can only be used on comparison operators",
                op.span,
            ));
        }
        Ok(matching)
    }
}

fn arity_error(func: &crate::parser::Function, received: usize) -> Option<String> {
    match func.variadic {
        None if received != func.arg_types.len() => Some(format!(
            "Incorrect number of argument(s) in call to {}, expected {} argument(s)",
            func.name,
            func.arg_types.len()
        )),
        Some(_) if received < func.min_arg_count() => Some(format!(
            "Incorrect number of argument(s) in call to {}, expected at least {} argument(s)",
            func.name,
            func.min_arg_count()
        )),
        _ => None,
    }
}

/// Regroups a flat `head (op rhs)*` chain into a tree: tiers from `^` down
/// to `or`, merging left to right inside each tier.
fn fold_binary(head: Expr, tail: Vec<(TokenKind, Option<VectorMatching>, Expr)>) -> Expr {
    let mut operands = Vec::with_capacity(tail.len() + 1);
    operands.push(head);
    let mut ops = Vec::with_capacity(tail.len());
    for (op, matching, rhs) in tail {
        ops.push((op, matching));
        operands.push(rhs);
    }

    for prec in (1..=6u8).rev() {
        let mut i = 0;
        while i < ops.len() {
            if ops[i].0.precedence() == Some(prec) {
                let (op, matching) = ops.remove(i);
                let rhs = operands.remove(i + 1);
                let lhs = std::mem::replace(
                    &mut operands[i],
                    Expr::NumberLiteral(NumberLiteral::new(0.0)),
                );
                let span = lhs.span().union(rhs.span());
                operands[i] = Expr::Binary(BinaryExpr {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    matching,
                    span,
                });
            } else {
                i += 1;
            }
        }
    }
    operands.remove(0)
}
