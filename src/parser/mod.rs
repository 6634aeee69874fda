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

//! Lexing and parsing of PromQL expressions.

mod aggregate;
mod ast;
mod function;
pub mod lex;
pub mod parse;
mod token;
mod value;

pub use aggregate::{get_aggregate, is_aggregate_op, AggregateOperator};
pub use ast::{
    AggregateExpr, BinaryExpr, Call, Expr, MatrixSelector, MetricIdentifier, NumberLiteral,
    OffsetExpr, ParenExpr, StringLiteral, SubqueryExpr, UnaryExpr, VectorMatchCardinality,
    VectorMatching, VectorSelector,
};
pub use function::{get_function, Function};
pub use lex::{LexError, Lexer};
pub use parse::{parse, ParseError};
pub use token::{get_keyword_token, Span, Token, TokenKind};
pub use value::{Value, ValueType};
