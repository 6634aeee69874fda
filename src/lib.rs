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

//! PromQL expression parsing, type checking and printing in Rust.
//!
//! The pipeline is a hand-written lexer, a recursive descent parser
//! producing an immutable AST with source spans, a semantic type checker
//! over PromQL's value types, and a canonical printer via [std::fmt::Display].
//!
//! ```rust
//! use promql_syntax::parser;
//! use promql_syntax::typecheck::check_expr_type;
//!
//! let expr = parser::parse("sum by (job) (rate(requests_total[5m]))").unwrap();
//! assert_eq!(check_expr_type(&expr).unwrap(), parser::ValueType::Vector);
//! assert_eq!(expr.to_string(), "sum by (job) (rate(requests_total[5m]))");
//! ```

pub mod label;
pub mod parser;
mod printer;
pub mod typecheck;
pub mod util;
