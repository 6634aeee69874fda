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

use std::collections::HashMap;
use std::fmt::{self, Display};

use lazy_static::lazy_static;

/// Source position of a token or AST node: byte offset, 1-based line and
/// column, and byte length.
///
/// A default span (line 0) marks a node built outside the parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct Span {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
    pub length: usize,
}

impl Span {
    pub const NONE: Span = Span {
        offset: 0,
        line: 0,
        column: 0,
        length: 0,
    };

    pub fn new(offset: usize, line: u32, column: u32, length: usize) -> Self {
        Self {
            offset,
            line,
            column,
            length,
        }
    }

    pub fn is_none(&self) -> bool {
        self.line == 0
    }

    /// End byte offset (exclusive).
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(&self, other: Span) -> Span {
        if self.is_none() {
            return other;
        }
        if other.is_none() {
            return *self;
        }
        let (first, last) = if self.offset <= other.offset {
            (self, &other)
        } else {
            (&other, self)
        };
        Span {
            offset: first.offset,
            line: first.line,
            column: first.column,
            length: first.offset.max(last.end()) - first.offset,
        }
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: Span) -> bool {
        self.offset <= other.offset && other.end() <= self.end()
    }
}

// Node equality is structural. Position metadata never participates, so a
// tree built by hand compares equal to the same tree produced by the parser.
impl PartialEq for Span {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Span {}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.offset, self.line, self.column)
    }
}

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum TokenKind {
    // Punctuation.
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Comma,
    Colon,
    Semicolon,
    At,

    // Operators.
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eql,
    Eqlc,
    Neq,
    Lss,
    Lte,
    Gtr,
    Gte,
    EqlRegex,
    NeqRegex,

    // Keyword operators.
    And,
    Or,
    Unless,
    Atan2,

    // Keywords.
    Offset,
    By,
    Without,
    On,
    Ignoring,
    GroupLeft,
    GroupRight,
    Bool,

    // Literals.
    Number,
    Duration,
    String,
    Comment,

    // Identifier families.
    Identifier,
    MetricIdentifier,
    AggregateOp,
}

impl TokenKind {
    /// True for every token usable as a binary operator.
    pub fn is_operator(&self) -> bool {
        self.precedence().is_some()
    }

    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Eqlc
                | TokenKind::Neq
                | TokenKind::Lss
                | TokenKind::Lte
                | TokenKind::Gtr
                | TokenKind::Gte
        )
    }

    pub fn is_set_operator(&self) -> bool {
        matches!(self, TokenKind::And | TokenKind::Or | TokenKind::Unless)
    }

    /// Binding strength of a binary operator, 6 (tightest, `^`) down to
    /// 1 (`or`). `None` for tokens that are not binary operators.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Pow => Some(6),
            TokenKind::Mul | TokenKind::Div | TokenKind::Mod | TokenKind::Atan2 => Some(5),
            TokenKind::Add | TokenKind::Sub => Some(4),
            TokenKind::Eqlc
            | TokenKind::Neq
            | TokenKind::Lss
            | TokenKind::Lte
            | TokenKind::Gtr
            | TokenKind::Gte => Some(3),
            TokenKind::And | TokenKind::Unless => Some(2),
            TokenKind::Or => Some(1),
            _ => None,
        }
    }

    /// Keywords and aggregate names double as label names in grouping
    /// lists and matcher positions.
    pub fn is_label_name(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::AggregateOp
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Unless
                | TokenKind::Atan2
                | TokenKind::Offset
                | TokenKind::By
                | TokenKind::Without
                | TokenKind::On
                | TokenKind::Ignoring
                | TokenKind::GroupLeft
                | TokenKind::GroupRight
                | TokenKind::Bool
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::At => "@",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::Pow => "^",
            TokenKind::Eql => "=",
            TokenKind::Eqlc => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lss => "<",
            TokenKind::Lte => "<=",
            TokenKind::Gtr => ">",
            TokenKind::Gte => ">=",
            TokenKind::EqlRegex => "=~",
            TokenKind::NeqRegex => "!~",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Unless => "unless",
            TokenKind::Atan2 => "atan2",
            TokenKind::Offset => "offset",
            TokenKind::By => "by",
            TokenKind::Without => "without",
            TokenKind::On => "on",
            TokenKind::Ignoring => "ignoring",
            TokenKind::GroupLeft => "group_left",
            TokenKind::GroupRight => "group_right",
            TokenKind::Bool => "bool",
            TokenKind::Number => "number",
            TokenKind::Duration => "duration",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Identifier => "identifier",
            TokenKind::MetricIdentifier => "metric identifier",
            TokenKind::AggregateOp => "aggregation",
        };
        write!(f, "{s}")
    }
}

/// A lexed token: its kind, the source text it covers, and its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub val: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, val: String, span: Span) -> Self {
        Self { kind, val, span }
    }

    /// Human-readable description used in syntax error messages.
    pub fn desc(&self) -> String {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::MetricIdentifier
            | TokenKind::AggregateOp
            | TokenKind::Number
            | TokenKind::Duration
            | TokenKind::String => format!("{} \"{}\"", self.kind, self.val),
            _ => format!("\"{}\"", self.kind),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.desc(), self.span)
    }
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("and", TokenKind::And),
        ("or", TokenKind::Or),
        ("unless", TokenKind::Unless),
        ("atan2", TokenKind::Atan2),
        ("offset", TokenKind::Offset),
        ("by", TokenKind::By),
        ("without", TokenKind::Without),
        ("on", TokenKind::On),
        ("ignoring", TokenKind::Ignoring),
        ("group_left", TokenKind::GroupLeft),
        ("group_right", TokenKind::GroupRight),
        ("bool", TokenKind::Bool),
    ]);
}

/// Looks up the token kind for a keyword. `name` must already be lowercased.
pub fn get_keyword_token(name: &str) -> Option<TokenKind> {
    KEYWORDS.get(name).copied()
}
