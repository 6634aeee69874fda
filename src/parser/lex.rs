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

use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::parser::aggregate::is_aggregate_op;
use crate::parser::token::{get_keyword_token, Span, Token, TokenKind};

lazy_static! {
    static ref DEC_DIGITS_SET: HashSet<char> = "0123456789".chars().collect();
    static ref ALL_DURATION_UNITS: HashSet<char> = HashSet::from(['s', 'm', 'h', 'd', 'w', 'y']);
    static ref ONLY_S_DURATION_UNITS: HashSet<char> = HashSet::from(['s']);
    static ref SPACE_SET: HashSet<char> = HashSet::from([' ', '\t', '\n', '\r']);
    static ref SCI_CHAR_SET: HashSet<char> = HashSet::from(['e', 'E']);
    static ref SIGN_CHAR_SET: HashSet<char> = HashSet::from(['+', '-']);
}

/// A lexing failure with the span of the offending text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

#[derive(Debug)]
enum LexerState {
    Start,
    End,
    Lexeme(TokenKind),
    String(char),
    KeywordOrIdentifier,
    NumberOrDuration,
    InsideBraces,
    LineComment,
    Err(String),
}

impl LexerState {
    fn shift(&mut self, ctx: &mut Context) -> LexerState {
        match self {
            LexerState::Start => start(ctx),
            LexerState::End => panic!("End state can not shift forward."),
            LexerState::Lexeme(_) => LexerState::Start,
            LexerState::String(quote) => scan_string(ctx, *quote),
            LexerState::KeywordOrIdentifier => keyword_or_identifier(ctx),
            LexerState::NumberOrDuration => number_or_duration(ctx),
            LexerState::InsideBraces => inside_braces(ctx),
            LexerState::LineComment => comment_line(ctx),
            LexerState::Err(info) => LexerState::Err(info.clone()),
        }
    }
}

#[derive(Debug)]
struct Context {
    chars: Vec<char>,
    /// Byte offset of the first character of every line.
    line_starts: Vec<usize>,

    idx: usize,       // Current position in the Vec, increment by 1.
    start_idx: usize, // Start of one Token in the Vec, increment by 1.
    start: usize,     // Start position of one Token, increment by char.len_utf8.
    pos: usize,       // Current position in the input, increment by char.len_utf8.

    paren_depth: u8,    // Nesting depth of ( ) exprs, 0 means no parens.
    brace_open: bool,   // Whether a { is opened.
    bracket_open: bool, // Whether a [ is opened.
    got_colon: bool,    // Whether we got a ':' after [ was opened.
}

impl Context {
    fn new(input: &str) -> Context {
        let mut line_starts = vec![0];
        for (i, b) in input.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            chars: input.chars().collect(),
            line_starts,
            idx: 0,
            start_idx: 0,
            start: 0,
            pos: 0,
            paren_depth: 0,
            brace_open: false,
            bracket_open: false,
            got_colon: false,
        }
    }

    /// pop the next char.
    fn pop(&mut self) -> Option<char> {
        let c = self.chars.get(self.idx).copied();
        if let Some(ch) = c {
            self.pos += ch.len_utf8();
            self.idx += 1;
        };
        c
    }

    /// put the last popped char back.
    fn backup(&mut self) {
        if self.idx == 0 {
            return;
        }
        if let Some(ch) = self.chars.get(self.idx - 1) {
            self.pos -= ch.len_utf8();
            self.idx -= 1;
        };
    }

    /// get the char at the current position without consuming it.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn lexeme(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(kind, self.lexeme_string(), self.span());
        self.ignore();
        token
    }

    /// drop the text between start and pos.
    fn ignore(&mut self) {
        self.start = self.pos;
        self.start_idx = self.idx;
    }

    fn lexeme_string(&self) -> String {
        self.chars[self.start_idx..self.idx].iter().collect()
    }

    /// The span of the pending lexeme.
    fn span(&self) -> Span {
        let line_idx = self
            .line_starts
            .partition_point(|&s| s <= self.start)
            .saturating_sub(1);
        Span::new(
            self.start,
            line_idx as u32 + 1,
            (self.start - self.line_starts[line_idx]) as u32 + 1,
            self.pos - self.start,
        )
    }
}

/// A lazy PromQL token stream over a source string.
///
/// The lexer keeps two orthogonal pieces of bracket state: whether a `{`
/// is open (identifiers lose their keyword meaning inside label matchers)
/// and whether a `[` is open (`:` becomes the subquery separator there).
/// Neither nests.
#[derive(Debug)]
pub struct Lexer {
    state: LexerState,
    ctx: Context,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let ctx = Context::new(input);
        let state = LexerState::Start;
        Self { state, ctx }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, LexerState::End) {
            return None;
        }
        loop {
            self.state = self.state.shift(&mut self.ctx);
            match &self.state {
                LexerState::Lexeme(kind) => return Some(Ok(self.ctx.lexeme(*kind))),
                LexerState::Err(info) => {
                    let err = LexError {
                        message: info.clone(),
                        span: self.ctx.span(),
                    };
                    self.state = LexerState::End;
                    return Some(Err(err));
                }
                LexerState::End => return None,
                _ => {}
            }
        }
    }
}

fn start(ctx: &mut Context) -> LexerState {
    if ctx.brace_open {
        return LexerState::InsideBraces;
    }

    match ctx.pop() {
        Some('#') => LexerState::LineComment,
        Some(',') => LexerState::Lexeme(TokenKind::Comma),
        Some(';') => LexerState::Lexeme(TokenKind::Semicolon),
        Some('@') => LexerState::Lexeme(TokenKind::At),
        Some(ch) if is_space(ch) => {
            ctx.backup();
            accept_space(ctx)
        }
        Some('*') => LexerState::Lexeme(TokenKind::Mul),
        Some('/') => LexerState::Lexeme(TokenKind::Div),
        Some('%') => LexerState::Lexeme(TokenKind::Mod),
        Some('+') => LexerState::Lexeme(TokenKind::Add),
        Some('-') => LexerState::Lexeme(TokenKind::Sub),
        Some('^') => LexerState::Lexeme(TokenKind::Pow),
        Some('=') => match ctx.peek() {
            Some('=') => {
                ctx.pop();
                LexerState::Lexeme(TokenKind::Eqlc)
            }
            // =~ (label matcher) is only valid inside braces.
            Some('~') => LexerState::Err("Unexpected character after =: ~".into()),
            _ => LexerState::Lexeme(TokenKind::Eql),
        },
        Some('!') => match ctx.pop() {
            Some('=') => LexerState::Lexeme(TokenKind::Neq),
            Some(ch) => LexerState::Err(format!("Unexpected character after !: {ch}")),
            None => LexerState::Err("'!' can not be at the end".into()),
        },
        Some('<') => match ctx.peek() {
            Some('=') => {
                ctx.pop();
                LexerState::Lexeme(TokenKind::Lte)
            }
            _ => LexerState::Lexeme(TokenKind::Lss),
        },
        Some('>') => match ctx.peek() {
            Some('=') => {
                ctx.pop();
                LexerState::Lexeme(TokenKind::Gte)
            }
            _ => LexerState::Lexeme(TokenKind::Gtr),
        },
        Some(ch) if is_digit(ch) => {
            ctx.backup();
            LexerState::NumberOrDuration
        }
        Some('.') => match ctx.peek() {
            Some(ch) if is_digit(ch) => {
                ctx.backup();
                LexerState::NumberOrDuration
            }
            Some(ch) => LexerState::Err(format!("Unexpected character after .: {ch}")),
            None => LexerState::Err("'.' can not be at the end".into()),
        },
        Some(':') if ctx.bracket_open => {
            if ctx.got_colon {
                LexerState::Err("Unexpected colon ':'".into())
            } else {
                ctx.got_colon = true;
                LexerState::Lexeme(TokenKind::Colon)
            }
        }
        Some(ch) if is_alpha(ch) || ch == ':' => {
            ctx.backup();
            LexerState::KeywordOrIdentifier
        }
        Some(ch) if is_string_open(ch) => LexerState::String(ch),
        Some('(') => {
            ctx.paren_depth += 1;
            LexerState::Lexeme(TokenKind::LeftParen)
        }
        Some(')') => {
            if ctx.paren_depth == 0 {
                LexerState::Err("Unexpected right parenthesis ')'".into())
            } else {
                ctx.paren_depth -= 1;
                LexerState::Lexeme(TokenKind::RightParen)
            }
        }
        Some('{') => {
            ctx.brace_open = true;
            LexerState::Lexeme(TokenKind::LeftBrace)
        }
        Some('}') => LexerState::Err("Unexpected right bracket '}'".into()),
        Some('[') => {
            if ctx.bracket_open {
                LexerState::Err("Unexpected left bracket '['".into())
            } else {
                ctx.got_colon = false;
                ctx.bracket_open = true;
                LexerState::Lexeme(TokenKind::LeftBracket)
            }
        }
        Some(']') => {
            if ctx.bracket_open {
                ctx.bracket_open = false;
                LexerState::Lexeme(TokenKind::RightBracket)
            } else {
                LexerState::Err("Unexpected right bracket ']'".into())
            }
        }
        Some(ch) => LexerState::Err(format!("Unexpected character: {ch}")),
        None if ctx.paren_depth != 0 => LexerState::Err("Unclosed left parenthesis".into()),
        None if ctx.bracket_open => LexerState::Err("Unclosed left bracket".into()),
        None => LexerState::End,
    }
}

/// Identifiers lose their keyword meaning here, so `on`, `sum` or `offset`
/// are plain label names inside the braces of a matcher list.
fn inside_braces(ctx: &mut Context) -> LexerState {
    match ctx.pop() {
        Some('#') => LexerState::LineComment,
        Some(',') => LexerState::Lexeme(TokenKind::Comma),
        Some(ch) if is_space(ch) => {
            ctx.backup();
            accept_space(ctx)
        }
        Some('=') => match ctx.peek() {
            Some('~') => {
                ctx.pop();
                LexerState::Lexeme(TokenKind::EqlRegex)
            }
            Some('=') => {
                ctx.pop();
                LexerState::Lexeme(TokenKind::Eqlc)
            }
            _ => LexerState::Lexeme(TokenKind::Eql),
        },
        Some('!') => match ctx.pop() {
            Some('~') => LexerState::Lexeme(TokenKind::NeqRegex),
            Some('=') => LexerState::Lexeme(TokenKind::Neq),
            Some(ch) => LexerState::Err(format!("Unexpected character after !: {ch}")),
            None => LexerState::Err("'!' can not be at the end".into()),
        },
        Some(ch) if is_alpha(ch) => {
            ctx.backup();
            LexerState::KeywordOrIdentifier
        }
        Some(ch) if is_digit(ch) => {
            ctx.backup();
            LexerState::NumberOrDuration
        }
        Some(ch) if is_string_open(ch) => LexerState::String(ch),
        Some('{') => LexerState::Err("Unexpected left brace '{'".into()),
        Some('}') => {
            ctx.brace_open = false;
            LexerState::Lexeme(TokenKind::RightBrace)
        }
        Some(ch) => LexerState::Err(format!("Unexpected character inside braces: '{ch}'")),
        None => LexerState::Err("Unexpected end of input inside braces".into()),
    }
}

/// The opening quote has already been consumed. Single- and double-quoted
/// strings admit the seven C escapes, `\\` and the quote itself; a raw
/// newline ends them with an error. Backtick strings are verbatim.
fn scan_string(ctx: &mut Context, quote: char) -> LexerState {
    loop {
        match ctx.pop() {
            None => return LexerState::Err("unterminated quoted string".into()),
            Some(ch) if ch == quote => return LexerState::Lexeme(TokenKind::String),
            Some('\n') if quote != '`' => {
                return LexerState::Err("quoted string may not contain a newline".into())
            }
            Some('\\') if quote != '`' => match ctx.pop() {
                None => return LexerState::Err("unterminated quoted string".into()),
                Some(esc) if is_escapable(esc, quote) => {}
                Some(esc) => {
                    return LexerState::Err(format!("unknown escape sequence '\\{esc}'"))
                }
            },
            Some(_) => {}
        }
    }
}

fn number_or_duration(ctx: &mut Context) -> LexerState {
    if scan_number(ctx) {
        return LexerState::Lexeme(TokenKind::Number);
    }
    if accept_remaining_duration(ctx) {
        return LexerState::Lexeme(TokenKind::Duration);
    }
    LexerState::Err(format!(
        "bad number or duration syntax: {}",
        ctx.lexeme_string()
    ))
}

fn keyword_or_identifier(ctx: &mut Context) -> LexerState {
    // Label names inside braces never contain colons.
    let colon_ok = !ctx.brace_open;
    while let Some(ch) = ctx.peek() {
        if is_alpha_numeric(ch) || (ch == ':' && colon_ok) {
            ctx.pop();
        } else {
            break;
        }
    }

    let s = ctx.lexeme_string();
    if ctx.brace_open {
        return LexerState::Lexeme(TokenKind::Identifier);
    }

    if s.contains(':') {
        if s == ":" {
            return LexerState::Err("Unexpected colon ':'".into());
        }
        return LexerState::Lexeme(TokenKind::MetricIdentifier);
    }

    let lower = s.to_lowercase();
    if is_aggregate_op(&lower) {
        return LexerState::Lexeme(TokenKind::AggregateOp);
    }
    if let Some(kind) = get_keyword_token(&lower) {
        return LexerState::Lexeme(kind);
    }
    if lower == "inf" || lower == "nan" {
        return LexerState::Lexeme(TokenKind::Number);
    }
    LexerState::Lexeme(TokenKind::Identifier)
}

/// # has already been consumed. The token covers the rest of the line.
fn comment_line(ctx: &mut Context) -> LexerState {
    while let Some(ch) = ctx.peek() {
        if is_end_of_line(ch) {
            break;
        }
        ctx.pop();
    }
    LexerState::Lexeme(TokenKind::Comment)
}

/// accept consumes the next char if it's from the valid set.
fn accept(ctx: &mut Context, set: &HashSet<char>) -> bool {
    if let Some(ch) = ctx.peek() {
        if set.contains(&ch) {
            ctx.pop();
            return true;
        }
    }
    false
}

/// accept_char consumes the next char if it's equal to the valid char.
fn accept_char(ctx: &mut Context, valid: char) -> bool {
    if let Some(ch) = ctx.peek() {
        if ch == valid {
            ctx.pop();
            return true;
        }
    }
    false
}

/// accept_run consumes a run of chars from the valid set.
fn accept_run(ctx: &mut Context, set: &HashSet<char>) {
    while let Some(ch) = ctx.peek() {
        if set.contains(&ch) {
            ctx.pop();
        } else {
            break;
        }
    }
}

/// accept_space consumes a run of space and drops it.
fn accept_space(ctx: &mut Context) -> LexerState {
    accept_run(ctx, &SPACE_SET);
    ctx.ignore();
    LexerState::Start
}

/// scan_number scans integers, fractions and exponent forms. The scanned
/// text is not necessarily a valid number; that case is caught by the
/// parser. Returns false when the text continues as a duration.
fn scan_number(ctx: &mut Context) -> bool {
    accept_run(ctx, &DEC_DIGITS_SET);
    if accept_char(ctx, '.') {
        accept_run(ctx, &DEC_DIGITS_SET);
    }
    if accept(ctx, &SCI_CHAR_SET) {
        accept(ctx, &SIGN_CHAR_SET);
        accept_run(ctx, &DEC_DIGITS_SET);
    }
    // Next thing must not be alphanumeric, or this is a duration lexeme.
    match ctx.peek() {
        Some(ch) if is_alpha_numeric(ch) => false,
        _ => true,
    }
}

fn accept_remaining_duration(ctx: &mut Context) -> bool {
    // Next char must be a valid duration unit.
    if !accept(ctx, &ALL_DURATION_UNITS) {
        return false;
    }
    // Support for ms. Bad units like hs, ys will be caught when we actually
    // parse the duration.
    accept(ctx, &ONLY_S_DURATION_UNITS);

    // Next char can be another number then a unit.
    while accept(ctx, &DEC_DIGITS_SET) {
        accept_run(ctx, &DEC_DIGITS_SET);
        if !accept(ctx, &ALL_DURATION_UNITS) {
            return false;
        }
        accept(ctx, &ONLY_S_DURATION_UNITS);
    }

    match ctx.peek() {
        Some(ch) if is_alpha_numeric(ch) => false,
        _ => true,
    }
}

fn is_escapable(ch: char, quote: char) -> bool {
    matches!(ch, 'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\') || ch == quote
}

fn is_string_open(ch: char) -> bool {
    ch == '"' || ch == '`' || ch == '\''
}

fn is_space(ch: char) -> bool {
    SPACE_SET.contains(&ch)
}

fn is_end_of_line(ch: char) -> bool {
    ch == '\r' || ch == '\n'
}

fn is_alpha_numeric(ch: char) -> bool {
    is_alpha(ch) || is_digit(ch)
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_alpha(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .map(|t| t.expect("unexpected lex error").kind)
            .collect()
    }

    fn vals(input: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(input)
            .map(|t| {
                let t = t.expect("unexpected lex error");
                (t.kind, t.val)
            })
            .collect()
    }

    fn lex_err(input: &str) -> LexError {
        for item in Lexer::new(input) {
            if let Err(e) = item {
                return e;
            }
        }
        panic!("{input} lexed without error");
    }

    #[test]
    fn test_operators_and_punctuation() {
        assert_eq!(
            kinds("+ - * / % ^ == != < <= > >= = , ; @"),
            vec![
                TokenKind::Add,
                TokenKind::Sub,
                TokenKind::Mul,
                TokenKind::Div,
                TokenKind::Mod,
                TokenKind::Pow,
                TokenKind::Eqlc,
                TokenKind::Neq,
                TokenKind::Lss,
                TokenKind::Lte,
                TokenKind::Gtr,
                TokenKind::Gte,
                TokenKind::Eql,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::At,
            ]
        );
    }

    #[test]
    fn test_numbers_and_durations() {
        assert_eq!(
            vals("1 1.5 .5 5. 1e3 1.1e-2 Inf NaN 5m 1h30m 3ms 2d3ms 1y2w"),
            vec![
                (TokenKind::Number, "1".into()),
                (TokenKind::Number, "1.5".into()),
                (TokenKind::Number, ".5".into()),
                (TokenKind::Number, "5.".into()),
                (TokenKind::Number, "1e3".into()),
                (TokenKind::Number, "1.1e-2".into()),
                (TokenKind::Number, "Inf".into()),
                (TokenKind::Number, "NaN".into()),
                (TokenKind::Duration, "5m".into()),
                (TokenKind::Duration, "1h30m".into()),
                (TokenKind::Duration, "3ms".into()),
                (TokenKind::Duration, "2d3ms".into()),
                (TokenKind::Duration, "1y2w".into()),
            ]
        );
    }

    #[test]
    fn test_identifier_classification() {
        assert_eq!(
            vals("up node_cpu sum SUM and BY offset inf foo:bar :x"),
            vec![
                (TokenKind::Identifier, "up".into()),
                (TokenKind::Identifier, "node_cpu".into()),
                (TokenKind::AggregateOp, "sum".into()),
                (TokenKind::AggregateOp, "SUM".into()),
                (TokenKind::And, "and".into()),
                (TokenKind::By, "BY".into()),
                (TokenKind::Offset, "offset".into()),
                (TokenKind::Number, "inf".into()),
                (TokenKind::MetricIdentifier, "foo:bar".into()),
                (TokenKind::MetricIdentifier, ":x".into()),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            vals(r#""double" 'single' `back\tick`"#),
            vec![
                (TokenKind::String, r#""double""#.into()),
                (TokenKind::String, "'single'".into()),
                (TokenKind::String, r"`back\tick`".into()),
            ]
        );
        assert_eq!(kinds(r#""esc \" \\ \n""#), vec![TokenKind::String]);
        assert_eq!(kinds("`multi\nline`"), vec![TokenKind::String]);
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(lex_err(r#""open"#).message, "unterminated quoted string");
        assert_eq!(
            lex_err("\"raw\nnewline\"").message,
            "quoted string may not contain a newline"
        );
        assert_eq!(lex_err(r#""\q""#).message, "unknown escape sequence '\\q'");
        // Only the opening quote kind may be escaped.
        assert_eq!(lex_err(r#""\'""#).message, "unknown escape sequence '\\''");
    }

    #[test]
    fn test_brace_mode_keywords_become_identifiers() {
        assert_eq!(
            vals(r#"{on="a",sum=~'b',offset!="c",bool!~"d"}"#),
            vec![
                (TokenKind::LeftBrace, "{".into()),
                (TokenKind::Identifier, "on".into()),
                (TokenKind::Eql, "=".into()),
                (TokenKind::String, r#""a""#.into()),
                (TokenKind::Comma, ",".into()),
                (TokenKind::Identifier, "sum".into()),
                (TokenKind::EqlRegex, "=~".into()),
                (TokenKind::String, "'b'".into()),
                (TokenKind::Comma, ",".into()),
                (TokenKind::Identifier, "offset".into()),
                (TokenKind::Neq, "!=".into()),
                (TokenKind::String, r#""c""#.into()),
                (TokenKind::Comma, ",".into()),
                (TokenKind::Identifier, "bool".into()),
                (TokenKind::NeqRegex, "!~".into()),
                (TokenKind::String, r#""d""#.into()),
                (TokenKind::RightBrace, "}".into()),
            ]
        );
    }

    #[test]
    fn test_subquery_colon() {
        assert_eq!(
            kinds("metric[1h:5m]"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftBracket,
                TokenKind::Duration,
                TokenKind::Colon,
                TokenKind::Duration,
                TokenKind::RightBracket,
            ]
        );
        // The identifier path still applies inside brackets.
        assert_eq!(
            kinds("metric[window]"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftBracket,
                TokenKind::Identifier,
                TokenKind::RightBracket,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            vals("up # trailing note"),
            vec![
                (TokenKind::Identifier, "up".into()),
                (TokenKind::Comment, "# trailing note".into()),
            ]
        );
        assert_eq!(
            kinds("# line one\nup"),
            vec![TokenKind::Comment, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_bracket_errors() {
        assert_eq!(lex_err("foo[[1m]").message, "Unexpected left bracket '['");
        assert_eq!(lex_err("foo]").message, "Unexpected right bracket ']'");
        assert_eq!(lex_err("foo[1m:2m:3m]").message, "Unexpected colon ':'");
        assert_eq!(lex_err("foo[1m").message, "Unclosed left bracket");
        assert_eq!(lex_err(":").message, "Unexpected colon ':'");
    }

    #[test]
    fn test_paren_and_brace_errors() {
        assert_eq!(lex_err("(foo").message, "Unclosed left parenthesis");
        assert_eq!(lex_err("foo)").message, "Unexpected right parenthesis ')'");
        assert_eq!(lex_err("foo}").message, "Unexpected right bracket '}'");
        assert_eq!(
            lex_err("{a=\"b\"").message,
            "Unexpected end of input inside braces"
        );
        assert_eq!(lex_err("{").message, "Unexpected end of input inside braces");
        assert_eq!(lex_err("{{").message, "Unexpected left brace '{'");
        assert_eq!(lex_err("{a=[}").message, "Unexpected character inside braces: '['");
    }

    #[test]
    fn test_misc_errors() {
        assert_eq!(lex_err("!a").message, "Unexpected character after !: a");
        assert_eq!(lex_err("a =~ b").message, "Unexpected character after =: ~");
        assert_eq!(lex_err("~").message, "Unexpected character: ~");
        assert_eq!(lex_err("0x1f").message, "bad number or duration syntax: 0");
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<Token> = Lexer::new("up ==\n  5m").map(Result::unwrap).collect();

        assert_eq!(tokens[0].span.offset, 0);
        assert_eq!(tokens[0].span.length, 2);
        assert_eq!((tokens[0].span.line, tokens[0].span.column), (1, 1));

        assert_eq!(tokens[1].span.offset, 3);
        assert_eq!((tokens[1].span.line, tokens[1].span.column), (1, 4));

        assert_eq!(tokens[2].span.offset, 8);
        assert_eq!(tokens[2].span.length, 2);
        assert_eq!((tokens[2].span.line, tokens[2].span.column), (2, 3));
    }
}
