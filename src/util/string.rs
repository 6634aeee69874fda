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

//! Internal utilities for quoted strings.
//!
//! Single- and double-quoted strings process the seven C escapes, `\\` and
//! the opening quote. Backtick strings are verbatim and may span lines.

/// Strips the quotes off a string lexeme and resolves escapes. Returns the
/// quote character and the decoded content.
pub fn unquote_string(s: &str) -> Result<(char, String), String> {
    let n = s.len();
    if n < 2 {
        return Err("invalid quoted string".to_string());
    }

    let bytes = s.as_bytes();
    let quote = bytes[0];
    if quote != bytes[n - 1] {
        return Err("invalid quoted string".to_string());
    }

    let inner = &s[1..n - 1];

    if quote == b'`' {
        if inner.contains('`') {
            return Err("invalid quoted string".to_string());
        }
        return Ok(('`', inner.to_string()));
    }

    if quote != b'"' && quote != b'\'' {
        return Err("invalid quoted string".to_string());
    }

    if inner.contains('\n') {
        return Err("quoted string may not contain a newline".to_string());
    }

    let quote = quote as char;
    let mut res = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            // A bare quote of the surrounding kind must be escaped.
            return Err("invalid quoted string".to_string());
        }
        if c != '\\' {
            res.push(c);
            continue;
        }
        let esc = chars
            .next()
            .ok_or_else(|| "invalid escape at end of string".to_string())?;
        let decoded = match esc {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '\\' => '\\',
            c if c == quote => quote,
            c => return Err(format!("unknown escape sequence '\\{c}'")),
        };
        res.push(decoded);
    }

    Ok((quote, res))
}

/// Re-quotes a string value for printing, escaping the quote character,
/// backslashes and the seven C escapes. Backtick content is emitted as-is.
pub fn quote_string(quote: char, s: &str) -> String {
    if quote == '`' {
        return format!("`{s}`");
    }

    let mut res = String::with_capacity(s.len() + 2);
    res.push(quote);
    for c in s.chars() {
        match c {
            '\x07' => res.push_str("\\a"),
            '\x08' => res.push_str("\\b"),
            '\x0c' => res.push_str("\\f"),
            '\n' => res.push_str("\\n"),
            '\r' => res.push_str("\\r"),
            '\t' => res.push_str("\\t"),
            '\x0b' => res.push_str("\\v"),
            '\\' => res.push_str("\\\\"),
            c if c == quote => {
                res.push('\\');
                res.push(c);
            }
            c => res.push(c),
        }
    }
    res.push(quote);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_string_basic() {
        assert_eq!(unquote_string("\"hello\"").unwrap(), ('"', "hello".into()));
        assert_eq!(unquote_string("'hello'").unwrap(), ('\'', "hello".into()));
        assert_eq!(unquote_string("`hello`").unwrap(), ('`', "hello".into()));
        assert_eq!(unquote_string("\"\"").unwrap(), ('"', "".into()));
    }

    #[test]
    fn test_unquote_string_escapes() {
        assert_eq!(unquote_string(r#""\a\b\f\n\r\t\v""#).unwrap().1, "\x07\x08\x0c\n\r\t\x0b");
        assert_eq!(unquote_string(r#""\\""#).unwrap().1, "\\");
        assert_eq!(unquote_string(r#""\"""#).unwrap().1, "\"");
        assert_eq!(unquote_string(r#"'\''"#).unwrap().1, "'");
        // The other quote kind needs no escape.
        assert_eq!(unquote_string(r#"'It"s'"#).unwrap().1, "It\"s");
    }

    #[test]
    fn test_unquote_string_errors() {
        assert!(unquote_string("\"").is_err());
        assert!(unquote_string("\"hello'").is_err());
        assert!(unquote_string("#hello#").is_err());
        assert!(unquote_string("\"hello\nworld\"").is_err());
        assert!(unquote_string("`a`b`").is_err());
        // Escapes outside the supported set are rejected.
        assert!(unquote_string(r#""\x41""#).is_err());
        assert!(unquote_string(r#""\101""#).is_err());
        assert!(unquote_string(r#""\'""#).is_err());
        assert!(unquote_string(r#""\""#).is_err());
    }

    #[test]
    fn test_unquote_string_backtick_verbatim() {
        assert_eq!(unquote_string("`a\\nb`").unwrap().1, "a\\nb");
        assert_eq!(unquote_string("`line\nbreak`").unwrap().1, "line\nbreak");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string('"', "hello"), "\"hello\"");
        assert_eq!(quote_string('\'', "it's"), r#"'it\'s'"#);
        assert_eq!(quote_string('"', "a\tb\n"), r#""a\tb\n""#);
        assert_eq!(quote_string('"', "back\\slash"), r#""back\\slash""#);
        assert_eq!(quote_string('`', "raw\nvalue"), "`raw\nvalue`");
    }

    #[test]
    fn test_quote_unquote_round_trip() {
        for v in ["", "plain", "it's \"quoted\"", "tab\tnewline\n\\"] {
            for q in ['"', '\''] {
                assert_eq!(unquote_string(&quote_string(q, v)).unwrap(), (q, v.to_string()));
            }
        }
    }
}
