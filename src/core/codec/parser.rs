//! Assembles lexer tokens into a [`ConfigDocument`]

use super::document::ConfigDocument;
use super::lexer::{tokenize, Spanned, Token};
use crate::domain::{ExportError, Result};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

/// Bare tokens matching this pattern are numbers
const NUMBER_PATTERN: &str = r"\A-?(0|[1-9][0-9]*)(\.[0-9]+)?\z";

fn number_pattern() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(NUMBER_PATTERN).expect("number pattern is valid"))
}

/// Returns true if a bare word would be read back as a number
pub fn is_number_literal(word: &str) -> bool {
    number_pattern().is_match(word)
}

/// Parses configuration text
///
/// Text that is already a JSON object is decoded directly, which lets
/// machine-written templates sit next to hand-written ones.
///
/// # Errors
///
/// Returns [`ExportError::Syntax`] for unterminated strings, unbalanced
/// braces and misplaced tokens.
pub fn parse(text: &str) -> Result<ConfigDocument> {
    if let Ok(Value::Object(doc)) = serde_json::from_str::<Value>(text) {
        return Ok(doc);
    }
    let tokens = tokenize(text)?;
    Parser::new(&tokens).document()
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    fn document(&mut self) -> Result<ConfigDocument> {
        self.block_body(false)
    }

    fn block_body(&mut self, nested: bool) -> Result<ConfigDocument> {
        let mut doc = ConfigDocument::new();
        loop {
            match self.peek() {
                None if nested => {
                    return Err(ExportError::syntax(self.line(), "unbalanced braces: missing '}'"))
                }
                None => return Ok(doc),
                Some(Token::CloseBrace) if nested => {
                    self.pos += 1;
                    return Ok(doc);
                }
                Some(Token::CloseBrace) => {
                    return Err(ExportError::syntax(self.line(), "unbalanced braces: unexpected '}'"))
                }
                Some(Token::Semicolon) => self.pos += 1,
                Some(Token::Word(key)) => {
                    self.pos += 1;
                    self.entry(key, &mut doc)?;
                }
                Some(other) => {
                    return Err(ExportError::syntax(
                        self.line(),
                        format!("expected a key, found {}", other.describe()),
                    ))
                }
            }
        }
    }

    fn entry(&mut self, key: &str, doc: &mut ConfigDocument) -> Result<()> {
        let has_equals = matches!(self.peek(), Some(Token::Equals));
        if has_equals {
            self.pos += 1;
        }

        if matches!(self.peek(), Some(Token::OpenBrace)) {
            self.pos += 1;
            let block = self.block_body(true)?;
            insert_block(doc, key, block);
            return Ok(());
        }

        if !has_equals {
            return Err(ExportError::syntax(
                self.line(),
                format!("expected '=' or '{{' after '{key}'"),
            ));
        }

        let start = self.pos;
        while let Some(Token::Word(_) | Token::Quoted(_)) = self.peek() {
            self.pos += 1;
        }
        let parts = &self.tokens[start..self.pos];
        if parts.is_empty() {
            return Err(ExportError::syntax(
                self.line(),
                format!("missing value for '{key}'"),
            ));
        }

        match self.peek() {
            None | Some(Token::CloseBrace) => {}
            Some(Token::Semicolon) => self.pos += 1,
            Some(other) => {
                return Err(ExportError::syntax(
                    self.line(),
                    format!("expected ';' after value of '{key}', found {}", other.describe()),
                ))
            }
        }

        doc.insert(key.to_string(), scalar(parts));
        Ok(())
    }
}

/// Repeated blocks under one key collect into a list
fn insert_block(doc: &mut ConfigDocument, key: &str, block: ConfigDocument) {
    let block = Value::Object(block);
    match doc.get_mut(key) {
        Some(Value::Array(items)) if items.iter().all(Value::is_object) => items.push(block),
        Some(existing) if existing.is_object() => {
            let first = existing.take();
            *existing = Value::Array(vec![first, block]);
        }
        _ => {
            doc.insert(key.to_string(), block);
        }
    }
}

/// Turns the tokens of one value into a scalar
fn scalar(parts: &[Spanned]) -> Value {
    if let [single] = parts {
        match &single.token {
            Token::Quoted(text) => return Value::String(text.clone()),
            Token::Word(word) => return bare_word(word),
            _ => {}
        }
    }

    let joined: String = parts
        .iter()
        .filter_map(|s| match &s.token {
            Token::Word(text) | Token::Quoted(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    Value::String(joined)
}

fn bare_word(word: &str) -> Value {
    match word {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if is_number_literal(word) {
        if let Some(number) = parse_number(word) {
            return Value::Number(number);
        }
    }
    Value::String(word.to_string())
}

fn parse_number(word: &str) -> Option<Number> {
    if word.contains('.') {
        return word.parse::<f64>().ok().and_then(Number::from_f64);
    }
    if let Ok(n) = word.parse::<i64>() {
        return Some(Number::from(n));
    }
    if let Ok(n) = word.parse::<u64>() {
        return Some(Number::from(n));
    }
    word.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn doc(value: Value) -> ConfigDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_export_block() {
        let text = r#"
# Export for share1
EXPORT {
    Export_Id = 101;
    Path = "/exports/share1";
    Pseudo = /exports/share1_acc1;
    Tag = acc1;
    CLIENT {
        Clients = 10.0.0.5;
        Access_Type = RW;
    }
    FSAL { Name = VFS; }
}
"#;
        let parsed = parse(text).unwrap();
        assert_eq!(
            parsed,
            doc(json!({
                "EXPORT": {
                    "Export_Id": 101,
                    "Path": "/exports/share1",
                    "Pseudo": "/exports/share1_acc1",
                    "Tag": "acc1",
                    "CLIENT": {"Clients": "10.0.0.5", "Access_Type": "RW"},
                    "FSAL": {"Name": "VFS"}
                }
            }))
        );
    }

    #[test]
    fn test_block_with_equals_and_trailing_semicolons() {
        let parsed = parse("A = { B = 1; }; C { D = x }").unwrap();
        assert_eq!(parsed, doc(json!({"A": {"B": 1}, "C": {"D": "x"}})));
    }

    #[test]
    fn test_missing_semicolon_at_end_of_input() {
        assert_eq!(parse("A = 1").unwrap(), doc(json!({"A": 1})));
    }

    #[test_case("42", json!(42) ; "integer")]
    #[test_case("-7", json!(-7) ; "negative integer")]
    #[test_case("0", json!(0) ; "zero")]
    #[test_case("2.5", json!(2.5) ; "decimal")]
    #[test_case("007", json!("007") ; "leading zero stays a string")]
    #[test_case("1.", json!("1.") ; "dangling dot stays a string")]
    #[test_case("true", json!(true) ; "boolean")]
    #[test_case("RW", json!("RW") ; "word")]
    #[test_case("\"100\"", json!("100") ; "quoted number stays a string")]
    fn test_value_typing(literal: &str, expected: Value) {
        let parsed = parse(&format!("V = {literal};")).unwrap();
        assert_eq!(parsed.get("V"), Some(&expected));
    }

    #[test]
    fn test_multi_token_value_is_concatenated() {
        let parsed = parse("Clients = 10.0.0.1, 10.0.0.2;").unwrap();
        assert_eq!(parsed.get("Clients"), Some(&json!("10.0.0.1,10.0.0.2")));

        let parsed = parse(r#"Tag = "ab" "cd";"#).unwrap();
        assert_eq!(parsed.get("Tag"), Some(&json!("abcd")));
    }

    #[test]
    fn test_repeated_blocks_become_list() {
        let parsed = parse("CLIENT { Clients = a; } CLIENT { Clients = b; } CLIENT { Clients = c; }")
            .unwrap();
        assert_eq!(
            parsed.get("CLIENT"),
            Some(&json!([{"Clients": "a"}, {"Clients": "b"}, {"Clients": "c"}]))
        );
    }

    #[test]
    fn test_repeated_scalar_last_wins() {
        assert_eq!(parse("A = 1; A = 2;").unwrap(), doc(json!({"A": 2})));
    }

    #[test]
    fn test_json_short_circuit() {
        let parsed = parse(r#"{"EXPORT": {"Export_Id": 5, "Path": null}}"#).unwrap();
        assert_eq!(parsed, doc(json!({"EXPORT": {"Export_Id": 5, "Path": null}})));
    }

    #[test]
    fn test_empty_text() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# only a comment\n").unwrap().is_empty());
    }

    #[test_case("EXPORT { Path = /a;" ; "missing close brace")]
    #[test_case("Path = /a; }" ; "stray close brace")]
    #[test_case("Path /a;" ; "missing equals")]
    #[test_case("Path = ;" ; "missing value")]
    #[test_case("A = 1 B = 2;" ; "missing separator")]
    #[test_case("= 1;" ; "missing key")]
    #[test_case("Tag = \"open;" ; "unterminated string")]
    fn test_syntax_errors(text: &str) {
        assert!(matches!(parse(text), Err(ExportError::Syntax { .. })));
    }

    #[test]
    fn test_syntax_error_line() {
        let err = parse("A = 1;\nB = 2;\nC D;").unwrap_err();
        assert!(matches!(err, ExportError::Syntax { line: 3, .. }));
    }
}
