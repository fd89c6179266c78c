//! Tokenizer for the Ganesha configuration language
//!
//! The lexer is a finite-state machine: [`transition`] is a pure function
//! from the current [`State`] and one input character to the next state plus
//! the tokens completed by that character. [`tokenize`] drives it over the
//! input and attaches line numbers.

use crate::domain::{ExportError, Result};

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word (keys, unquoted values)
    Word(String),
    /// Quoted string with escapes already decoded
    Quoted(String),
    /// `=`
    Equals,
    /// `;`
    Semicolon,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
}

impl Token {
    /// Human readable rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{w}'"),
            Token::Quoted(s) => format!("\"{s}\""),
            Token::Equals => "'='".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::OpenBrace => "'{'".to_string(),
            Token::CloseBrace => "'}'".to_string(),
        }
    }
}

/// Token with the (1-based) line it ended on
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

/// Lexer state; buffers travel inside the state value
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    /// Between tokens
    Between,
    /// Inside a bare word
    Word(String),
    /// Inside a quoted string
    Quoted(String),
    /// Just consumed a backslash inside a quoted string
    Escape(String),
    /// Inside a `#` comment, until end of line
    Comment,
}

/// Tokens completed by a single transition
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    Nothing,
    One(Token),
    Two(Token, Token),
}

fn structural(c: char) -> Option<Token> {
    match c {
        '=' => Some(Token::Equals),
        ';' => Some(Token::Semicolon),
        '{' => Some(Token::OpenBrace),
        '}' => Some(Token::CloseBrace),
        _ => None,
    }
}

/// Returns true for characters that end a bare word
pub fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '#' || c == '"' || structural(c).is_some()
}

/// Advances the state machine by one character
pub fn transition(state: State, c: char) -> (State, Emit) {
    match state {
        State::Between => match c {
            '#' => (State::Comment, Emit::Nothing),
            '"' => (State::Quoted(String::new()), Emit::Nothing),
            c if c.is_whitespace() => (State::Between, Emit::Nothing),
            c => match structural(c) {
                Some(token) => (State::Between, Emit::One(token)),
                None => (State::Word(c.to_string()), Emit::Nothing),
            },
        },
        State::Word(mut word) => match c {
            '#' => (State::Comment, Emit::One(Token::Word(word))),
            '"' => (State::Quoted(String::new()), Emit::One(Token::Word(word))),
            c if c.is_whitespace() => (State::Between, Emit::One(Token::Word(word))),
            c => match structural(c) {
                Some(token) => (State::Between, Emit::Two(Token::Word(word), token)),
                None => {
                    word.push(c);
                    (State::Word(word), Emit::Nothing)
                }
            },
        },
        State::Quoted(mut text) => match c {
            '"' => (State::Between, Emit::One(Token::Quoted(text))),
            '\\' => (State::Escape(text), Emit::Nothing),
            c => {
                text.push(c);
                (State::Quoted(text), Emit::Nothing)
            }
        },
        State::Escape(mut text) => {
            text.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            (State::Quoted(text), Emit::Nothing)
        }
        State::Comment => match c {
            '\n' => (State::Between, Emit::Nothing),
            _ => (State::Comment, Emit::Nothing),
        },
    }
}

/// Splits configuration text into tokens
///
/// # Errors
///
/// Returns [`ExportError::Syntax`] if a quoted string is not terminated.
pub fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut state = State::Between;
    let mut line = 1;
    let mut quote_line = 1;

    for c in text.chars() {
        let was_quoted = matches!(state, State::Quoted(_) | State::Escape(_));
        let (next, emit) = transition(state, c);
        if !was_quoted && matches!(next, State::Quoted(_)) {
            quote_line = line;
        }
        match emit {
            Emit::Nothing => {}
            Emit::One(token) => tokens.push(Spanned { token, line }),
            Emit::Two(first, second) => {
                tokens.push(Spanned { token: first, line });
                tokens.push(Spanned {
                    token: second,
                    line,
                });
            }
        }
        if c == '\n' {
            line += 1;
        }
        state = next;
    }

    match state {
        State::Word(word) => tokens.push(Spanned {
            token: Token::Word(word),
            line,
        }),
        State::Quoted(_) | State::Escape(_) => {
            return Err(ExportError::syntax(
                quote_line,
                "unterminated quoted string",
            ))
        }
        State::Between | State::Comment => {}
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    fn word(w: &str) -> Token {
        Token::Word(w.to_string())
    }

    #[test]
    fn test_transition_word_then_structural() {
        let (state, emit) = transition(State::Word("Path".to_string()), '=');
        assert_eq!(state, State::Between);
        assert_eq!(emit, Emit::Two(word("Path"), Token::Equals));
    }

    #[test]
    fn test_transition_escape_returns_to_quote() {
        let (state, emit) = transition(State::Escape("a".to_string()), '"');
        assert_eq!(state, State::Quoted("a\"".to_string()));
        assert_eq!(emit, Emit::Nothing);
    }

    #[test]
    fn test_tokenize_assignment() {
        assert_eq!(
            kinds("Path = /exports/share1;"),
            vec![word("Path"), Token::Equals, word("/exports/share1"), Token::Semicolon]
        );
    }

    #[test]
    fn test_tokenize_block_without_spaces() {
        assert_eq!(
            kinds("EXPORT{Export_Id=1;}"),
            vec![
                word("EXPORT"),
                Token::OpenBrace,
                word("Export_Id"),
                Token::Equals,
                word("1"),
                Token::Semicolon,
                Token::CloseBrace,
            ]
        );
    }

    #[test_case("# full line\nA = 1;", 4 ; "full line comment")]
    #[test_case("A = 1; # trailing", 4 ; "trailing comment")]
    #[test_case("A = b#c\n;", 4 ; "comment ends a word")]
    fn test_tokenize_comments(text: &str, count: usize) {
        assert_eq!(kinds(text).len(), count);
    }

    #[test]
    fn test_hash_inside_quotes_is_not_comment() {
        assert_eq!(
            kinds(r#"Tag = "a # b";"#),
            vec![
                word("Tag"),
                Token::Equals,
                Token::Quoted("a # b".to_string()),
                Token::Semicolon
            ]
        );
    }

    #[test_case(r#""say \"hi\"""#, "say \"hi\"" ; "escaped quote")]
    #[test_case(r#""back\\slash""#, "back\\slash" ; "escaped backslash")]
    #[test_case(r#""two\nlines""#, "two\nlines" ; "escaped newline")]
    fn test_tokenize_escapes(text: &str, expected: &str) {
        assert_eq!(kinds(text), vec![Token::Quoted(expected.to_string())]);
    }

    #[test]
    fn test_unterminated_quote_reports_opening_line() {
        let err = tokenize("A = 1;\nB = \"open\n\nC = 2;").unwrap_err();
        match err {
            ExportError::Syntax { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("unterminated"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("A = 1;\n\nB = 2;").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[4].line, 3);
    }
}
