//! Lexer: raw expression text -> ordered leaf tokens tagged with bracket nesting level.
use crate::symbolic::registry::BracketRegistry;
use regex::Regex;
use std::sync::LazyLock;
use strum_macros::Display;
use tabled::settings::Style;
use tabled::{Table, Tabled};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[.0-9]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    #[strum(serialize = "number")]
    Number,
    #[strum(serialize = "word")]
    Word,
    #[strum(serialize = "op")]
    Operator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// bracket nesting level, only meaningful until the tree is built
    pub level: i32,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Self {
        Token {
            kind,
            text: text.to_string(),
            level: 0,
        }
    }
}

/// letters, digits, `.`, `_` and CJK ideographs
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn flush(buffer: &mut String, tokens: &mut Vec<Token>) {
    let word = buffer.trim();
    if !word.is_empty() {
        let kind = if NUMBER.is_match(word) {
            TokenKind::Number
        } else {
            TokenKind::Word
        };
        tokens.push(Token::new(kind, word));
    }
    buffer.clear();
}

/// Splits `line` into tokens. Runs of word characters become one `number` or `word`
/// token; every other non-blank character is an operator token of its own.
/// Levels follow the registered bracket pairs: an opener gets the level it opens
/// from, a closer the level after leaving the group.
pub fn tokenize(line: &str, brackets: &BracketRegistry) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    for c in line.trim().chars() {
        if is_word_char(c) {
            buffer.push(c);
            continue;
        }
        flush(&mut buffer, &mut tokens);
        if !c.is_whitespace() {
            tokens.push(Token::new(TokenKind::Operator, &c.to_string()));
        }
    }
    flush(&mut buffer, &mut tokens);

    let mut level = 0;
    for token in tokens.iter_mut() {
        if brackets.is_opener(&token.text) {
            token.level = level;
            level += 1;
        } else if brackets.is_closer(&token.text) {
            level -= 1;
            token.level = level;
        } else {
            token.level = level;
        }
    }
    tokens
}

#[derive(Tabled)]
struct TokenRow {
    no: usize,
    text: String,
    kind: TokenKind,
    level: i32,
    is_operator: bool,
}

/// Pretty table of a token sequence for debug logging.
pub fn token_table(tokens: &[Token], is_operator: impl Fn(&str) -> bool) -> String {
    let rows = tokens.iter().enumerate().map(|(no, t)| TokenRow {
        no,
        text: t.text.clone(),
        kind: t.kind,
        level: t.level,
        is_operator: is_operator(&t.text),
    });
    let mut table = Table::new(rows);
    table.with(Style::modern_rounded());
    table.to_string()
}
