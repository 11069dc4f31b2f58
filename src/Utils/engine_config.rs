//! Engine configuration document.
//!
//! Plain text made of sections: a title line followed by `key: value1, value2` lines.
//! Lines starting with `//`, `#`, `%` or `;` are comments.
//!
//! ```text
//! engine
//!   max_depth: 256
//! priority
//!   set: ^=3.5, mod=2
//! brackets
//!   pairs: [], {}
//! logging
//!   loglevel: info
//!   log_to_file: false
//! ```
use crate::symbolic::errors::AlgebraError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A single scalar of a value list, typed by the first successful parse:
/// integer, float, boolean, otherwise text.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Integer(v) => write!(f, "{}", v),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Boolean(v) => write!(f, "{}", v),
            ConfigValue::Text(v) => write!(f, "{}", v),
        }
    }
}

pub type Section = HashMap<String, Vec<ConfigValue>>;
pub type Document = HashMap<String, Section>;

/// identifier: letter or `_`, then letters, digits, `_`
fn parse_name(input: &str) -> IResult<&str, String> {
    let mut parser = map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        String::from,
    );
    parser.parse(input)
}

fn parse_value(input: &str) -> IResult<&str, ConfigValue> {
    let mut parser = map(
        take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';')),
        |s: &str| {
            if let Ok(v) = s.parse::<i64>() {
                ConfigValue::Integer(v)
            } else if let Ok(v) = s.parse::<f64>() {
                ConfigValue::Float(v)
            } else if let Ok(v) = s.parse::<bool>() {
                ConfigValue::Boolean(v)
            } else {
                ConfigValue::Text(s.to_string())
            }
        },
    );
    parser.parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<ConfigValue>> {
    let (input, _) = space0(input)?;
    let separator = delimited(space0, tag(","), space0);
    separated_list0(separator, parse_value).parse(input)
}

fn parse_entry(input: &str) -> IResult<&str, (String, Vec<ConfigValue>)> {
    let colon = delimited(space0, tag(":"), space0);
    let (input, entry) = separated_pair(parse_name, colon, parse_value_list).parse(input)?;
    Ok((input.trim_start(), entry))
}

fn parse_section(input: &str) -> IResult<&str, (String, Vec<(String, Vec<ConfigValue>)>)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_name(input)?;
    let (input, _) = multispace0(input)?;
    let (input, entries) = many1(terminated(parse_entry, space0)).parse(input)?;
    Ok((input, (title, entries)))
}

fn strip_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses a whole document; trailing unparsed text is an error.
pub fn parse_document(input: &str) -> Result<Document, AlgebraError> {
    let text = strip_comments(input);
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    let (remaining, sections) = parser
        .parse(text.as_str())
        .map_err(|e| AlgebraError::Config(format!("parsing error: {:?}", e)))?;
    if !remaining.trim().is_empty() {
        return Err(AlgebraError::Config(format!(
            "failed to parse entire document, remaining: '{}'",
            remaining
        )));
    }
    let mut document = Document::new();
    for (title, entries) in sections {
        let section = document.entry(title).or_default();
        for (key, values) in entries {
            section.entry(key).or_default().extend(values);
        }
    }
    Ok(document)
}

/// Settings applied by [`crate::symbolic::algebra_engine::AlgebraEngine::with_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_depth: usize,
    /// priority overrides in document order
    pub priorities: Vec<(String, f64)>,
    /// extra (open, close) bracket pairs
    pub brackets: Vec<(String, String)>,
    pub loglevel: Option<String>,
    pub log_to_file: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            priorities: Vec::new(),
            brackets: Vec::new(),
            loglevel: None,
            log_to_file: false,
        }
    }
}

fn config_error(section: &str, key: &str, message: impl fmt::Display) -> AlgebraError {
    AlgebraError::Config(format!("{}/{}: {}", section, key, message))
}

fn single<'a>(section: &str, key: &str, values: &'a [ConfigValue]) -> Result<&'a ConfigValue, AlgebraError> {
    match values {
        [value] => Ok(value),
        _ => Err(config_error(section, key, "expected exactly one value")),
    }
}

impl EngineConfig {
    pub fn from_document(text: &str) -> Result<Self, AlgebraError> {
        let document = parse_document(text)?;
        let mut config = EngineConfig::default();
        for (title, section) in &document {
            for (key, values) in section {
                match (title.as_str(), key.as_str()) {
                    ("engine", "max_depth") => match single(title, key, values)? {
                        ConfigValue::Integer(depth) if *depth > 0 => config.max_depth = *depth as usize,
                        other => return Err(config_error(title, key, format!("expected a positive integer, got {}", other))),
                    },
                    ("priority", "set") => {
                        for value in values {
                            config.priorities.push(parse_priority(title, key, value)?);
                        }
                    }
                    ("brackets", "pairs") => {
                        for value in values {
                            config.brackets.push(parse_bracket_pair(title, key, value)?);
                        }
                    }
                    ("logging", "loglevel") => {
                        config.loglevel = Some(single(title, key, values)?.to_string());
                    }
                    ("logging", "log_to_file") => match single(title, key, values)? {
                        ConfigValue::Boolean(flag) => config.log_to_file = *flag,
                        other => return Err(config_error(title, key, format!("expected true or false, got {}", other))),
                    },
                    _ => return Err(config_error(title, key, "unknown section or key")),
                }
            }
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AlgebraError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AlgebraError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_document(&text)
    }
}

/// `name=priority`
fn parse_priority(section: &str, key: &str, value: &ConfigValue) -> Result<(String, f64), AlgebraError> {
    let text = value.to_string();
    let (name, priority) = text
        .split_once('=')
        .ok_or_else(|| config_error(section, key, format!("expected name=priority, got {}", text)))?;
    let priority: f64 = priority
        .parse()
        .map_err(|_| config_error(section, key, format!("bad priority in {}", text)))?;
    if name.is_empty() {
        return Err(config_error(section, key, format!("missing operator name in {}", text)));
    }
    Ok((name.to_string(), priority))
}

/// two characters, opener then closer
fn parse_bracket_pair(section: &str, key: &str, value: &ConfigValue) -> Result<(String, String), AlgebraError> {
    let text = value.to_string();
    let chars: Vec<char> = text.chars().collect();
    match chars.as_slice() {
        [open, close] if open != close => Ok((open.to_string(), close.to_string())),
        _ => Err(config_error(section, key, format!("expected a two character pair, got {}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = "engine
  max_depth: 256
priority
  set: ^=3.5, mod=2
// extra grouping markers
brackets
  pairs: [], {}
logging
  loglevel: info
  log_to_file: false
";

    #[test]
    fn test_parse_name_and_value() {
        let (rest, name) = parse_name("max_depth: 3").unwrap();
        assert_eq!(name, "max_depth");
        assert_eq!(rest, ": 3");
        assert_eq!(parse_value("12, x").unwrap().1, ConfigValue::Integer(12));
        assert_eq!(parse_value("1.5").unwrap().1, ConfigValue::Float(1.5));
        assert_eq!(parse_value("true").unwrap().1, ConfigValue::Boolean(true));
        assert_eq!(
            parse_value("^=3.5, mod=2").unwrap(),
            (", mod=2", ConfigValue::Text("^=3.5".to_string()))
        );
    }

    #[test]
    fn test_parse_value_list_and_entry() {
        let (rest, values) = parse_value_list("[] , {}").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            values,
            vec![ConfigValue::Text("[]".to_string()), ConfigValue::Text("{}".to_string())]
        );
        let (rest, (key, values)) = parse_entry("loglevel : debug\nnext: 1").unwrap();
        assert_eq!(key, "loglevel");
        assert_eq!(values, vec![ConfigValue::Text("debug".to_string())]);
        assert_eq!(rest, "next: 1");
    }

    #[test]
    fn test_parse_document_sections() {
        let document = parse_document(DOCUMENT).unwrap();
        assert_eq!(document.len(), 4);
        assert_eq!(document["engine"]["max_depth"], vec![ConfigValue::Integer(256)]);
        assert_eq!(document["logging"]["log_to_file"], vec![ConfigValue::Boolean(false)]);
        assert_eq!(document["priority"]["set"].len(), 2);
    }

    #[test]
    fn test_engine_config_from_document() {
        let config = EngineConfig::from_document(DOCUMENT).unwrap();
        assert_eq!(config.max_depth, 256);
        assert_eq!(
            config.priorities,
            vec![("^".to_string(), 3.5), ("mod".to_string(), 2.0)]
        );
        assert_eq!(
            config.brackets,
            vec![
                ("[".to_string(), "]".to_string()),
                ("{".to_string(), "}".to_string())
            ]
        );
        assert_eq!(config.loglevel.as_deref(), Some("info"));
        assert!(!config.log_to_file);
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        let unknown = EngineConfig::from_document("engine\n  speed: 3\n");
        assert!(matches!(unknown, Err(AlgebraError::Config(_))));
        let bad_depth = EngineConfig::from_document("engine\n  max_depth: -4\n");
        assert!(matches!(bad_depth, Err(AlgebraError::Config(_))));
        let bad_pair = EngineConfig::from_document("brackets\n  pairs: (((\n");
        assert!(matches!(bad_pair, Err(AlgebraError::Config(_))));
        let bad_priority = EngineConfig::from_document("priority\n  set: ^3\n");
        assert!(matches!(bad_priority, Err(AlgebraError::Config(_))));
        assert!(EngineConfig::from_document("").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DOCUMENT).unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_depth, 256);
        let missing = EngineConfig::from_file("/definitely/not/here.cfg");
        assert!(matches!(missing, Err(AlgebraError::Config(_))));
    }
}
