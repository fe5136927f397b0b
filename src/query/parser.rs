//! Expression string parser.
//!
//! Parses the subset of the query language the engine evaluates: paths
//! (`.`, `.a.b`, `."key"`, `.[0]`, `.[]`), literals, object construction
//! (`{"a": .b}`), pipes, unions, parentheses and the merge family
//! (`*`, `*+`, `*?`, `*?+`).

use super::ast::{ExpressionNode, OperatorKind};
use super::error::ParseError;
use crate::document::node::{tags, Node};
use crate::engine::merge::MergeFlags;

/// Parser for expression strings.
pub struct Parser {
    input: Vec<char>,
    position: usize,
}

impl Parser {
    /// Creates a new parser for the given expression.
    pub fn new(expression: &str) -> Self {
        Self {
            input: expression.chars().collect(),
            position: 0,
        }
    }

    /// Parses the expression string into an operator tree.
    pub fn parse(expression: &str) -> Result<ExpressionNode, ParseError> {
        let mut parser = Parser::new(expression);
        let expr = parser.parse_pipe()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(expr),
            Some(ch) => Err(ParseError::UnexpectedToken {
                position: parser.position,
                found: ch.to_string(),
                expected: "end of expression".to_string(),
            }),
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Returns the next character and advances position.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    /// Expects a specific character and advances, or returns an error.
    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        let pos = self.position;
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(ParseError::UnexpectedToken {
                position: pos,
                found: ch.to_string(),
                expected: format!("'{}'", expected),
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: format!("'{}'", expected),
            }),
        }
    }

    fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '-'
    }

    fn parse_pipe(&mut self) -> Result<ExpressionNode, ParseError> {
        let mut lhs = self.parse_union()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some('|') {
                return Ok(lhs);
            }
            self.next();
            let rhs = self.parse_union()?;
            lhs = ExpressionNode::pipe(lhs, rhs);
        }
    }

    fn parse_union(&mut self) -> Result<ExpressionNode, ParseError> {
        let mut lhs = self.parse_multiply()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some(',') {
                return Ok(lhs);
            }
            self.next();
            let rhs = self.parse_multiply()?;
            lhs = ExpressionNode::union(lhs, rhs);
        }
    }

    fn parse_multiply(&mut self) -> Result<ExpressionNode, ParseError> {
        let mut lhs = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            if self.peek() != Some('*') {
                return Ok(lhs);
            }
            self.next();
            let mut flags = MergeFlags::PLAIN;
            if self.peek() == Some('?') {
                self.next();
                flags.only_existing_keys = true;
            }
            if self.peek() == Some('+') {
                self.next();
                flags.append_arrays = true;
            }
            let rhs = self.parse_primary()?;
            lhs = ExpressionNode::merge(flags, lhs, rhs);
        }
    }

    fn parse_primary(&mut self) -> Result<ExpressionNode, ParseError> {
        self.skip_whitespace();
        let position = self.position;
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd {
                expected: "an expression".to_string(),
            }),
            Some('.') => self.parse_path(),
            Some('"') => {
                let text = self.parse_string()?;
                Ok(ExpressionNode::literal(Node::string(text)))
            }
            Some('{') => self.parse_object(),
            Some('[') => {
                self.next();
                self.skip_whitespace();
                if self.peek() == Some(']') {
                    self.next();
                    Ok(ExpressionNode::literal(Node::sequence(Vec::new())))
                } else {
                    Err(ParseError::InvalidSyntax {
                        message: "only the empty sequence [] can be constructed".to_string(),
                    })
                }
            }
            Some('(') => {
                self.next();
                let inner = self.parse_pipe()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' => self.parse_number(),
            Some(ch) if ch.is_alphabetic() => {
                let word = self.parse_identifier();
                keyword_literal(&word)
                    .map(ExpressionNode::literal)
                    .ok_or(ParseError::UnexpectedToken {
                        position,
                        found: word,
                        expected: "an expression".to_string(),
                    })
            }
            Some(ch) => Err(ParseError::UnexpectedToken {
                position,
                found: ch.to_string(),
                expected: "an expression".to_string(),
            }),
        }
    }

    /// Parses `.`, `.a.b`, `."a b"`, `.[0]`, `.[]` and chains of them.
    fn parse_path(&mut self) -> Result<ExpressionNode, ParseError> {
        self.expect('.')?;
        let mut path = match self.parse_path_segment()? {
            Some(segment) => segment,
            None => return Ok(ExpressionNode::leaf(OperatorKind::SelfReference)),
        };
        loop {
            let continues = match self.peek() {
                Some('.') => matches!(
                    self.peek_at(1),
                    Some(ch) if ch == '"' || ch == '[' || Self::is_identifier_char(ch)
                ),
                Some('[') => true,
                _ => false,
            };
            if !continues {
                return Ok(path);
            }
            if self.peek() == Some('.') {
                self.next();
            }
            if let Some(segment) = self.parse_path_segment()? {
                path = ExpressionNode::pipe(path, segment);
            }
        }
    }

    fn parse_path_segment(&mut self) -> Result<Option<ExpressionNode>, ParseError> {
        match self.peek() {
            Some('"') => {
                let key = self.parse_string()?;
                Ok(Some(ExpressionNode::leaf(OperatorKind::TraverseKey(key))))
            }
            Some('[') => self.parse_bracket().map(Some),
            Some(ch) if Self::is_identifier_char(ch) => {
                let key = self.parse_identifier();
                Ok(Some(ExpressionNode::leaf(OperatorKind::TraverseKey(key))))
            }
            _ => Ok(None),
        }
    }

    /// Parses bracket expression: [index], ["key"], []
    fn parse_bracket(&mut self) -> Result<ExpressionNode, ParseError> {
        self.expect('[')?;
        self.skip_whitespace();
        let operator = match self.peek() {
            Some(']') => OperatorKind::Splat,
            Some('"') => OperatorKind::TraverseKey(self.parse_string()?),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => {
                let start = self.position;
                let mut text = String::new();
                if ch == '-' {
                    text.push(ch);
                    self.next();
                }
                while let Some(digit) = self.peek().filter(char::is_ascii_digit) {
                    text.push(digit);
                    self.next();
                }
                let index = text.parse::<i64>().map_err(|_| ParseError::UnexpectedToken {
                    position: start,
                    found: text.clone(),
                    expected: "an index".to_string(),
                })?;
                OperatorKind::TraverseIndex(index)
            }
            _ => {
                return Err(ParseError::InvalidSyntax {
                    message: "Invalid bracket expression".to_string(),
                })
            }
        };
        self.expect(']')?;
        Ok(ExpressionNode::leaf(operator))
    }

    /// Parses `{}` or `{key: value, ...}`.
    fn parse_object(&mut self) -> Result<ExpressionNode, ParseError> {
        self.expect('{')?;
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.next();
            return Ok(ExpressionNode::leaf(OperatorKind::CollectObject));
        }

        let mut entries: Option<ExpressionNode> = None;
        loop {
            let key = self.parse_object_key()?;
            self.expect(':')?;
            let value = self.parse_multiply()?;
            let entry = ExpressionNode::binary(OperatorKind::CreateMap, key, value);
            entries = Some(match entries {
                Some(previous) => ExpressionNode::union(previous, entry),
                None => entry,
            });

            self.skip_whitespace();
            let pos = self.position;
            match self.next() {
                Some(',') => continue,
                Some('}') => break,
                Some(ch) => {
                    return Err(ParseError::UnexpectedToken {
                        position: pos,
                        found: ch.to_string(),
                        expected: "',' or '}'".to_string(),
                    })
                }
                None => {
                    return Err(ParseError::UnexpectedEnd {
                        expected: "'}'".to_string(),
                    })
                }
            }
        }

        match entries {
            Some(entries) => Ok(ExpressionNode::unary(OperatorKind::CollectObject, entries)),
            None => Ok(ExpressionNode::leaf(OperatorKind::CollectObject)),
        }
    }

    /// Bare words are string keys; anything else is an expression.
    fn parse_object_key(&mut self) -> Result<ExpressionNode, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch.is_alphabetic() => {
                let word = self.parse_identifier();
                Ok(ExpressionNode::literal(
                    keyword_literal(&word).unwrap_or_else(|| Node::string(word)),
                ))
            }
            _ => self.parse_multiply(),
        }
    }

    /// Parses an identifier (key name).
    fn parse_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek().filter(|&c| Self::is_identifier_char(c)) {
            name.push(ch);
            self.next();
        }
        name
    }

    /// Parses a double-quoted string with `\"`, `\\`, `\n` and `\t` escapes.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut text = String::new();
        loop {
            match self.next() {
                Some('"') => return Ok(text),
                Some('\\') => match self.next() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(ch) => text.push(ch),
                    None => break,
                },
                Some(ch) => text.push(ch),
                None => break,
            }
        }
        Err(ParseError::UnexpectedEnd {
            expected: "'\"'".to_string(),
        })
    }

    fn parse_number(&mut self) -> Result<ExpressionNode, ParseError> {
        let start = self.position;
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            let sign_allowed = text.is_empty() || text.ends_with(&['e', 'E'][..]);
            if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E') || (ch == '-' && sign_allowed)
            {
                text.push(ch);
                self.next();
            } else {
                break;
            }
        }
        let node = Node::plain(text.clone());
        if node.tag() == tags::INT || node.tag() == tags::FLOAT {
            Ok(ExpressionNode::literal(node))
        } else {
            Err(ParseError::UnexpectedToken {
                position: start,
                found: text,
                expected: "a number".to_string(),
            })
        }
    }
}

fn keyword_literal(word: &str) -> Option<Node> {
    match word {
        "true" => Some(Node::boolean(true)),
        "false" => Some(Node::boolean(false)),
        "null" => Some(Node::null()),
        _ => None,
    }
}
