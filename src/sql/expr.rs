//! Catalog SQL expressions as tokenized templates.
//!
//! Dimension and metric expressions are written by catalog authors in plain
//! SQL, e.g. `DATE(created_at)` or `amount_usd * (1 - {crm.customers.discount_rate})`.
//! Before rendering, an expression is scanned into text segments and column
//! references, so substitution happens on whole tokens only. A column named
//! `amount` never matches inside `amount_usd`, string literals and quoted
//! identifiers are copied verbatim, and function names stay untouched.
//!
//! Column references come in two forms:
//!
//! - placeholders `{column}`, `{table.column}`, `{schema.table.column}`
//! - bare identifiers, recognised according to [`BareColumns`]
//!
//! In measure expressions a bare word that is a SQL keyword (`AT`, `ZONE`,
//! `EPOCH`, `FROM`...) stays text unless the entity declares a column of that
//! name or the word is the whole expression. A keyword-named column that is
//! not declared must be written as a `{column}` placeholder.

use std::fmt;

use sqlparser::keywords::ALL_KEYWORDS;

/// Errors raised while scanning an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("unterminated placeholder in expression '{expression}'")]
    UnterminatedPlaceholder { expression: String },

    #[error("invalid placeholder '{{{placeholder}}}' in expression '{expression}'")]
    InvalidPlaceholder {
        placeholder: String,
        expression: String,
    },

    #[error("unterminated quote in expression '{expression}'")]
    UnterminatedQuote { expression: String },
}

/// A column reference found in an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub schema: Option<String>,
    /// Physical table. `None` means the entity owning the expression.
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn local(column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: None,
            column: column.into(),
        }
    }

    /// Parse `column`, `table.column` or `schema.table.column`.
    pub fn parse(reference: &str) -> Option<Self> {
        let parts: Vec<&str> = reference.trim().split('.').map(str::trim).collect();
        if !parts.iter().all(|p| is_identifier(p)) {
            return None;
        }
        match parts.as_slice() {
            [column] => Some(Self::local(*column)),
            [table, column] => Some(Self {
                schema: None,
                table: Some(table.to_string()),
                column: column.to_string(),
            }),
            [schema, table, column] => Some(Self {
                schema: Some(schema.to_string()),
                table: Some(table.to_string()),
                column: column.to_string(),
            }),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.table.is_none()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        if let Some(table) = &self.table {
            write!(f, "{}.", table)?;
        }
        f.write_str(&self.column)
    }
}

/// Which bare identifiers count as column references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BareColumns<'a> {
    /// Only this exact column name (dimension expressions).
    Only(&'a str),
    /// Any identifier that is not a function name and not a keyword, plus
    /// keyword-named words in the declared column list (metric measure
    /// expressions).
    Identifiers(&'a [&'a str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Column(ColumnRef),
}

/// A scanned expression ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    segments: Vec<Segment>,
}

impl SqlTemplate {
    pub fn parse(source: &str, bare: BareColumns<'_>) -> Result<Self, ExprError> {
        Scanner::new(source, bare).run()
    }

    /// A template consisting of a single column reference.
    pub fn column(reference: ColumnRef) -> Self {
        Self {
            segments: vec![Segment::Column(reference)],
        }
    }

    /// Column references in order of appearance.
    pub fn references(&self) -> impl Iterator<Item = &ColumnRef> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Column(reference) => Some(reference),
            Segment::Text(_) => None,
        })
    }

    /// Render the expression, replacing each column reference with the
    /// string returned by `resolve`.
    pub fn render<F, E>(&self, mut resolve: F) -> Result<String, E>
    where
        F: FnMut(&ColumnRef) -> Result<String, E>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Column(reference) => out.push_str(&resolve(reference)?),
            }
        }
        Ok(out)
    }
}

/// Whether `word` is a keyword in any SQL dialect sqlparser knows.
pub fn is_keyword(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    ALL_KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    bare: BareColumns<'a>,
    segments: Vec<Segment>,
    text: String,
    /// Last two non-whitespace characters emitted, most recent first.
    last: [Option<char>; 2],
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, bare: BareColumns<'a>) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            bare,
            segments: Vec::new(),
            text: String::new(),
            last: [None, None],
        }
    }

    fn run(mut self) -> Result<SqlTemplate, ExprError> {
        while let Some(&c) = self.chars.get(self.pos) {
            match c {
                '\'' | '"' | '`' => self.quoted(c)?,
                '{' => self.placeholder()?,
                c if c.is_ascii_digit() => {
                    let token = self.take_while(is_word_char_or_dot);
                    self.emit_text(&token);
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.word(),
                c => {
                    self.pos += 1;
                    self.emit_text(&c.to_string());
                }
            }
        }
        self.flush();
        Ok(SqlTemplate {
            segments: self.segments,
        })
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.chars.get(self.pos).is_some_and(|&c| pred(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn next_significant(&self) -> Option<char> {
        self.chars[self.pos..]
            .iter()
            .copied()
            .find(|c| !c.is_whitespace())
    }

    fn emit_text(&mut self, text: &str) {
        self.text.push_str(text);
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            self.last = [Some(c), self.last[0]];
        }
    }

    fn emit_column(&mut self, reference: ColumnRef) {
        self.flush();
        self.segments.push(Segment::Column(reference));
        self.last = [Some('_'), self.last[0]];
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.segments
                .push(Segment::Text(std::mem::take(&mut self.text)));
        }
    }

    /// Copy a string literal or quoted identifier verbatim. A doubled quote
    /// character inside is an escape.
    fn quoted(&mut self, quote: char) -> Result<(), ExprError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.chars.get(self.pos) {
                None => {
                    return Err(ExprError::UnterminatedQuote {
                        expression: self.source.to_string(),
                    })
                }
                Some(&c) if c == quote => {
                    if self.chars.get(self.pos + 1) == Some(&quote) {
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        self.emit_text(&literal);
        Ok(())
    }

    fn placeholder(&mut self) -> Result<(), ExprError> {
        let open = self.pos;
        let Some(offset) = self.chars[open..].iter().position(|&c| c == '}') else {
            return Err(ExprError::UnterminatedPlaceholder {
                expression: self.source.to_string(),
            });
        };
        let close = open + offset;
        let inner: String = self.chars[open + 1..close].iter().collect();
        self.pos = close + 1;

        let reference = ColumnRef::parse(&inner).ok_or_else(|| ExprError::InvalidPlaceholder {
            placeholder: inner.clone(),
            expression: self.source.to_string(),
        })?;
        self.emit_column(reference);
        Ok(())
    }

    fn word(&mut self) {
        let word = self.take_while(is_word_char);

        let qualified = self.last[0] == Some('.') || self.next_significant() == Some('.');
        let cast_target = self.last == [Some(':'), Some(':')];
        let is_column = !qualified
            && !cast_target
            && match self.bare {
                BareColumns::Only(column) => word == column,
                BareColumns::Identifiers(declared) => {
                    self.next_significant() != Some('(')
                        && (declared.contains(&word.as_str())
                            || self.source.trim() == word
                            || !is_keyword(&word))
                }
            };

        if is_column {
            self.emit_column(ColumnRef::local(word));
        } else {
            self.emit_text(&word);
        }
    }
}

fn is_word_char_or_dot(c: char) -> bool {
    is_word_char(c) || c == '.'
}
