//! Minimal HCL writer for the blocks this tool generates.
//!
//! Values are described as [`Expression`]s and only turned into text when a
//! [`Block`] is rendered, so every string literal goes through the same
//! quoting and template-escaping rules.

use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, PrettyFormatter};
use serde_json::{Map, Number, Value};
use std::io;

use crate::error::{GenerateError, GenerateResult};

/// Right-hand side of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Quoted string literal
    String(String),
    Integer(i64),
    /// Numeric literal preserved exactly as received
    Number(Number),
    /// Bare reference such as `select_usage_group_set.compute.id`
    Traversal(Vec<String>),
    /// `jsonencode(<value>)` with the value written as pretty-printed JSON
    JsonEncode(Value),
}

impl Expression {
    pub fn string(value: impl Into<String>) -> Self {
        Expression::String(value.into())
    }

    pub fn traversal<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expression::Traversal(parts.into_iter().map(Into::into).collect())
    }

    fn render(&self) -> GenerateResult<String> {
        Ok(match self {
            Expression::String(value) => quote_string(value),
            Expression::Integer(value) => value.to_string(),
            Expression::Number(value) => value.to_string(),
            Expression::Traversal(parts) => parts.join("."),
            Expression::JsonEncode(value) => {
                format!("jsonencode({})", to_hcl_json(&escape_json_templates(value))?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BodyItem {
    Attribute { key: String, value: Expression },
    Blank,
}

/// A labelled block, e.g. `resource "type" "name" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    comments: Vec<String>,
    block_type: String,
    labels: Vec<String>,
    body: Vec<BodyItem>,
}

impl Block {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            comments: Vec::new(),
            block_type: block_type.into(),
            labels: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Shorthand for `resource "<resource_type>" "<name>"`
    pub fn resource(resource_type: &str, name: &str) -> Self {
        Self::new("resource").label(resource_type).label(name)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Line comment written directly above the block
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comments.push(text.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: Expression) -> Self {
        self.body.push(BodyItem::Attribute {
            key: key.into(),
            value,
        });
        self
    }

    pub fn optional_attribute(self, key: impl Into<String>, value: Option<Expression>) -> Self {
        match value {
            Some(value) => self.attribute(key, value),
            None => self,
        }
    }

    pub fn blank_line(mut self) -> Self {
        self.body.push(BodyItem::Blank);
        self
    }

    /// Render the block without a trailing newline
    pub fn render(&self) -> GenerateResult<String> {
        let mut out = String::new();

        for comment in &self.comments {
            out.push_str("# ");
            out.push_str(&single_line(comment));
            out.push('\n');
        }

        out.push_str(&self.block_type);
        for label in &self.labels {
            out.push(' ');
            out.push_str(&quote_string(label));
        }
        out.push_str(" {\n");

        // `=` is aligned within each run of attributes, as `terraform fmt` does
        let runs = self.body.split(|item| matches!(item, BodyItem::Blank));
        for (index, run) in runs.enumerate() {
            if index > 0 {
                out.push('\n');
            }

            let attributes: Vec<(&String, &Expression)> = run
                .iter()
                .filter_map(|item| match item {
                    BodyItem::Attribute { key, value } => Some((key, value)),
                    BodyItem::Blank => None,
                })
                .collect();
            let width = attributes
                .iter()
                .map(|(key, _)| key.chars().count())
                .max()
                .unwrap_or(0);

            for (key, value) in attributes {
                out.push_str(&format!("  {:<width$} = {}\n", key, value.render()?));
            }
        }

        out.push('}');
        Ok(out)
    }
}

/// Quote a value as an HCL string literal
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }

    out.push('"');
    out
}

/// Pretty JSON whose escapes HCL also understands
///
/// serde_json writes backspace and form feed as `\b` and `\f`, which are not
/// valid escapes inside an HCL string, so those two become `\u0008` and `\u000c`.
struct HclJsonFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl Formatter for HclJsonFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        match char_escape {
            CharEscape::Backspace => writer.write_all(b"\\u0008"),
            CharEscape::FormFeed => writer.write_all(b"\\u000c"),
            other => self.pretty.write_char_escape(writer, other),
        }
    }
}

fn to_hcl_json(value: &Value) -> GenerateResult<String> {
    let mut buf = Vec::new();
    let formatter = HclJsonFormatter {
        pretty: PrettyFormatter::new(),
    };
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| GenerateError::Serialization(e.to_string()))
}

/// Double `${` and `%{` so HCL reads them literally
fn escape_template_sequences(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if (c == '$' || c == '%') && chars.peek() == Some(&'{') {
            out.push(c);
        }
        out.push(c);
    }

    out
}

/// JSON strings embedded in HCL are still templates, escape them recursively
fn escape_json_templates(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_template_sequences(s)),
        Value::Array(items) => Value::Array(items.iter().map(escape_json_templates).collect()),
        Value::Object(map) => {
            let mut escaped = Map::new();
            for (key, item) in map {
                escaped.insert(escape_template_sequences(key), escape_json_templates(item));
            }
            Value::Object(escaped)
        }
        other => other.clone(),
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
