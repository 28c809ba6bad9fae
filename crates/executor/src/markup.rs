//! Markup interchange for [`ResultTable`].
//!
//! ```text
//! <ResultTable>
//!   <Schema>
//!     <Column name="ID" type="Int64" host="I64"/>
//!     <Column name="NAME" type="AnsiString" host="String"/>
//!   </Schema>
//!   <Row ID="1" NAME="Alice"/>
//!   <Row ID="2"/>
//! </ResultTable>
//! ```
//!
//! Each row carries one attribute per non-null cell, so an absent
//! attribute reads back as `Value::Null`. Column names that are not valid
//! attribute names are escaped character by character as `_xHHHH_`.
//!
//! Cell text follows the column's host type: bytes are base64, date/times
//! are ISO 8601 (RFC 3339 with an offset), decimals and floats use their
//! shortest round-tripping text. Columns without a fixed host type (and
//! `Object` columns) store the cell as JSON.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use sqlbridge_core::{HostType, SemanticType, Value};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::table::{Column, ResultTable};
use crate::{Error, Result};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl ResultTable {
    /// Write the table as markup.
    ///
    /// Fails with `InvalidInput` when a cell does not hold its column's
    /// host type.
    pub fn to_markup(&self) -> Result<String> {
        let mut out = String::from("<ResultTable>\n  <Schema>\n");
        for col in self.columns() {
            let _ = write!(
                out,
                "    <Column name=\"{}\" type=\"{}\"",
                escape(&col.name),
                col.semantic_type
            );
            if let Some(host) = col.host_type {
                let _ = write!(out, " host=\"{}\"", host);
            }
            out.push_str("/>\n");
        }
        out.push_str("  </Schema>\n");

        let names = attribute_names(self.columns());
        for row in self.rows() {
            out.push_str("  <Row");
            for ((cell, col), name) in row.iter().zip(self.columns()).zip(&names) {
                if cell.is_null() {
                    continue;
                }
                let text = cell_text(col, cell)?;
                let _ = write!(out, " {}=\"{}\"", name, escape(&text));
            }
            out.push_str("/>\n");
        }
        out.push_str("</ResultTable>\n");
        Ok(out)
    }

    /// Read a table written by [`to_markup`](Self::to_markup).
    pub fn from_markup(markup: &str) -> Result<ResultTable> {
        let mut reader = Reader::new(markup);

        reader.expect_open("ResultTable")?;
        let mut columns = Vec::new();
        let mut tag = reader.next_tag()?;

        if matches!(&tag, Some(t) if t.name == "Schema" && t.kind == TagKind::Open) {
            loop {
                let t = reader.require_tag()?;
                match (t.name.as_str(), t.kind) {
                    ("Column", TagKind::Empty) => columns.push(parse_column(&t)?),
                    ("Schema", TagKind::Close) => break,
                    _ => return Err(malformed(format!("unexpected <{}> in schema", t.name))),
                }
            }
            tag = reader.next_tag()?;
        } else if matches!(&tag, Some(t) if t.name == "Schema" && t.kind == TagKind::Empty) {
            tag = reader.next_tag()?;
        }

        let names = attribute_names(&columns);
        let mut table = ResultTable::new(columns);

        loop {
            let t = tag.ok_or_else(|| malformed("missing </ResultTable>"))?;
            match (t.name.as_str(), t.kind) {
                ("Row", TagKind::Empty) => {
                    let mut row = vec![Value::Null; names.len()];
                    let mut seen = vec![false; names.len()];
                    for (attr, text) in &t.attrs {
                        let index = names
                            .iter()
                            .position(|n| n == attr)
                            .ok_or_else(|| malformed(format!("row attribute '{}' names no column", attr)))?;
                        if std::mem::replace(&mut seen[index], true) {
                            return Err(malformed(format!("row attribute '{}' repeated", attr)));
                        }
                        row[index] = parse_cell(&table.columns()[index], text)?;
                    }
                    table.push_row(row)?;
                }
                ("ResultTable", TagKind::Close) => break,
                _ => return Err(malformed(format!("unexpected <{}> in table", t.name))),
            }
            tag = reader.next_tag()?;
        }

        if reader.next_tag()?.is_some() {
            return Err(malformed("content after </ResultTable>"));
        }
        Ok(table)
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::invalid_input(format!("malformed result table markup: {}", reason.into()))
}

fn parse_column(tag: &Tag) -> Result<Column> {
    let name = tag
        .attr("name")
        .ok_or_else(|| malformed("column without a name"))?
        .to_string();
    let semantic_type = tag
        .attr("type")
        .ok_or_else(|| malformed(format!("column '{}' without a type", name)))?
        .parse::<SemanticType>()
        .map_err(malformed)?;
    let host_type = tag
        .attr("host")
        .map(|h| h.parse::<HostType>().map_err(malformed))
        .transpose()?;
    Ok(Column::new(name, semantic_type, host_type))
}

// =============================================================================
// Cell text
// =============================================================================

fn json_column(col: &Column) -> bool {
    matches!(col.host_type, None | Some(HostType::Object))
}

fn cell_text(col: &Column, cell: &Value) -> Result<String> {
    if json_column(col) {
        return serde_json::to_string(cell)
            .map_err(|e| Error::invalid_input(format!("cannot serialize cell: {}", e)));
    }
    let mismatch = || {
        Error::invalid_input(format!(
            "column '{}' holds {} values, found {}",
            col.name,
            col.host_type.map(|h| h.name()).unwrap_or("Object"),
            cell.type_name()
        ))
    };
    if cell.host_type() != col.host_type {
        return Err(mismatch());
    }
    Ok(match cell {
        Value::Bool(b) => b.to_string(),
        Value::U8(v) => v.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => BASE64.encode(b),
        Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        Value::DateTimeOffset(dto) => dto.to_rfc3339(),
        Value::Null | Value::Array(_) => return Err(mismatch()),
    })
}

fn parse_cell(col: &Column, text: &str) -> Result<Value> {
    let bad = |e: String| malformed(format!("column '{}': {}", col.name, e));
    let host = match col.host_type {
        Some(h) => h,
        None => return serde_json::from_str(text).map_err(|e| bad(e.to_string())),
    };
    Ok(match host {
        HostType::String => Value::String(text.to_string()),
        HostType::Bytes => Value::Bytes(BASE64.decode(text).map_err(|e| bad(e.to_string()))?),
        HostType::Bool => Value::Bool(text.parse().map_err(|_| bad(format!("'{}' is not a bool", text)))?),
        HostType::U8 => Value::U8(parse_num(text, &bad)?),
        HostType::I8 => Value::I8(parse_num(text, &bad)?),
        HostType::I16 => Value::I16(parse_num(text, &bad)?),
        HostType::I32 => Value::I32(parse_num(text, &bad)?),
        HostType::I64 => Value::I64(parse_num(text, &bad)?),
        HostType::U16 => Value::U16(parse_num(text, &bad)?),
        HostType::U32 => Value::U32(parse_num(text, &bad)?),
        HostType::U64 => Value::U64(parse_num(text, &bad)?),
        HostType::F32 => Value::F32(parse_num(text, &bad)?),
        HostType::F64 => Value::F64(parse_num(text, &bad)?),
        HostType::Decimal => Value::Decimal(Decimal::from_str(text).map_err(|e| bad(e.to_string()))?),
        HostType::DateTime => Value::DateTime(
            NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|e| bad(e.to_string()))?,
        ),
        HostType::DateTimeOffset => Value::DateTimeOffset(
            DateTime::parse_from_rfc3339(text).map_err(|e| bad(e.to_string()))?,
        ),
        HostType::Object => serde_json::from_str(text).map_err(|e| bad(e.to_string()))?,
    })
}

fn parse_num<T: FromStr>(text: &str, bad: &dyn Fn(String) -> Error) -> Result<T> {
    text.parse::<T>()
        .map_err(|_| bad(format!("'{}' is not a valid number", text)))
}

// =============================================================================
// Names and escaping
// =============================================================================

/// Column name as an attribute name; invalid characters become `_xHHHH_`.
fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, (pos, ch)) in name.char_indices().enumerate() {
        let valid = if i == 0 {
            ch.is_ascii_alphabetic() || ch == '_'
        } else {
            ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
        };
        // A literal "_x" would look like an escape
        let looks_escaped = ch == '_' && name[pos..].starts_with("_x");
        if valid && !looks_escaped {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                let _ = write!(out, "_x{:04X}_", unit);
            }
        }
    }
    if out.is_empty() {
        out.push_str("_x0000_");
    }
    out
}

/// One distinct attribute name per column.
///
/// A name already taken by an earlier column gets an escaped `#<ordinal>`
/// suffix, so joins with repeated column names keep every cell.
fn attribute_names(columns: &[Column]) -> Vec<String> {
    let mut used = HashSet::with_capacity(columns.len());
    columns
        .iter()
        .map(|col| {
            let base = encode_name(&col.name);
            let mut name = base.clone();
            let mut ordinal = 1;
            while !used.insert(name.clone()) {
                ordinal += 1;
                name = format!("{}_x0023_{}", base, ordinal);
            }
            name
        })
        .collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let semi = rest[amp..]
            .find(';')
            .ok_or_else(|| malformed("unterminated entity"))?;
        let entity = &rest[amp + 1..amp + semi];
        let ch = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| malformed(format!("unknown entity '&{};'", entity)))?
            }
        };
        out.push(ch);
        rest = &rest[amp + semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// =============================================================================
// Reader
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Open,
    Close,
    Empty,
}

#[derive(Debug)]
struct Tag {
    name: String,
    kind: TagKind,
    attrs: Vec<(String, String)>,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Tag-level reader for the restricted form `to_markup` writes.
struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn expect_open(&mut self, name: &str) -> Result<()> {
        match self.next_tag()? {
            Some(t) if t.name == name && t.kind == TagKind::Open => Ok(()),
            Some(t) => Err(malformed(format!("expected <{}>, found <{}>", name, t.name))),
            None => Err(malformed(format!("expected <{}>", name))),
        }
    }

    fn require_tag(&mut self) -> Result<Tag> {
        self.next_tag()?
            .ok_or_else(|| malformed("unexpected end of input"))
    }

    fn next_tag(&mut self) -> Result<Option<Tag>> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Ok(None);
            }
            if !rest.starts_with('<') {
                return Err(malformed("text content is not allowed"));
            }
            // Declarations and comments carry nothing
            if rest.starts_with("<?") || rest.starts_with("<!--") {
                let end = if rest.starts_with("<?") { "?>" } else { "-->" };
                let close = rest.find(end).ok_or_else(|| malformed("unterminated declaration"))?;
                self.pos += close + end.len();
                continue;
            }
            return self.read_tag().map(Some);
        }
    }

    fn read_tag(&mut self) -> Result<Tag> {
        self.pos += 1;
        let closing = self.rest().starts_with('/');
        if closing {
            self.pos += 1;
        }
        let name = self.read_name()?;
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                if closing {
                    return Err(malformed(format!("malformed closing tag </{}/>", name)));
                }
                return Ok(Tag { name, kind: TagKind::Empty, attrs });
            }
            if rest.starts_with('>') {
                self.pos += 1;
                let kind = if closing { TagKind::Close } else { TagKind::Open };
                return Ok(Tag { name, kind, attrs });
            }
            if closing {
                return Err(malformed(format!("attributes on closing tag </{}>", name)));
            }

            let key = self.read_name()?;
            self.skip_whitespace();
            if !self.rest().starts_with('=') {
                return Err(malformed(format!("attribute '{}' has no value", key)));
            }
            self.pos += 1;
            self.skip_whitespace();
            let quote = self
                .rest()
                .chars()
                .next()
                .filter(|c| *c == '"' || *c == '\'')
                .ok_or_else(|| malformed(format!("attribute '{}' is not quoted", key)))?;
            self.pos += 1;
            let len = self
                .rest()
                .find(quote)
                .ok_or_else(|| malformed(format!("attribute '{}' is unterminated", key)))?;
            let raw = &self.rest()[..len];
            self.pos += len + 1;
            attrs.push((key, unescape(raw)?));
        }
    }

    fn read_name(&mut self) -> Result<String> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/' | '<' | '"' | '\''))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(malformed("expected a name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }
}
