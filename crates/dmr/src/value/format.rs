//! DMR text and JSON rendering.

use std::fmt;

use base64::Engine;

use super::{ModelValue, BYTES_VALUE, EXPRESSION_VALUE, PROPERTY_VALUE, TYPE_MODEL_VALUE};
use crate::node::ModelNode;

/// Options controlling text and JSON rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Break lists and objects with more than one element over several lines.
    /// For JSON this is the "pretty" switch; without it the output is compact.
    pub multi_line: bool,
    /// Indentation unit per nesting level.
    pub indent: &'static str,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            multi_line: true,
            indent: "    ",
        }
    }
}

impl FormatOptions {
    pub fn single_line() -> Self {
        Self {
            multi_line: false,
            ..Self::default()
        }
    }

    pub fn multi_line() -> Self {
        Self::default()
    }
}

/// Renders a double the way `java.lang.Double.toString` does: `1.0`,
/// `0.001`, `1.0E7`, `1.5E-7`, `NaN`, `-Infinity`.
pub fn java_double_string(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_owned();
    }
    if d.is_infinite() {
        return if d > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if d == 0.0 {
        return if d.is_sign_negative() { "-0.0" } else { "0.0" }.to_owned();
    }
    if (1e-3..1e7).contains(&d.abs()) {
        let mut s = d.to_string();
        if !s.contains('.') {
            s.push_str(".0");
        }
        return s;
    }
    let s = format!("{d:e}");
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str(mantissa);
    if !mantissa.contains('.') {
        out.push_str(".0");
    }
    out.push('E');
    out.push_str(exponent);
    out
}

/// DMR quoting: only `"` and `\` are escaped.
fn push_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

fn push_json_str(out: &mut String, s: &str) {
    out.push_str(&serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_owned()));
}

fn push_indent(out: &mut String, options: &FormatOptions, depth: usize) {
    for _ in 0..depth {
        out.push_str(options.indent);
    }
}

/// Writes `open`, the items, and `close`, going multi-line when requested and
/// there is more than one item.
fn write_seq<I, F>(
    out: &mut String,
    options: &FormatOptions,
    depth: usize,
    (open, close): (char, char),
    items: I,
    mut write_item: F,
) where
    I: ExactSizeIterator,
    F: FnMut(&mut String, I::Item, usize),
{
    let multi_line = options.multi_line && items.len() > 1;
    let child_depth = if multi_line { depth + 1 } else { depth };
    out.push(open);
    if multi_line {
        out.push('\n');
        push_indent(out, options, depth + 1);
    }
    for (i, item) in items.enumerate() {
        if i > 0 {
            if multi_line {
                out.push_str(",\n");
                push_indent(out, options, depth + 1);
            } else {
                out.push(',');
            }
        }
        write_item(out, item, child_depth);
    }
    if multi_line {
        out.push('\n');
        push_indent(out, options, depth);
    }
    out.push(close);
}

impl ModelValue {
    /// Renders the value in DMR text form.
    pub fn format(&self, options: &FormatOptions) -> String {
        let mut out = String::new();
        self.write_dmr(&mut out, 0, options);
        out
    }

    pub(crate) fn write_dmr(&self, out: &mut String, depth: usize, options: &FormatOptions) {
        match self {
            ModelValue::Undefined => out.push_str("undefined"),
            ModelValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            ModelValue::Int(v) => out.push_str(&v.to_string()),
            ModelValue::Long(v) => out.push_str(&format!("{v}L")),
            ModelValue::Double(v) => out.push_str(&java_double_string(*v)),
            ModelValue::BigInteger(v) => out.push_str(&format!("big integer {v}")),
            ModelValue::BigDecimal(v) => out.push_str(&format!("big decimal {v}")),
            ModelValue::Bytes(bytes) => write_bytes(out, bytes, depth, options),
            ModelValue::String(s) => push_quoted(out, s),
            ModelValue::Expression(s) => {
                out.push_str("expression ");
                push_quoted(out, s);
            }
            ModelValue::Type(t) => out.push_str(t.name()),
            ModelValue::List(list) => write_seq(
                out,
                options,
                depth,
                ('[', ']'),
                list.iter(),
                |out, node: &ModelNode, d| node.value().write_dmr(out, d, options),
            ),
            ModelValue::Object(map) => write_seq(
                out,
                options,
                depth,
                ('{', '}'),
                map.iter(),
                |out, (key, node): (&String, &ModelNode), d| {
                    push_quoted(out, key);
                    out.push_str(" => ");
                    node.value().write_dmr(out, d, options);
                },
            ),
            ModelValue::Property(p) => {
                out.push('(');
                push_quoted(out, p.name());
                out.push_str(" => ");
                p.value().value().write_dmr(out, depth, options);
                out.push(')');
            }
        }
    }

    /// Renders the value as JSON. Compact output carries no whitespace at
    /// all; pretty output breaks containers over several lines.
    pub fn to_json_string(&self, compact: bool) -> String {
        let options = if compact {
            FormatOptions::single_line()
        } else {
            FormatOptions::multi_line()
        };
        let mut out = String::new();
        self.write_json(&mut out, 0, &options);
        out
    }

    pub(crate) fn write_json(&self, out: &mut String, depth: usize, options: &FormatOptions) {
        let key_sep = if options.multi_line { " : " } else { ":" };
        match self {
            ModelValue::Undefined => out.push_str("null"),
            ModelValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            ModelValue::Int(v) => out.push_str(&v.to_string()),
            ModelValue::Long(v) => out.push_str(&v.to_string()),
            ModelValue::Double(v) if v.is_finite() => out.push_str(&java_double_string(*v)),
            ModelValue::Double(_) => out.push_str("null"),
            ModelValue::BigInteger(v) => out.push_str(&v.to_string()),
            ModelValue::BigDecimal(v) => out.push_str(&v.to_string()),
            ModelValue::String(s) => push_json_str(out, s),
            ModelValue::Bytes(bytes) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                write_wrapper(out, depth, options, BYTES_VALUE, |out, _| {
                    push_json_str(out, &encoded)
                });
            }
            ModelValue::Expression(s) => {
                write_wrapper(out, depth, options, EXPRESSION_VALUE, |out, _| {
                    push_json_str(out, s)
                });
            }
            ModelValue::Type(t) => {
                write_wrapper(out, depth, options, TYPE_MODEL_VALUE, |out, _| {
                    push_json_str(out, t.name())
                });
            }
            ModelValue::Property(p) => {
                write_wrapper(out, depth, options, PROPERTY_VALUE, |out, inner| {
                    write_wrapper(out, inner, options, p.name(), |out, d| {
                        p.value().value().write_json(out, d, options)
                    })
                });
            }
            ModelValue::List(list) => write_seq(
                out,
                options,
                depth,
                ('[', ']'),
                list.iter(),
                |out, node: &ModelNode, d| node.value().write_json(out, d, options),
            ),
            ModelValue::Object(map) => write_seq(
                out,
                options,
                depth,
                ('{', '}'),
                map.iter(),
                |out, (key, node): (&String, &ModelNode), d| {
                    push_json_str(out, key);
                    out.push_str(key_sep);
                    node.value().write_json(out, d, options);
                },
            ),
        }
    }
}

/// A single-key JSON object `{"key": payload}`. The payload writer receives
/// the depth its own children should be indented at.
fn write_wrapper<F>(out: &mut String, depth: usize, options: &FormatOptions, key: &str, payload: F)
where
    F: FnOnce(&mut String, usize),
{
    out.push('{');
    if options.multi_line {
        out.push('\n');
        push_indent(out, options, depth + 1);
    }
    push_json_str(out, key);
    out.push_str(if options.multi_line { " : " } else { ":" });
    payload(out, depth + 1);
    if options.multi_line {
        out.push('\n');
        push_indent(out, options, depth);
    }
    out.push('}');
}

fn write_bytes(out: &mut String, bytes: &[u8], depth: usize, options: &FormatOptions) {
    out.push_str("bytes {");
    if options.multi_line {
        out.push('\n');
        push_indent(out, options, depth + 1);
    } else {
        out.push(' ');
    }
    for (i, b) in bytes.iter().enumerate() {
        out.push_str(&format!("0x{b:02x}"));
        if i + 1 != bytes.len() {
            if options.multi_line && i % 8 == 7 {
                out.push_str(",\n");
                push_indent(out, options, depth + 1);
            } else {
                out.push_str(", ");
            }
        }
    }
    if options.multi_line {
        out.push('\n');
        push_indent(out, options, depth);
    } else {
        out.push(' ');
    }
    out.push('}');
}

/// Multi-line DMR text, the diagnostic form.
impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&FormatOptions::default()))
    }
}
