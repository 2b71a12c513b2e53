//! The ordered command script and the names it has defined so far.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use tracing::trace;

use crate::error::ErrorKind;

/// What a declared name refers to on the Blender side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Material,
    ShaderNode,
    Object,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Material => "material",
            SymbolKind::ShaderNode => "shader node",
            SymbolKind::Object => "object",
        })
    }
}

/// Append-only list of script lines.
///
/// Later commands refer to things earlier commands created: a link needs both
/// of its nodes, a material append needs the material. Emitters declare a
/// symbol when they emit the command that creates it and resolve it when they
/// emit a reference, so a dangling reference fails here instead of inside
/// Blender.
#[derive(Debug, Default)]
pub struct CommandStream {
    lines: Vec<String>,
    symbols: HashMap<(SymbolKind, String), String>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        trace!("{line}");
        self.lines.push(line);
    }

    /// Record that `name` now exists and is reachable in the script as `expr`.
    /// Returns `expr` for convenience.
    pub fn declare(&mut self, kind: SymbolKind, name: &str, expr: impl Into<String>) -> String {
        let expr = expr.into();
        self.symbols
            .insert((kind, name.to_string()), expr.clone());
        expr
    }

    pub fn is_declared(&self, kind: SymbolKind, name: &str) -> bool {
        self.symbols.contains_key(&(kind, name.to_string()))
    }

    /// Script expression for a previously declared `name`.
    pub fn resolve(&self, kind: SymbolKind, name: &str) -> Result<&str, ErrorKind> {
        self.symbols
            .get(&(kind, name.to_string()))
            .map(String::as_str)
            .ok_or_else(|| ErrorKind::UnresolvedSymbol {
                kind,
                name: name.to_string(),
            })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }
}

/// Python string literal for a name. Backslashes and quotes are escaped.
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Python string literal for a path whose separators are already escaped.
pub fn quote_path(escaped: &str) -> String {
    format!("\"{}\"", escaped.replace('"', "\\\""))
}
