//! Ordered line groups making up a design file.
//!
//! A design is assembled as a list of [`Section`]s in a fixed order and joined
//! exactly once, in [`RenderedDocument::new`]. Every value goes through one of
//! the typed setters below, so the text encoding of flags, numbers and strings
//! is uniform across the whole file.

use std::fmt;
use std::path::{Path, PathBuf};

/// The groups of a design file, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Global,
    Preprocessing,
    Registration,
    Statistics,
    Confounds,
    Inputs,
    ExplanatoryVariables,
    Contrasts,
    RunControl,
}

impl SectionKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Global => "global analysis settings",
            Self::Preprocessing => "preprocessing",
            Self::Registration => "registration",
            Self::Statistics => "statistics",
            Self::Confounds => "confounds",
            Self::Inputs => "inputs",
            Self::ExplanatoryVariables => "explanatory variables",
            Self::Contrasts => "contrasts",
            Self::RunControl => "run control",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Flags are always `1` or `0`.
pub fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Real-valued settings always carry a decimal point (`2.0`, `0.05`).
pub fn real(value: f64) -> String {
    format!("{:?}", value)
}

/// Design-matrix entries: whole numbers without a decimal point.
pub fn weight(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:?}", value)
    }
}

/// Double-quote a Tcl string, escaping the characters Tcl substitutes.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// One group of `set` statements and the comments introducing them.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    kind: SectionKind,
    lines: Vec<String>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `# text`, preceded by a blank line unless it opens the section.
    pub fn comment(&mut self, text: impl fmt::Display) -> &mut Self {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(format!("# {}", text));
        self
    }

    /// `set <key> <value>` with the value written verbatim.
    pub fn set(&mut self, key: impl fmt::Display, value: impl fmt::Display) -> &mut Self {
        self.lines.push(format!("set {} {}", key, value));
        self
    }

    pub fn set_flag(&mut self, key: impl fmt::Display, value: bool) -> &mut Self {
        self.set(key, flag(value))
    }

    pub fn set_real(&mut self, key: impl fmt::Display, value: f64) -> &mut Self {
        self.set(key, real(value))
    }

    pub fn set_weight(&mut self, key: impl fmt::Display, value: f64) -> &mut Self {
        self.set(key, weight(value))
    }

    pub fn set_quoted(&mut self, key: impl fmt::Display, value: impl fmt::Display) -> &mut Self {
        self.set(key, quote(&value.to_string()))
    }

    pub fn set_path(&mut self, key: impl fmt::Display, path: &Path) -> &mut Self {
        self.set(key, quote(&path.to_string_lossy()))
    }
}

/// A complete design: its target path and text body.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    path: PathBuf,
    sections: Vec<Section>,
    body: String,
}

impl RenderedDocument {
    /// Join `sections` into the final body; empty sections are skipped.
    pub fn new(path: impl Into<PathBuf>, sections: Vec<Section>) -> Self {
        let body = sections
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
            + "\n";
        Self {
            path: path.into(),
            sections,
            body,
        }
    }

    /// Where [`RenderedDocument::write`] puts the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Value of the first `set <key>` statement, as written.
    pub fn value(&self, key: &str) -> Option<&str> {
        let prefix = format!("set {} ", key);
        self.body
            .lines()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
