// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Query templates
//!
//! A query may name files inline as `{{ path }}`. The query is split once into
//! segments: literal text, placeholders, and bare references (a loaded file's
//! path written directly in the text). Each segment is resolved on its own
//! when the query is rendered, so one file's path or table name never gets
//! rewritten inside another's.
//!
//! ```text
//! SELECT * FROM {{ people.csv }} p JOIN "orders.csv" o ON ...
//! └─ Text ────┘ └─ Placeholder ┘└ T ┘└ Reference ┘└ Text ...
//! ```

use crate::table_name::quote_ident;
use crate::{Error, FileSet, Result};
use diagnostics::*;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `{{ path }}` where the path is ASCII word characters and dots
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(\s*(?-u:[\w.])+\s*)\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// A `{{ path }}` placeholder, path trimmed
    Placeholder(String),
    /// A literal occurrence of a known file path
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    segments: Vec<Segment>,
}

impl QueryTemplate {
    /// Split `query` into text and placeholder segments.
    pub fn parse(query: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(query) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(query[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(inner.as_str().trim().to_string()));
            last = whole.end();
        }
        if last < query.len() {
            segments.push(Segment::Text(query[last..].to_string()));
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder paths in query order, repeats included
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(path) => Some(path.as_str()),
            _ => None,
        })
    }

    /// Split text segments on bare occurrences of `files`.
    ///
    /// An occurrence counts only when it is not part of a longer path-like
    /// token. Where several paths start at the same position the longest wins.
    pub fn bind_references(&mut self, files: &FileSet) {
        let mut paths: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();
        if paths.is_empty() {
            return;
        }
        paths.sort_by_key(|p| std::cmp::Reverse(p.len()));

        let segments = std::mem::take(&mut self.segments);
        for segment in segments {
            match segment {
                Segment::Text(text) => self.segments.extend(split_references(&text, &paths)),
                other => self.segments.push(other),
            }
        }
    }

    /// The query with each placeholder replaced by its quoted path.
    pub fn render_paths(&self) -> String {
        self.render_with(|path| quote_ident(path), |path| path.to_string())
    }

    /// The query with placeholders and references replaced by table names.
    ///
    /// Placeholders become quoted identifiers; references are replaced in
    /// place, keeping whatever quoting the query already had around them.
    pub fn render(&self, names: &HashMap<String, String>) -> String {
        let name_of = |path: &str| names.get(path).cloned().unwrap_or_else(|| path.to_string());
        self.render_with(|path| quote_ident(&name_of(path)), &name_of)
    }

    fn render_with<P, R>(&self, placeholder: P, reference: R) -> String
    where
        P: Fn(&str) -> String,
        R: Fn(&str) -> String,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(path) => out.push_str(&placeholder(path)),
                Segment::Reference(path) => out.push_str(&reference(path)),
            }
        }
        out
    }
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

/// `paths` must be sorted longest first.
fn split_references(text: &str, paths: &[&str]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut pending = 0;
    let mut pos = 0;

    while pos < text.len() {
        let before_ok = text[..pos].chars().next_back().is_none_or(|c| !is_path_char(c));
        let found = if before_ok {
            paths.iter().find(|path| {
                text[pos..].starts_with(**path)
                    && text[pos + path.len()..]
                        .chars()
                        .next()
                        .is_none_or(|c| !is_path_char(c))
            })
        } else {
            None
        };

        match found {
            Some(path) => {
                if pending < pos {
                    out.push(Segment::Text(text[pending..pos].to_string()));
                }
                out.push(Segment::Reference(path.to_string()));
                pos += path.len();
                pending = pos;
            }
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    if pending < text.len() {
        out.push(Segment::Text(text[pending..].to_string()));
    }
    out
}

/// Fail with [`Error::MissingFile`] unless `path` exists.
pub fn check_exists(path: &str) -> Result<()> {
    std::fs::metadata(path)
        .map(|_| ())
        .map_err(|e| Error::missing_file(path, e))
}

/// Parse `query`, check every referenced file exists and collect the file
/// set: placeholders in query order, then `extra_files` in argument order.
pub fn discover(query: &str, extra_files: &[String]) -> Result<(QueryTemplate, FileSet)> {
    let mut template = QueryTemplate::parse(query);
    let mut files = FileSet::new();

    for path in template.placeholders() {
        check_exists(path)?;
        if files.insert(path) {
            debug!("Found placeholder file {path}", path: path);
        }
    }

    for path in extra_files {
        let path = path.trim();
        check_exists(path)?;
        if files.insert(path) {
            debug!("Found extra file {path}", path: path);
        }
    }

    template.bind_references(&files);
    Ok((template, files))
}
