// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File path to table name

/// Derive the table name for a file path.
///
/// With `keep_extension` the path is used as-is. Otherwise the final
/// extension, from the last `.` of the last path segment onward, is dropped:
/// `a/b/data.csv` becomes `a/b/data`, while `v1.2/data` is left untouched.
pub fn resolve(path: &str, keep_extension: bool) -> String {
    if keep_extension {
        return path.to_string();
    }
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].rfind('.') {
        Some(dot) => path[..segment_start + dot].to_string(),
        None => path.to_string(),
    }
}

/// Quote an identifier for SQL, doubling any embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
