//! Static evaluation of expressions.
//!
//! Only what import paths need: literal text, properties, concatenation,
//! and a small set of property functions. Anything else (item or
//! metadata references, unknown functions, syntax errors) makes the
//! whole expression unevaluable.

use std::path::{Component, Path, PathBuf};

use smol_str::SmolStr;

use crate::base::eq_ignore_case;
use crate::parser::{ExprKind, ExpressionTree, NodeId};

/// Evaluate `tree`, looking properties up with `lookup`. Undefined
/// properties evaluate to the empty string.
pub fn evaluate<F>(tree: &ExpressionTree, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<SmolStr>,
{
    evaluate_node(tree, tree.root(), lookup)
}

/// Evaluate the subtree rooted at `id`.
pub fn evaluate_node<F>(tree: &ExpressionTree, id: NodeId, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<SmolStr>,
{
    Evaluator { tree, lookup: &lookup }.node(id)
}

struct Evaluator<'a, F> {
    tree: &'a ExpressionTree,
    lookup: &'a F,
}

impl<F> Evaluator<'_, F>
where
    F: Fn(&str) -> Option<SmolStr>,
{
    fn node(&self, id: NodeId) -> Option<String> {
        match self.tree.kind(id) {
            ExprKind::Text { value, .. } => Some(unescape(value)),
            ExprKind::Concat { parts } => parts.iter().map(|&part| self.node(part)).collect(),
            ExprKind::List { entries } => {
                let entries: Option<Vec<String>> = entries.iter().map(|&e| self.node(e)).collect();
                Some(entries?.join(";"))
            }
            ExprKind::Property { body } => self.property(*body),
            ExprKind::QuotedString { expression, .. } => self.node(*expression),
            ExprKind::ArgumentBool(value) => Some(if *value { "True" } else { "False" }.to_string()),
            ExprKind::ArgumentInt(value) => Some(value.to_string()),
            ExprKind::ArgumentFloat(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn property(&self, id: NodeId) -> Option<String> {
        match self.tree.kind(id) {
            ExprKind::PropertyName { name } if !name.is_empty() => {
                Some((self.lookup)(name).map(String::from).unwrap_or_default())
            }
            ExprKind::PropertyFunction {
                target,
                method,
                arguments,
                is_indexer,
            } => {
                let args = match arguments {
                    Some(list) => self.arguments(*list)?,
                    None => Vec::new(),
                };
                if *is_indexer {
                    let value = self.property(*target)?;
                    let index: usize = args.first()?.trim().parse().ok()?;
                    return value.chars().nth(index).map(String::from);
                }
                let method = match self.tree.kind((*method)?) {
                    ExprKind::FunctionName { name } => name,
                    _ => return None,
                };
                match self.tree.kind(*target) {
                    ExprKind::ClassReference { name } => static_function(name, method, &args),
                    _ => {
                        let value = self.property(*target)?;
                        string_method(&value, method, &args)
                    }
                }
            }
            _ => None,
        }
    }

    fn arguments(&self, id: NodeId) -> Option<Vec<String>> {
        match self.tree.kind(id) {
            ExprKind::ArgumentList { arguments } => arguments.iter().map(|&a| self.node(a)).collect(),
            _ => None,
        }
    }
}

// ============================================================================
// FUNCTIONS
// ============================================================================

fn static_function(class: &str, method: &str, args: &[String]) -> Option<String> {
    let class = class.strip_prefix("System.").unwrap_or(class);
    let is = |c: &str, m: &str| eq_ignore_case(class, c) && eq_ignore_case(method, m);

    if is("IO.Path", "Combine") {
        let (first, rest) = args.split_first()?;
        return Some(rest.iter().fold(first.clone(), |acc, part| combine(&acc, part)));
    }
    if is("IO.Path", "GetDirectoryName") {
        let path = Path::new(args.first()?);
        return Some(path.parent().map(|p| p.display().to_string()).unwrap_or_default());
    }
    if is("IO.Path", "GetFileName") {
        return Some(file_part(args.first()?, Path::file_name));
    }
    if is("IO.Path", "GetFileNameWithoutExtension") {
        return Some(file_part(args.first()?, Path::file_stem));
    }
    if is("MSBuild", "EnsureTrailingSlash") {
        return Some(ensure_trailing_slash(args.first()?));
    }
    if is("MSBuild", "NormalizePath") {
        let joined = args.iter().fold(String::new(), |acc, part| combine(&acc, part));
        return Some(normalize(Path::new(&joined)).display().to_string());
    }
    if is("MSBuild", "NormalizeDirectory") {
        let joined = args.iter().fold(String::new(), |acc, part| combine(&acc, part));
        return Some(ensure_trailing_slash(&normalize(Path::new(&joined)).display().to_string()));
    }
    if is("MSBuild", "ValueOrDefault") {
        let value = args.first()?;
        return Some(if value.is_empty() {
            args.get(1).cloned().unwrap_or_default()
        } else {
            value.clone()
        });
    }
    if is("MSBuild", "GetDirectoryNameOfFileAbove") {
        let (start, file) = (args.first()?, args.get(1)?);
        return Some(
            file_above(Path::new(start), file)
                .and_then(|found| found.parent().map(|dir| dir.display().to_string()))
                .unwrap_or_default(),
        );
    }
    if is("MSBuild", "GetPathOfFileAbove") {
        let file = args.first()?;
        let start = args.get(1)?;
        return Some(
            file_above(Path::new(start), file)
                .map(|found| found.display().to_string())
                .unwrap_or_default(),
        );
    }
    None
}

fn string_method(value: &str, method: &str, args: &[String]) -> Option<String> {
    let lower = method.to_ascii_lowercase();
    let result = match lower.as_str() {
        "tolower" | "tolowerinvariant" => value.to_lowercase(),
        "toupper" | "toupperinvariant" => value.to_uppercase(),
        "trim" | "trimstart" | "trimend" => {
            let set: Vec<char> = args.first().map(|a| a.chars().collect()).unwrap_or_default();
            let matches = |c: char| if set.is_empty() { c.is_whitespace() } else { set.contains(&c) };
            let trimmed = match lower.as_str() {
                "trim" => value.trim_matches(matches),
                "trimstart" => value.trim_start_matches(matches),
                _ => value.trim_end_matches(matches),
            };
            trimmed.to_string()
        }
        "replace" => value.replace(args.first()?.as_str(), args.get(1)?),
        "substring" => {
            let start: usize = args.first()?.trim().parse().ok()?;
            let rest = value.chars().skip(start);
            match args.get(1) {
                Some(len) => rest.take(len.trim().parse().ok()?).collect(),
                None => rest.collect(),
            }
        }
        "length" => value.chars().count().to_string(),
        "startswith" => bool_string(value.starts_with(args.first()?.as_str())),
        "endswith" => bool_string(value.ends_with(args.first()?.as_str())),
        "contains" => bool_string(value.contains(args.first()?.as_str())),
        _ => return None,
    };
    Some(result)
}

fn bool_string(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

fn file_part(path: &str, part: fn(&Path) -> Option<&std::ffi::OsStr>) -> String {
    part(Path::new(&to_native(path)))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_above(start: &Path, file: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// PATHS
// ============================================================================

pub(crate) fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn ensure_trailing_slash(path: &str) -> String {
    if path.is_empty() || path.ends_with(is_separator) {
        path.to_string()
    } else {
        format!("{path}{}", std::path::MAIN_SEPARATOR)
    }
}

fn combine(base: &str, part: &str) -> String {
    if base.is_empty() || Path::new(&to_native(part)).has_root() {
        return part.to_string();
    }
    if part.is_empty() {
        return base.to_string();
    }
    format!("{}{}", ensure_trailing_slash(base), part)
}

/// Rewrite `\` and `/` to the platform separator.
pub(crate) fn to_native(path: &str) -> String {
    path.chars()
        .map(|c| if is_separator(c) { std::path::MAIN_SEPARATOR } else { c })
        .collect()
}

/// Remove `.` and `..` components without touching the file system.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Replace XML character entities with the characters they stand for.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// RESERVED FILE PROPERTIES
// ============================================================================

/// `MSBuildThisFile*` for `file`, or `MSBuildProject*` when `name` uses
/// the `MSBuildProject` prefix and `file` is the project.
pub fn file_property(name: &str, file: &Path) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    let (this_file, suffix) = match lower.strip_prefix("msbuildthisfile") {
        Some(suffix) => (true, suffix),
        None => (false, lower.strip_prefix("msbuildproject")?),
    };
    let directory = file.parent().map(Path::to_path_buf).unwrap_or_default();
    let value = match (this_file, suffix) {
        (true, "") | (false, "file") => file.file_name()?.to_string_lossy().into_owned(),
        (_, "name") => file.file_stem()?.to_string_lossy().into_owned(),
        (_, "extension") => file
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
        (_, "fullpath") => file.display().to_string(),
        // Only MSBuildThisFileDirectory carries a trailing slash.
        (true, "directory") => ensure_trailing_slash(&directory.display().to_string()),
        (false, "directory") => directory.display().to_string(),
        (_, "directorynoroot") => {
            let relative: PathBuf = directory
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            ensure_trailing_slash(&relative.display().to_string())
        }
        _ => return None,
    };
    Some(value)
}

// ============================================================================
// PERMUTATIONS
// ============================================================================

/// Every combination of one value per property, capped at `cap`
/// combinations. Properties without values are left out. Always returns
/// at least the empty combination.
pub fn permutations(dimensions: &[(SmolStr, Vec<SmolStr>)], cap: usize) -> Vec<Vec<(SmolStr, SmolStr)>> {
    let mut combinations: Vec<Vec<(SmolStr, SmolStr)>> = vec![Vec::new()];
    for (name, values) in dimensions.iter().filter(|(_, values)| !values.is_empty()) {
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        'outer: for combination in &combinations {
            for value in values {
                if next.len() >= cap.max(1) {
                    break 'outer;
                }
                let mut extended = combination.clone();
                extended.push((name.clone(), value.clone()));
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}

#[cfg(test)]
mod tests;
