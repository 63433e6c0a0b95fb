//! Filesystem path completion for path-valued fields

use glob::{MatchOptions, Pattern};
use log::debug;

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// Extend `input` to the longest unambiguous path it could name.
///
/// A unique directory match gets a trailing separator. Returns `None` when
/// nothing on disk matches.
#[must_use]
pub fn complete(input: &str, dirs_only: bool) -> Option<String> {
    let split = input.rfind(is_separator).map_or(0, |i| i + 1);
    let (dir_part, _) = input.split_at(split);

    let pattern = format!("{}*", Pattern::escape(input));
    let matches: Vec<(String, bool)> = glob::glob_with(&pattern, OPTIONS)
        .ok()?
        .filter_map(Result::ok)
        .filter_map(|path| {
            let is_dir = path.is_dir();
            if dirs_only && !is_dir {
                return None;
            }
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some((name, is_dir))
        })
        .collect();
    debug!("Completing '{input}': {} candidate(s)", matches.len());

    let (first, first_is_dir) = matches.first()?;
    if matches.len() == 1 {
        let trailer = if *first_is_dir { "/" } else { "" };
        return Some(format!("{dir_part}{first}{trailer}"));
    }
    let common = matches
        .iter()
        .skip(1)
        .fold(first.as_str(), |acc, (name, _)| common_prefix(acc, name));
    Some(format!("{dir_part}{common}"))
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i);
    &a[..end]
}
