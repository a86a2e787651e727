//! Search/replace over the contents of the explorer tree.
//!
//! The query is compiled into one [`Regex`]; every leaf is scanned line by
//! line for non-overlapping matches.  Results are recomputed from scratch on
//! each query change; there is no index.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use super::tree::{FileTree, NodeId};

/// Toggles shown next to the search input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub use_regex: bool,
    /// Replacement follows the case of each hit: all caps, or a leading
    /// capital.
    pub preserve_case: bool,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// One match inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 1-based line number.
    pub line: usize,
    /// 0-based character offset of the match within the line.
    pub offset: usize,
    /// Match length in characters.
    pub length: usize,
    /// Full text of the line, for the results list.
    pub text: String,
}

/// All matches within one file.
#[derive(Debug, Clone)]
pub struct FileMatches {
    pub node: NodeId,
    pub path: String,
    pub matches: Vec<LineMatch>,
}

/// Outcome of a replace over one file.
#[derive(Debug, Clone)]
pub struct Replaced {
    pub path: String,
    /// Content before the replacement.
    pub previous: String,
    pub content: String,
    pub count: usize,
}

/// Compile `query` according to `options`.
///
/// Outside regex mode every metacharacter is escaped, so the query matches
/// literally.
pub fn compile(query: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let body = if options.use_regex {
        query.to_string()
    } else {
        regex::escape(query)
    };
    let pattern = if options.whole_word {
        format!(r"\b(?:{body})\b")
    } else {
        body
    };
    Ok(RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()?)
}

/// Compile, logging and swallowing an invalid pattern.
fn compile_or_log(query: &str, options: SearchOptions) -> Option<Regex> {
    if query.trim().is_empty() {
        return None;
    }
    match compile(query, options) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("{e}");
            None
        }
    }
}

/// Scan every leaf of `tree`.  An empty query or an invalid pattern yields
/// no results.
pub fn search_tree(tree: &FileTree, query: &str, options: SearchOptions) -> Vec<FileMatches> {
    let Some(re) = compile_or_log(query, options) else {
        return Vec::new();
    };
    let t0 = std::time::Instant::now();
    let results: Vec<FileMatches> = tree
        .leaves()
        .into_iter()
        .filter_map(|node| {
            let content = tree.get(node).content.as_deref()?;
            let matches = scan(&re, content);
            (!matches.is_empty()).then(|| FileMatches {
                node,
                path: tree.path_of(node),
                matches,
            })
        })
        .collect();
    tracing::debug!(
        "search {query:?}: {} files in {:.2?}",
        results.len(),
        t0.elapsed()
    );
    results
}

/// All non-empty, non-overlapping matches of `re` in `content`, per line.
pub fn scan(re: &Regex, content: &str) -> Vec<LineMatch> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        for m in re.find_iter(line) {
            if m.is_empty() {
                continue;
            }
            out.push(LineMatch {
                line: idx + 1,
                offset: line[..m.start()].chars().count(),
                length: m.as_str().chars().count(),
                text: line.to_string(),
            });
        }
    }
    out
}

/// Substitute every match in `content`, line by line like [`scan`], so a
/// replace touches exactly the hits search reports.  Line endings are kept.
/// In regex mode the replacement may reference capture groups (`$1`,
/// `${name}`); otherwise it is literal.
fn substitute(re: &Regex, content: &str, replacement: &str, options: SearchOptions) -> (String, usize) {
    let mut out = String::with_capacity(content.len());
    let mut count = 0;
    for chunk in content.split_inclusive('\n') {
        let body = chunk.strip_suffix('\n').unwrap_or(chunk);
        let body = body.strip_suffix('\r').unwrap_or(body);
        let ending = &chunk[body.len()..];

        let mut last = 0;
        for caps in re.captures_iter(body) {
            let Some(m) = caps.get(0) else { continue };
            if m.is_empty() {
                continue;
            }
            out.push_str(&body[last..m.start()]);
            let mut with = String::new();
            if options.use_regex {
                caps.expand(replacement, &mut with);
            } else {
                with.push_str(replacement);
            }
            if options.preserve_case {
                with = match_case(m.as_str(), &with);
            }
            out.push_str(&with);
            last = m.end();
            count += 1;
        }
        out.push_str(&body[last..]);
        out.push_str(ending);
    }
    (out, count)
}

/// Shape `replacement` like `hit`: upper-case when the hit is, capitalised
/// when the hit starts with a capital, unchanged otherwise.
fn match_case(hit: &str, replacement: &str) -> String {
    if hit == hit.to_uppercase() {
        return replacement.to_uppercase();
    }
    let starts_upper = hit.chars().next().is_some_and(|c| !c.is_lowercase());
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if starts_upper => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}

/// Replace matches in every leaf that has at least one, writing the new
/// content back into the tree.
pub fn replace_all(
    tree: &mut FileTree,
    query: &str,
    replacement: &str,
    options: SearchOptions,
) -> Vec<Replaced> {
    let Some(re) = compile_or_log(query, options) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for node in tree.leaves() {
        if let Some(r) = replace_node(tree, node, &re, replacement, options) {
            out.push(r);
        }
    }
    tracing::info!(
        "replaced {} matches across {} files",
        out.iter().map(|r| r.count).sum::<usize>(),
        out.len()
    );
    out
}

/// Replace matches in a single leaf.
pub fn replace_in_file(
    tree: &mut FileTree,
    node: NodeId,
    query: &str,
    replacement: &str,
    options: SearchOptions,
) -> Option<Replaced> {
    let re = compile_or_log(query, options)?;
    replace_node(tree, node, &re, replacement, options)
}

fn replace_node(
    tree: &mut FileTree,
    node: NodeId,
    re: &Regex,
    replacement: &str,
    options: SearchOptions,
) -> Option<Replaced> {
    let content = tree.get(node).content.as_deref()?;
    let (new_content, count) = substitute(re, content, replacement, options);
    if count == 0 {
        return None;
    }
    let previous = std::mem::replace(&mut tree.get_mut(node).content, Some(new_content.clone()));
    Some(Replaced {
        path: tree.path_of(node),
        previous: previous.unwrap_or_default(),
        content: new_content,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::FileTree;

    fn tree_of(files: &[(&str, &str)]) -> FileTree {
        let mut tree = FileTree::new("t");
        for (p, c) in files {
            tree.insert_path(p, (*c).to_string());
        }
        tree
    }

    fn literal() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn finds_matches_with_line_and_offset() {
        let tree = tree_of(&[("a.txt", "foo bar\nbar foo foo\n")]);
        let results = search_tree(&tree, "foo", literal());
        assert_eq!(results.len(), 1);
        let m = &results[0].matches;
        assert_eq!(m.len(), 3);
        assert_eq!((m[0].line, m[0].offset, m[0].length), (1, 0, 3));
        assert_eq!((m[1].line, m[1].offset), (2, 4));
        assert_eq!((m[2].line, m[2].offset), (2, 8));
        assert_eq!(results[0].path, "a.txt");
    }

    #[test]
    fn metacharacters_are_literal_outside_regex_mode() {
        let tree = tree_of(&[("a.js", "a.b\naxb\n(x)\n")]);
        let dot = search_tree(&tree, ".", literal());
        assert_eq!(dot[0].matches.len(), 1);
        assert_eq!(dot[0].matches[0].line, 1);

        let parens = search_tree(&tree, "(x)", literal());
        assert_eq!(parens[0].matches.len(), 1);
        assert_eq!(parens[0].matches[0].line, 3);

        let regex = SearchOptions {
            use_regex: true,
            ..literal()
        };
        let any = search_tree(&tree, "a.b", regex);
        assert_eq!(any[0].matches.len(), 2);
    }

    #[test]
    fn case_and_whole_word_flags() {
        let tree = tree_of(&[("a.txt", "Cat cat concatenate\n")]);
        assert_eq!(search_tree(&tree, "cat", literal())[0].matches.len(), 3);

        let cs = SearchOptions {
            case_sensitive: true,
            ..literal()
        };
        assert_eq!(search_tree(&tree, "cat", cs)[0].matches.len(), 2);

        let ww = SearchOptions {
            whole_word: true,
            ..literal()
        };
        assert_eq!(search_tree(&tree, "cat", ww)[0].matches.len(), 2);

        let both = SearchOptions {
            case_sensitive: true,
            whole_word: true,
            ..literal()
        };
        let m = &search_tree(&tree, "cat", both)[0].matches;
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].offset, 4);
    }

    #[test]
    fn invalid_regex_yields_no_results() {
        let tree = tree_of(&[("a.txt", "(((\n")]);
        let regex = SearchOptions {
            use_regex: true,
            ..literal()
        };
        assert!(compile("(", regex).is_err());
        assert!(search_tree(&tree, "(", regex).is_empty());
    }

    #[test]
    fn empty_query_yields_no_results() {
        let tree = tree_of(&[("a.txt", "abc\n  x  \n")]);
        assert!(search_tree(&tree, "", literal()).is_empty());
        assert!(search_tree(&tree, "   ", literal()).is_empty());
    }

    #[test]
    fn zero_length_matches_are_skipped() {
        let tree = tree_of(&[("a.txt", "bbb\naab\n")]);
        let regex = SearchOptions {
            use_regex: true,
            ..literal()
        };
        let results = search_tree(&tree, "a*", regex);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matches.len(), 1);
        assert_eq!(results[0].matches[0].length, 2);
    }

    #[test]
    fn offsets_count_characters() {
        let tree = tree_of(&[("a.txt", "héllo wörld\n")]);
        let m = &search_tree(&tree, "wörld", literal())[0].matches[0];
        assert_eq!((m.offset, m.length), (6, 5));
    }

    #[test]
    fn replace_all_removes_every_occurrence() {
        let mut tree = tree_of(&[
            ("a.txt", "x.y x.y\nx.y\n"),
            ("b.txt", "nothing here\n"),
            ("c/d.txt", "x.y"),
        ]);
        let replaced = replace_all(&mut tree, "x.y", "z", literal());
        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced[0].count + replaced[1].count, 4);

        let a = tree.find_path("a.txt").unwrap();
        assert_eq!(tree.get(a).content.as_deref(), Some("z z\nz\n"));
        assert!(!tree.get(a).content.as_deref().unwrap().contains("x.y"));
        let b = tree.find_path("b.txt").unwrap();
        assert_eq!(tree.get(b).content.as_deref(), Some("nothing here\n"));
        assert!(search_tree(&tree, "x.y", literal()).is_empty());
    }

    #[test]
    fn literal_replacement_does_not_expand_groups() {
        let mut tree = tree_of(&[("a.txt", "cost")]);
        replace_all(&mut tree, "cost", "$1 each", literal());
        let a = tree.find_path("a.txt").unwrap();
        assert_eq!(tree.get(a).content.as_deref(), Some("$1 each"));
    }

    #[test]
    fn regex_replacement_expands_groups() {
        let mut tree = tree_of(&[("a.txt", "let a = 1;\nlet b = 2;\n")]);
        let regex = SearchOptions {
            use_regex: true,
            ..literal()
        };
        replace_all(&mut tree, r"let (\w+)", "const $1", regex);
        let a = tree.find_path("a.txt").unwrap();
        assert_eq!(
            tree.get(a).content.as_deref(),
            Some("const a = 1;\nconst b = 2;\n")
        );
    }

    #[test]
    fn replace_in_file_touches_only_that_file() {
        let mut tree = tree_of(&[("a.txt", "foo"), ("b.txt", "foo")]);
        let a = tree.find_path("a.txt").unwrap();
        let r = replace_in_file(&mut tree, a, "foo", "bar", literal()).unwrap();
        assert_eq!(r.count, 1);
        assert_eq!((r.previous.as_str(), r.content.as_str()), ("foo", "bar"));
        let b = tree.find_path("b.txt").unwrap();
        assert_eq!(tree.get(b).content.as_deref(), Some("foo"));
        assert!(replace_in_file(&mut tree, a, "foo", "bar", literal()).is_none());
    }

    fn regex_mode() -> SearchOptions {
        SearchOptions {
            use_regex: true,
            ..literal()
        }
    }

    #[test]
    fn replace_ignores_matches_spanning_lines() {
        let mut tree = tree_of(&[("a.txt", "foo\nbar\n")]);
        assert!(search_tree(&tree, r"foo\nbar", regex_mode()).is_empty());
        assert!(replace_all(&mut tree, r"foo\nbar", "X", regex_mode()).is_empty());
        let a = tree.find_path("a.txt").unwrap();
        assert_eq!(tree.get(a).content.as_deref(), Some("foo\nbar\n"));
    }

    #[test]
    fn replace_count_matches_search_with_anchors() {
        let mut tree = tree_of(&[("a.txt", "foo\r\nfoo\nfood\n")]);
        let found: usize = search_tree(&tree, "^foo$", regex_mode())
            .iter()
            .map(|f| f.matches.len())
            .sum();
        assert_eq!(found, 2);

        let replaced = replace_all(&mut tree, "^foo$", "bar", regex_mode());
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].count, found);
        assert_eq!(replaced[0].content, "bar\r\nbar\nfood\n");
        assert!(search_tree(&tree, "^foo$", regex_mode()).is_empty());
    }

    #[test]
    fn preserve_case_follows_each_hit() {
        let mut tree = tree_of(&[("a.txt", "cat Cat CAT\n")]);
        let options = SearchOptions {
            preserve_case: true,
            ..literal()
        };
        replace_all(&mut tree, "cat", "dog", options);
        let a = tree.find_path("a.txt").unwrap();
        assert_eq!(tree.get(a).content.as_deref(), Some("dog Dog DOG\n"));

        assert_eq!(match_case("Foo", "bar"), "Bar");
        assert_eq!(match_case("foo", "Bar"), "Bar");
        assert_eq!(match_case("FOO", "bar"), "BAR");
    }
}
