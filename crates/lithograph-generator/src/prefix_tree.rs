//! Longest-match lookup over a fixed set of strings.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct Node {
    children: HashMap<char, Node>,
    terminal: bool,
}

/// A trie built once from a finite set of strings.
///
/// Lookup cost is linear in the length of the match, independent of the
/// haystack length and of the number of known strings.
#[derive(Debug, Default, Clone)]
pub struct PrefixTree {
    root: Node,
}

impl PrefixTree {
    /// Build a tree from the given strings. Duplicates are harmless.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Node::default();
        for value in values {
            let mut node = &mut root;
            for ch in value.as_ref().chars() {
                node = node.children.entry(ch).or_default();
            }
            node.terminal = true;
        }
        Self { root }
    }

    /// Longest known string found in `haystack` at byte offset `start`.
    ///
    /// Returns `None` when no known string matches there, or when `start`
    /// is not a char boundary of `haystack`.
    #[must_use]
    pub fn match_at<'h>(&self, haystack: &'h str, start: usize) -> Option<&'h str> {
        let rest = haystack.get(start..)?;

        let mut node = &self.root;
        let mut longest = node.terminal.then_some(0);

        for (offset, ch) in rest.char_indices() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    if node.terminal {
                        longest = Some(offset + ch.len_utf8());
                    }
                }
                None => break,
            }
        }

        longest.map(|len| &rest[..len])
    }
}
