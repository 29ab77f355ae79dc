//! A small CSS selector subset: type, class and attribute selectors,
//! compounds of those, and comma-separated lists. No combinators.

use std::collections::BTreeMap;
use std::str::FromStr;

use super::node::has_class;
use crate::types::errors::DomError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

/// One compound selector such as `div.post[data-id="1"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl CompoundSelector {
    pub fn matches(&self, tag: &str, attributes: &BTreeMap<String, String>) -> bool {
        if let Some(t) = &self.tag {
            if !t.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| has_class(attributes, c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.op, attributes.get(&a.name)) {
            (_, None) => false,
            (AttrOp::Exists, Some(_)) => true,
            (AttrOp::Equals(v), Some(actual)) => actual == v,
            (AttrOp::Contains(v), Some(actual)) => !v.is_empty() && actual.contains(v.as_str()),
        })
    }

    fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(input.to_string());
        let chars: Vec<char> = input.chars().collect();
        let mut sel = CompoundSelector::default();
        let mut i = 0;

        if i < chars.len() && chars[i] == '*' {
            i += 1;
        } else if i < chars.len() && is_ident_char(chars[i]) {
            let (ident, next) = read_ident(&chars, i);
            sel.tag = Some(ident.to_ascii_lowercase());
            i = next;
        }

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    let (ident, next) = read_ident(&chars, i + 1);
                    if ident.is_empty() {
                        return Err(invalid());
                    }
                    sel.classes.push(ident);
                    i = next;
                }
                '[' => {
                    let close = chars[i..]
                        .iter()
                        .position(|c| *c == ']')
                        .map(|p| p + i)
                        .ok_or_else(invalid)?;
                    let inner: String = chars[i + 1..close].iter().collect();
                    sel.attrs.push(parse_attr(&inner).ok_or_else(invalid)?);
                    i = close + 1;
                }
                _ => return Err(invalid()),
            }
        }

        if sel.tag.is_none() && sel.classes.is_empty() && sel.attrs.is_empty() && input != "*" {
            return Err(invalid());
        }
        Ok(sel)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn parse_attr(inner: &str) -> Option<AttrSelector> {
    let inner = inner.trim();
    let (name, op) = if let Some((name, value)) = inner.split_once("*=") {
        (name, AttrOp::Contains(unquote(value)?))
    } else if let Some((name, value)) = inner.split_once('=') {
        (name, AttrOp::Equals(unquote(value)?))
    } else {
        (inner, AttrOp::Exists)
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    Some(AttrSelector {
        name: name.to_string(),
        op,
    })
}

fn unquote(value: &str) -> Option<String> {
    let v = value.trim();
    for q in ['"', '\''] {
        if let Some(rest) = v.strip_prefix(q) {
            return rest.strip_suffix(q).map(str::to_string);
        }
    }
    if v.chars().all(is_ident_char) {
        Some(v.to_string())
    } else {
        None
    }
}

/// A comma-separated selector list; matches when any member matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<CompoundSelector>);

impl SelectorList {
    pub fn matches(&self, tag: &str, attributes: &BTreeMap<String, String>) -> bool {
        self.0.iter().any(|s| s.matches(tag, attributes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    Err(DomError::InvalidSelector(s.to_string()))
                } else {
                    CompoundSelector::parse(part)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SelectorList(parts))
    }
}
