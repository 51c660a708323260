//! Regex matching and replacement template expansion for file names.

use std::fmt;

use anyhow::{Context, Result};
use itertools::Itertools;
use regex::{Captures, Regex, RegexBuilder};

/// One piece of a parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Group(usize),
    Named(String),
}

/// Compiled pattern and replacement template.
///
/// A name matches when the pattern matches at the start of the name.
/// The destination is the replacement template with group references
/// filled in from the captures of that match.
///
/// Replacement template syntax:
/// - `\1` to `\99`: numbered group, at most two digits are read
/// - `\g<1>` or `\g<name>`: explicit numbered or named group, `\g<0>` is the whole match
/// - `\\`: literal backslash
///
/// Any other character is copied as is.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    template: Vec<TemplatePart>,
}

impl Matcher {
    /// Compile the pattern and parse the replacement template.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid regex,
    /// or the template is malformed or references a group the pattern does not have.
    pub fn new(pattern: &str, replacement: &str, ignorecase: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignorecase)
            .build()
            .with_context(|| format!("Invalid regex pattern: '{pattern}'"))?;

        let template =
            parse_template(replacement).with_context(|| format!("Invalid replacement template: '{replacement}'"))?;

        for part in &template {
            match part {
                TemplatePart::Group(index) if *index >= regex.captures_len() => {
                    anyhow::bail!(
                        "Invalid group reference {index} in replacement '{replacement}': pattern has {} group(s)",
                        regex.captures_len() - 1
                    );
                }
                TemplatePart::Named(name) if !regex.capture_names().flatten().contains(&name.as_str()) => {
                    anyhow::bail!("Unknown group name '{name}' in replacement '{replacement}'");
                }
                _ => {}
            }
        }

        Ok(Self { regex, template })
    }

    /// Compute the new name for the given name.
    ///
    /// Returns `None` if the pattern does not match.
    #[must_use]
    pub fn destination(&self, name: &str) -> Option<String> {
        let captures = self.captures(name)?;
        let mut destination = String::with_capacity(name.len());
        for part in &self.template {
            match part {
                TemplatePart::Literal(text) => destination.push_str(text),
                TemplatePart::Group(index) => {
                    destination.push_str(captures.get(*index).map_or("", |m| m.as_str()));
                }
                TemplatePart::Named(group) => {
                    destination.push_str(captures.name(group).map_or("", |m| m.as_str()));
                }
            }
        }
        Some(destination)
    }

    /// Get captures for a match that starts at the beginning of the name.
    ///
    /// Leftmost-first search returns a match at index zero whenever one exists.
    fn captures<'h>(&self, name: &'h str) -> Option<Captures<'h>> {
        self.regex
            .captures(name)
            .filter(|captures| captures.get(0).is_some_and(|m| m.start() == 0))
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let template = self
            .template
            .iter()
            .map(|part| match part {
                TemplatePart::Literal(text) => text.replace('\\', r"\\"),
                TemplatePart::Group(index) => format!(r"\g<{index}>"),
                TemplatePart::Named(name) => format!(r"\g<{name}>"),
            })
            .join("");
        write!(f, "{} -> {template}", self.regex.as_str())
    }
}

/// Split a replacement template into literal text and group references.
fn parse_template(template: &str) -> Result<Vec<TemplatePart>> {
    let mut parts: Vec<TemplatePart> = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            literal.push(c);
            continue;
        }
        let reference = match chars.peek().copied() {
            Some(digit @ '1'..='9') => {
                chars.next();
                let mut index = digit as usize - '0' as usize;
                if let Some(next @ '0'..='9') = chars.peek().copied() {
                    chars.next();
                    index = index * 10 + (next as usize - '0' as usize);
                }
                Some(TemplatePart::Group(index))
            }
            Some('g') => {
                chars.next();
                if chars.next() != Some('<') {
                    anyhow::bail!(r"Expected '<' after \g");
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(c) => name.push(c),
                        None => anyhow::bail!(r"Missing '>' in \g<{name}"),
                    }
                }
                if name.is_empty() {
                    anyhow::bail!(r"Empty group reference \g<>");
                }
                Some(
                    name.parse::<usize>()
                        .map_or_else(|_| TemplatePart::Named(name), TemplatePart::Group),
                )
            }
            Some('\\') => {
                chars.next();
                literal.push('\\');
                None
            }
            _ => {
                literal.push('\\');
                None
            }
        };

        if let Some(reference) = reference {
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(reference);
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }
    Ok(parts)
}
