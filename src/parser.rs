//! Markdown catalog parsing
//!
//! Turns a curated markdown document into [`Entry`] records. The document is
//! a sequence of heading lines and list-item lines of the form
//! `- [name](url) - description`; the headings above an item (excluding the
//! topmost document heading) become its `section` breadcrumb, joined by
//! `" > "`.
//!
//! Heading nesting is tracked as an explicit stack of `(depth, title)`
//! pairs: a deeper heading pushes, an equal-or-shallower heading pops back
//! to its parent level and then pushes. Non-matching lines are ignored, so
//! parsing is total over any input text.

use crate::types::Entry;
use regex::Regex;

/// Parses catalog documents into entries
pub struct ListParser {
    heading: Regex,
    item: Regex,
}

impl ListParser {
    /// Create a parser with the heading and list-item patterns compiled
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`](crate::Error::Pattern) if a pattern fails
    /// to compile.
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            heading: Regex::new(r"^(#+) (.*)$")?,
            item: Regex::new(r"^\s*- \[(.*)\]\((.*)\) - (.*)$")?,
        })
    }

    /// Parse a document into its entries, in document order
    pub fn parse(&self, document: &str) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut stack: Vec<(usize, String)> = Vec::new();

        for line in document.lines() {
            if let Some(captures) = self.item.captures(line) {
                let section = stack
                    .iter()
                    .skip(1)
                    .map(|(_, title)| title.as_str())
                    .collect::<Vec<_>>()
                    .join(" > ");
                entries.push(Entry {
                    name: captures[1].to_string(),
                    section,
                    url: captures[2].to_string(),
                    description: captures[3].to_string(),
                });
            } else if let Some(captures) = self.heading.captures(line) {
                let depth = captures[1].len();
                while stack.last().is_some_and(|(d, _)| *d >= depth) {
                    stack.pop();
                }
                stack.push((depth, captures[2].to_string()));
            }
        }

        entries
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(document: &str) -> Vec<Entry> {
        ListParser::new().unwrap().parse(document)
    }

    #[test]
    fn item_fields_are_extracted() {
        let entries = parse("- [widget](https://github.com/acme/widget) - A fine widget.");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "widget");
        assert_eq!(entries[0].url, "https://github.com/acme/widget");
        assert_eq!(entries[0].description, "A fine widget.");
        assert_eq!(entries[0].section, "");
    }

    #[test]
    fn section_excludes_topmost_heading() {
        let document = "\
# Awesome Catalog

## Tools

- [widget](https://github.com/acme/widget) - A fine widget.
";
        let entries = parse(document);

        assert_eq!(entries[0].section, "Tools");
    }

    #[test]
    fn nested_headings_join_with_breadcrumb_separator() {
        let document = "\
# Awesome Catalog
## Tools
### Editors
- [ed](https://github.com/acme/ed) - The standard editor.
";
        let entries = parse(document);

        assert_eq!(entries[0].section, "Tools > Editors");
    }

    #[test]
    fn shallower_heading_pops_back_to_its_level() {
        let document = "\
# Awesome Catalog
## Tools
### Editors
- [ed](https://github.com/acme/ed) - The standard editor.
## Libraries
- [libwidget](https://github.com/acme/libwidget) - Widget primitives.
";
        let entries = parse(document);

        assert_eq!(entries[0].section, "Tools > Editors");
        assert_eq!(entries[1].section, "Libraries");
    }

    #[test]
    fn sibling_subheading_replaces_previous_one() {
        let document = "\
# Awesome Catalog
## Tools
### Editors
### Terminals
- [term](https://github.com/acme/term) - A terminal.
";
        let entries = parse(document);

        assert_eq!(entries[0].section, "Tools > Terminals");
    }

    #[test]
    fn heading_depth_may_skip_levels() {
        // `####` directly under `##`: the stack keeps both on the way down
        // and a later `###` pops only the deeper one
        let document = "\
# Awesome Catalog
## Tools
#### Niche
- [niche](https://github.com/acme/niche) - Deeply filed.
### Editors
- [ed](https://github.com/acme/ed) - The standard editor.
";
        let entries = parse(document);

        assert_eq!(entries[0].section, "Tools > Niche");
        assert_eq!(entries[1].section, "Tools > Editors");
    }

    #[test]
    fn indented_items_are_recognized() {
        let document = "\
# Awesome Catalog
## Tools
  - [widget](https://github.com/acme/widget) - Indented but valid.
";
        let entries = parse(document);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "widget");
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let document = "\
# Awesome Catalog
Some prose that is not an item.
- [no-description](https://github.com/acme/x)
- not a link at all
* [wrong-bullet](https://github.com/acme/y) - Uses an asterisk.
- [widget](https://github.com/acme/widget) - The only valid item.
";
        let entries = parse(document);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "widget");
    }

    #[test]
    fn items_before_any_heading_have_empty_section() {
        let entries = parse("- [early](https://github.com/acme/early) - Before headings.");

        assert_eq!(entries[0].section, "");
    }

    #[test]
    fn document_order_is_preserved() {
        let document = "\
# Catalog
## A
- [one](https://github.com/acme/one) - First.
- [two](https://github.com/acme/two) - Second.
## B
- [three](https://github.com/acme/three) - Third.
";
        let entries = parse(document);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }
}
