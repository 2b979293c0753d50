// src/models/rule.rs

//! Verify rule tree for site identification.

use serde::{Deserialize, Serialize};

/// One node of a profile's verify rule tree.
///
/// Combinators nest arbitrarily; leaf predicates test a single property of
/// the site under inspection. In TOML a tree reads as nested inline tables:
///
/// ```toml
/// verify = { all = [
///     { url_contains = ".php" },
///     { any = [
///         { meta_generator = "NexusPHP" },
///         { selector_exists = "table.torrents" },
///     ] },
/// ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleNode {
    /// True iff at least one child is true. Empty list is false.
    Any(Vec<RuleNode>),

    /// True iff every child is true. Empty list is true.
    All(Vec<RuleNode>),

    /// `<meta name="generator">` content contains the value (case-insensitive).
    /// Substring rather than equality: real generator strings carry version
    /// suffixes like "NexusPHP 1.8.15".
    MetaGenerator(String),

    /// `<title>` text contains the value (case-insensitive).
    TitleContains(String),

    /// The configured base URL contains the value (case-sensitive, no fetch).
    UrlContains(String),

    /// The selector matches at least one element.
    SelectorExists(String),

    /// Any element matched by the selector has text containing the value
    /// (case-insensitive).
    TextContains { selector: String, value: String },

    /// Any element matched by the selector has text matching the pattern
    /// (case-insensitive regex search).
    RegexMatch { selector: String, pattern: String },
}

impl RuleNode {
    /// Number of leaf predicates in the tree.
    pub fn predicate_count(&self) -> usize {
        match self {
            RuleNode::Any(children) | RuleNode::All(children) => {
                children.iter().map(RuleNode::predicate_count).sum()
            }
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let rule = RuleNode::All(vec![
            RuleNode::UrlContains(".php".to_string()),
            RuleNode::Any(vec![
                RuleNode::MetaGenerator("NexusPHP".to_string()),
                RuleNode::TextContains {
                    selector: "td.embedded".to_string(),
                    value: "powered by".to_string(),
                },
            ]),
        ]);

        #[derive(Serialize, Deserialize)]
        struct Wrap {
            verify: RuleNode,
        }

        let toml = toml::to_string(&Wrap {
            verify: rule.clone(),
        })
        .unwrap();
        let back: Wrap = toml::from_str(&toml).unwrap();
        assert_eq!(back.verify, rule);
    }

    #[test]
    fn test_parse_from_toml() {
        let src = r#"
            verify = { any = [
                { title_contains = "torrents" },
                { regex_match = { selector = "div.footer", pattern = "gazelle" } },
            ] }
        "#;

        #[derive(Deserialize)]
        struct Wrap {
            verify: RuleNode,
        }

        let wrap: Wrap = toml::from_str(src).unwrap();
        let RuleNode::Any(children) = wrap.verify else {
            panic!("expected any node");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            RuleNode::TitleContains("torrents".to_string())
        );
    }

    #[test]
    fn test_predicate_count() {
        let rule = RuleNode::All(vec![
            RuleNode::UrlContains("x".to_string()),
            RuleNode::Any(vec![
                RuleNode::TitleContains("a".to_string()),
                RuleNode::TitleContains("b".to_string()),
            ]),
        ]);
        assert_eq!(rule.predicate_count(), 3);
        assert_eq!(RuleNode::Any(vec![]).predicate_count(), 0);
    }
}
