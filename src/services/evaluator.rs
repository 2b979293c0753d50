// src/services/evaluator.rs

//! Verify-rule evaluation.
//!
//! Decides whether a profile's rule tree is satisfied for a site. The
//! contract is "never fail": an unreachable page, a malformed selector or
//! an invalid regex make the affected predicate false, so one broken site
//! or template never aborts a batch identification run.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use regex::RegexBuilder;
use scraper::{ElementRef, Html, Selector};

use crate::models::{RuleNode, SiteContext};
use crate::utils::http::PageFetcher;

/// Service evaluating rule trees against one site session.
pub struct RuleEvaluator {
    fetcher: Arc<dyn PageFetcher>,
}

impl RuleEvaluator {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Evaluate a rule tree for the given session.
    ///
    /// Children run strictly left to right with short-circuiting; the page
    /// is fetched at most once per session, and only when a predicate
    /// actually needs it.
    pub async fn evaluate(&self, ctx: &SiteContext, rule: &RuleNode) -> bool {
        self.eval(ctx, rule).await
    }

    fn eval<'a>(&'a self, ctx: &'a SiteContext, rule: &'a RuleNode) -> BoxFuture<'a, bool> {
        async move {
            match rule {
                RuleNode::Any(children) => {
                    for child in children {
                        if self.eval(ctx, child).await {
                            return true;
                        }
                    }
                    false
                }
                RuleNode::All(children) => {
                    for child in children {
                        if !self.eval(ctx, child).await {
                            return false;
                        }
                    }
                    true
                }
                RuleNode::UrlContains(value) => ctx.base_url().contains(value.as_str()),
                _ => self.eval_page_predicate(ctx, rule).await,
            }
        }
        .boxed()
    }

    /// Predicates that need the page body.
    async fn eval_page_predicate(&self, ctx: &SiteContext, rule: &RuleNode) -> bool {
        let Some(body) = ctx.body(self.fetcher.as_ref()).await else {
            return false;
        };
        let document = Html::parse_document(body);

        match rule {
            RuleNode::MetaGenerator(value) => {
                let Some(sel) = parse_selector(r#"meta[name="generator"]"#) else {
                    return false;
                };
                document
                    .select(&sel)
                    .filter_map(|el| el.value().attr("content"))
                    .any(|content| contains_ci(content, value))
            }
            RuleNode::TitleContains(value) => {
                let Some(sel) = parse_selector("title") else {
                    return false;
                };
                document
                    .select(&sel)
                    .any(|el| contains_ci(&element_text(el), value))
            }
            RuleNode::SelectorExists(selector) => {
                let Some(sel) = parse_selector(selector) else {
                    return false;
                };
                document.select(&sel).next().is_some()
            }
            RuleNode::TextContains { selector, value } => {
                let Some(sel) = parse_selector(selector) else {
                    return false;
                };
                document
                    .select(&sel)
                    .any(|el| contains_ci(&element_text(el), value))
            }
            RuleNode::RegexMatch { selector, pattern } => {
                let Some(sel) = parse_selector(selector) else {
                    return false;
                };
                let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(re) => re,
                    Err(e) => {
                        log::debug!("invalid rule pattern '{}': {}", pattern, e);
                        return false;
                    }
                };
                document.select(&sel).any(|el| re.is_match(&element_text(el)))
            }
            // Combinators and UrlContains are handled before the fetch.
            _ => false,
        }
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            log::debug!("invalid rule selector '{}': {:?}", selector, e);
            None
        }
    }
}

fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
