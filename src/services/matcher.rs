// src/services/matcher.rs

//! Profile matching orchestration.
//!
//! Walks candidate profiles in the caller-supplied order, verifying each
//! against its own session until one matches. The caller decides priority
//! (most specific families first); the matcher adds no ranking of its own.

use std::sync::Arc;

use crate::error::{ProfileError, Result};
use crate::models::{MatchResult, MatchSource, Record, SiteContext};
use crate::services::{FieldExtractor, RuleEvaluator};
use crate::store::TemplateStore;
use crate::utils::http::PageFetcher;

/// Orchestrator over the template store, rule evaluator and field extractor.
pub struct ProfileMatcher {
    store: Arc<TemplateStore>,
    evaluator: RuleEvaluator,
    extractor: FieldExtractor,
}

impl ProfileMatcher {
    pub fn new(store: Arc<TemplateStore>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            store,
            evaluator: RuleEvaluator::new(Arc::clone(&fetcher)),
            extractor: FieldExtractor::new(fetcher),
        }
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Identify which profile, if any, matches the site.
    ///
    /// Profiles are checked strictly in the supplied order and the first
    /// match wins. Each profile is verified against a fresh session, so a
    /// page fetched while checking one profile is never reused for the
    /// next; caller-prefetched HTML is carried into every session. An
    /// unknown site is a `None`, not an error.
    pub async fn identify(&self, ctx: &SiteContext, ordered_ids: &[&str]) -> Option<MatchResult> {
        for id in ordered_ids {
            let Some(profile) = self.store.get(id) else {
                log::warn!("unknown profile id '{}' in identify order, skipping", id);
                continue;
            };

            let session = ctx.fresh_session();
            log::debug!(
                "checking profile '{}' against {}",
                profile.meta.id,
                session.base_url()
            );
            if self.evaluator.evaluate(&session, &profile.verify).await {
                log::debug!("matched profile '{}' ({})", profile.meta.id, profile.meta.family);
                return Some(MatchResult {
                    profile_id: profile.meta.id.clone(),
                    family: profile.meta.family.clone(),
                    version: profile.meta.version.clone(),
                    source: MatchSource::Verified,
                });
            }
        }
        None
    }

    /// Fast path for sites whose profile was already recorded: family label
    /// by profile id, no network.
    pub fn get_family(&self, profile_id: &str) -> Option<String> {
        self.store.get(profile_id).map(|p| p.meta.family.clone())
    }

    /// Rebuild a match result from the store without re-verification, for
    /// callers holding a previously persisted identification.
    pub fn recall(&self, profile_id: &str) -> Option<MatchResult> {
        self.store.get(profile_id).map(|profile| MatchResult {
            profile_id: profile.meta.id.clone(),
            family: profile.meta.family.clone(),
            version: profile.meta.version.clone(),
            source: MatchSource::Cached,
        })
    }

    /// Extract records from the site using one of the profile's named
    /// schemas.
    pub async fn parse(
        &self,
        ctx: &SiteContext,
        profile_id: &str,
        schema_name: &str,
    ) -> Result<Vec<Record>> {
        let profile = self
            .store
            .get(profile_id)
            .ok_or_else(|| ProfileError::UnknownProfile(profile_id.to_string()))?;
        let schema = profile
            .schemas
            .get(schema_name)
            .ok_or_else(|| ProfileError::unknown_schema(profile_id, schema_name))?;
        self.extractor.extract(ctx, schema_name, schema).await
    }
}
