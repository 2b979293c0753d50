// src/services/extractor.rs

//! Structured record extraction.
//!
//! Projects a parse schema over one page: select the repeating row
//! elements, then per row resolve each field rule into a typed value.
//! Partial data beats dropped data: a field that fails to resolve is
//! `None`, and the row is still emitted.

use std::sync::Arc;

use scraper::{ElementRef, Html};
use url::Url;

use crate::error::Result;
use crate::models::{CompiledField, CompiledSchema, Extract, ParseSchema, Record, SiteContext, Value};
use crate::utils::http::PageFetcher;
use crate::utils::resolve_url;

/// Service turning one page into a sequence of records.
pub struct FieldExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl FieldExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Extract all records the schema finds on the session's page.
    ///
    /// An unreachable page and an unmatched row selector both yield zero
    /// records. The only error is a schema that fails to compile, which the
    /// store normally rejects at load.
    pub async fn extract(
        &self,
        ctx: &SiteContext,
        name: &str,
        schema: &ParseSchema,
    ) -> Result<Vec<Record>> {
        let compiled = schema.compile(name)?;

        let Some(body) = ctx.body(self.fetcher.as_ref()).await else {
            return Ok(Vec::new());
        };
        let document = Html::parse_document(body);
        let base = Url::parse(ctx.base_url()).ok();

        let records: Vec<Record> = document
            .select(&compiled.row)
            .map(|row| extract_row(row, &compiled, base.as_ref()))
            .collect();

        if records.is_empty() {
            log::debug!(
                "row selector '{}' matched nothing on {}",
                schema.row_selector,
                ctx.base_url()
            );
        }
        Ok(records)
    }
}

fn extract_row(row: ElementRef, schema: &CompiledSchema, base: Option<&Url>) -> Record {
    schema
        .fields
        .iter()
        .map(|field| (field.name.clone(), extract_field(row, field, base)))
        .collect()
}

fn extract_field(row: ElementRef, field: &CompiledField, base: Option<&Url>) -> Option<Value> {
    let element = match &field.selector {
        Some(sel) => row.select(sel).next()?,
        None => row,
    };

    let raw = match &field.rule.extract {
        Extract::Text => element.text().collect::<String>(),
        Extract::Attr(name) => element.value().attr(name)?.to_string(),
    };

    let raw = if field.rule.resolve_url {
        match base {
            Some(base) => resolve_url(base, raw.trim()),
            None => raw,
        }
    } else {
        raw
    };

    field.rule.transform.apply(&raw)
}
