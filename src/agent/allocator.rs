//! Allocation orchestrator: reasoning service first, market fallback second

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::analysis::{compose_analysis, AnalysisParts};
use super::client::{ChatCompletion, ChatMessage};
use super::prompts::{allocation_user_prompt, ALLOCATION_SYSTEM_PROMPT};
use crate::adapters::{format_headlines, HeadlineSource, TickerSource};
use crate::config::AdvisorConfig;
use crate::domain::{AllocationSet, RawTicker};
use crate::sizing::{allocate_fallback, extract_payload, fallback_symbols, normalize_picks};

/// What the caller gets back from an allocation run
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    /// Human-readable summary for operator logs
    pub analysis: String,
    pub picks: AllocationSet,
    /// Rationale given by the reasoning service, if any
    pub reason: String,
    pub used_fallback: bool,
    pub generated_at: DateTime<Utc>,
}

/// Ranks candidates and sizes an allocation
pub struct AllocationAgent {
    config: AdvisorConfig,
    chat: Arc<dyn ChatCompletion>,
    tickers: Arc<dyn TickerSource>,
    headlines: Option<Arc<dyn HeadlineSource>>,
    headline_items: usize,
}

impl AllocationAgent {
    pub fn new(
        config: AdvisorConfig,
        chat: Arc<dyn ChatCompletion>,
        tickers: Arc<dyn TickerSource>,
    ) -> Self {
        Self {
            config,
            chat,
            tickers,
            headlines: None,
            headline_items: 6,
        }
    }

    /// Add headline context to the prompt
    pub fn with_headlines(mut self, source: Arc<dyn HeadlineSource>, max_items: usize) -> Self {
        self.headlines = Some(source);
        self.headline_items = max_items;
        self
    }

    /// Produce an allocation for `candidates`.
    ///
    /// Never fails: collaborator errors end up in the analysis text and, at
    /// worst, the returned allocation is empty.
    pub async fn allocate<S: AsRef<str> + Sync>(
        &self,
        candidates: &[S],
        budget: Option<Decimal>,
    ) -> AllocationReport {
        let headlines = self.fetch_headlines().await;

        let messages = [
            ChatMessage::system(ALLOCATION_SYSTEM_PROMPT),
            ChatMessage::user(allocation_user_prompt(headlines.as_deref(), candidates, budget)),
        ];

        let (reply, error) = self.ask(&messages).await;
        let payload = extract_payload(&reply);
        let mut picks = payload
            .picks()
            .map(normalize_picks)
            .unwrap_or_default();

        let mut fallback_text = None;
        if picks.is_empty() {
            let listed: Vec<&str> = candidates.iter().map(|c| c.as_ref()).collect();
            info!(
                "No usable picks from reasoning service, running market fallback over {} candidates",
                listed.len()
            );

            let symbols = fallback_symbols(&self.config, candidates);
            let tickers = self.fetch_tickers(&symbols).await;
            let outcome = allocate_fallback(&self.config, &symbols, &tickers);

            fallback_text = Some(format!(
                "Reasoning service returned no usable picks; running market fallback. Candidates: {:?}\n{}",
                listed, outcome.diagnostic
            ));
            picks = outcome.picks;
        }

        info!(
            "Allocation ready: {} picks, {:.4} of budget",
            picks.len(),
            picks.total_weight()
        );

        let analysis = compose_analysis(&AnalysisParts {
            headlines: headlines.as_deref(),
            reason: payload.reason(),
            notes: payload.notes(),
            fallback: fallback_text.as_deref(),
            raw_reply: &reply,
            error: error.as_deref(),
        });

        AllocationReport {
            analysis,
            picks,
            reason: payload.reason().to_string(),
            used_fallback: fallback_text.is_some(),
            generated_at: Utc::now(),
        }
    }

    /// Reply text and, on failure, the error message
    async fn ask(&self, messages: &[ChatMessage]) -> (String, Option<String>) {
        if !self.chat.is_configured() {
            return (String::new(), Some("no api key".to_string()));
        }
        match self.chat.complete(messages).await {
            Ok(reply) => (reply, None),
            Err(e) => {
                warn!("Reasoning service call failed: {}", e);
                (String::new(), Some(e.to_string()))
            }
        }
    }

    async fn fetch_headlines(&self) -> Option<String> {
        let source = self.headlines.as_ref()?;
        match source.fetch_titles().await {
            Ok(titles) => format_headlines(&titles, self.headline_items),
            Err(e) => {
                debug!("Headlines unavailable: {}", e);
                None
            }
        }
    }

    /// Fetch tickers concurrently; failed symbols are simply absent.
    async fn fetch_tickers(&self, symbols: &[String]) -> HashMap<String, RawTicker> {
        let results = join_all(symbols.iter().map(|s| self.tickers.fetch_ticker(s))).await;

        symbols
            .iter()
            .zip(results)
            .filter_map(|(symbol, result)| match result {
                Ok(ticker) => Some((symbol.clone(), ticker)),
                Err(e) => {
                    debug!("Ticker fetch failed for {}: {}", symbol, e);
                    None
                }
            })
            .collect()
    }
}
