//! Advisor Agent Factory
//!
//! Builds the investment advisor agent for sessions. Clients are created
//! once at startup and shared; every agent gets its own tool registry.

use std::sync::Arc;

use agent_core::{
    reasoning::credential_fingerprint, Agent, AgentBuilder, AgentFactory, LlmProvider,
    Result as CoreResult,
};
use agent_runtime::{GeminiConfig, GeminiProvider};
use invest_advisor::{
    advisor_tools, system_prompt, ExaConfig, ExaSearchClient, MarketDataProvider, MockMarketData,
    SearchProvider, YahooMarketData, DISCLAIMER,
};

use crate::config::AdvisorSettings;

pub struct AdvisorAgentFactory {
    provider: Arc<dyn LlmProvider>,
    market: Arc<dyn MarketDataProvider>,
    search: Arc<dyn SearchProvider>,
    settings: AdvisorSettings,
    fingerprint: String,
}

impl AdvisorAgentFactory {
    pub fn new(
        settings: AdvisorSettings,
        provider: Arc<dyn LlmProvider>,
        market: Arc<dyn MarketDataProvider>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        let fingerprint = credential_fingerprint(&[
            settings.gemini_api_key.as_str(),
            settings.exa_api_key.as_str(),
        ]);
        Self {
            provider,
            market,
            search,
            settings,
            fingerprint,
        }
    }

    /// Create the Gemini, Exa and market clients described by `settings`
    pub fn from_settings(settings: AdvisorSettings) -> anyhow::Result<Self> {
        let mut gemini = GeminiConfig::new(&settings.gemini_api_key);
        if let Some(url) = &settings.gemini_base_url {
            gemini.base_url = url.trim_end_matches('/').to_string();
        }
        let provider = Arc::new(GeminiProvider::new(gemini)?);

        let mut exa = ExaConfig::new(&settings.exa_api_key);
        if let Some(url) = &settings.exa_base_url {
            exa.base_url = url.trim_end_matches('/').to_string();
        }
        let search = Arc::new(ExaSearchClient::new(exa)?);

        let market: Arc<dyn MarketDataProvider> = if settings.offline_market {
            tracing::warn!("⚠ Offline market mode - serving demo prices");
            Arc::new(MockMarketData::demo())
        } else {
            Arc::new(YahooMarketData::new())
        };

        Ok(Self::new(settings, provider, market, search))
    }

    /// Provider shared by every agent
    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        self.provider.clone()
    }
}

impl AgentFactory for AdvisorAgentFactory {
    fn credential_fingerprint(&self) -> String {
        self.fingerprint.clone()
    }

    fn build(&self) -> CoreResult<Agent> {
        tracing::debug!(model = %self.settings.model, "Building advisor agent");

        AgentBuilder::new()
            .provider(self.provider.clone())
            .tools(advisor_tools(self.market.clone(), self.search.clone()))
            .system_prompt(system_prompt())
            .disclaimer(DISCLAIMER)
            .model(&self.settings.model)
            .temperature(self.settings.temperature)
            .max_iterations(self.settings.max_iterations)
            .turn_timeout(self.settings.turn_timeout)
            .build()
    }
}
