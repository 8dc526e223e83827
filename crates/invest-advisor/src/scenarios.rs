//! Whole-dialogue scenarios: a scripted model drives real sessions and the
//! real advisor tools over mock market and search data.

use std::sync::Arc;

use agent_core::{
    mock::ScriptedProvider,
    reasoning::credential_fingerprint,
    Agent, AgentBuilder, AgentFactory, DialoguePhase, Result as CoreResult, Role, Session,
    ToolCall,
};
use serde_json::json;

use crate::market::MockMarketData;
use crate::model::SearchHit;
use crate::prompt::{system_prompt, DISCLAIMER};
use crate::search::StaticSearch;

struct ScriptedAdvisor {
    provider: Arc<ScriptedProvider>,
    market: Arc<MockMarketData>,
    search: Arc<StaticSearch>,
}

impl ScriptedAdvisor {
    fn new(provider: ScriptedProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            market: Arc::new(MockMarketData::demo().unreachable("ZZZZ123")),
            search: Arc::new(StaticSearch::new(vec![SearchHit {
                title: "Indonesia economic outlook".into(),
                url: "https://news.example/outlook".into(),
                text: "Bank Indonesia holds rates; inflation within target.".into(),
                published_date: Some("2025-06-01".into()),
            }])),
        }
    }
}

impl AgentFactory for ScriptedAdvisor {
    fn credential_fingerprint(&self) -> String {
        credential_fingerprint(&["gemini-test", "exa-test"])
    }

    fn build(&self) -> CoreResult<Agent> {
        AgentBuilder::new()
            .provider(self.provider.clone())
            .tools(crate::advisor_tools(self.market.clone(), self.search.clone()))
            .system_prompt(system_prompt())
            .disclaimer(DISCLAIMER)
            .build()
    }
}

fn recommendation(with_disclaimer: bool) -> String {
    let mut text = String::from(
        "**Your Profile Summary:** 30 years old, income Rp 10-20 million per month, \
         retirement fund in 25 years, moderate risk.\n\n\
         **Asset Allocation Recommendation:** 50% Stocks, 30% Fixed Income Funds, \
         10% Gold, 10% Crypto.\n\n\
         **Specific Instrument Examples:** Stocks: BBCA.JK, TLKM.JK; Gold: Antam; \
         Crypto: BTC-USD (currently $65,000.50).\n\n\
         **Rationale:** a long horizon allows a larger equity share.",
    );
    if with_disclaimer {
        text.push_str("\n\n");
        text.push_str(DISCLAIMER);
    }
    text
}

#[tokio::test]
async fn test_profile_then_recommendation() {
    let research = vec![
        ToolCall::new("search_the_web").with_argument("query", "Indonesia economic outlook"),
        ToolCall::new("get_stock_price").with_argument("ticker_symbol", "BBCA.JK"),
        ToolCall::new("get_crypto_price").with_argument("crypto_symbol", "BTC-USD"),
        ToolCall::new("get_gold_price"),
    ];
    let provider = ScriptedProvider::new()
        .then_reply("Nice to meet you! What is your approximate monthly income?")
        .then_reply("Thanks. What is your main investment goal and your time horizon?")
        .then_reply("How would you describe your risk tolerance: conservative, moderate or aggressive?")
        .then_calls(research)
        .then_reply(recommendation(true));
    let advisor = ScriptedAdvisor::new(provider);
    let mut session = Session::new();

    let answers = ["I'm 30", "10-20 million", "Retirement in 25 years", "Moderate"];
    let mut last = None;
    for (i, answer) in answers.iter().enumerate() {
        let turn = session.submit(&advisor, answer).await.unwrap();
        if i < 3 {
            assert!(!turn.allocation_detected);
            assert!(turn.tool_trace.is_empty());
            assert_eq!(session.phase(), DialoguePhase::CollectingProfile);
        }
        last = Some(turn);
    }

    let turn = last.unwrap();
    assert_eq!(turn.tool_trace.len(), 4);
    assert!(turn.tool_trace.iter().all(|t| t.success));
    assert!(turn.allocation_detected);
    assert!(turn.reply.contains("50% Stocks"));
    assert!(turn.reply.contains("BBCA.JK"));
    assert!(turn.reply.contains("Crypto"));
    assert!(turn.reply.ends_with(DISCLAIMER));
    assert!(!turn.disclaimer_appended);
    assert_eq!(session.phase(), DialoguePhase::Disclaimed);

    // history alternates and holds one assistant reply per answer
    assert_eq!(session.message_count(), 8);
    for (i, message) in session.history().iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(message.role, expected);
    }

    // the final model call saw the tool output, in call order
    let requests = advisor.provider.requests();
    let final_request = requests.last().unwrap();
    let tool_messages: Vec<_> = final_request
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 4);
    assert_eq!(tool_messages[0].tool_name(), Some("search_the_web"));
    assert!(tool_messages[2].content.contains("$65,000.50"));
    assert!(tool_messages[3].content.contains("GLD"));
    assert_eq!(advisor.search.queries(), vec!["Indonesia economic outlook".to_string()]);
    assert_eq!(advisor.provider.remaining(), 0);
}

#[tokio::test]
async fn test_defers_before_profile_is_complete() {
    let provider = ScriptedProvider::new()
        .then_reply("I'd love to help! Before recommending anything, how old are you?");
    let advisor = ScriptedAdvisor::new(provider);
    let mut session = Session::new();

    let turn = session
        .submit(&advisor, "Just tell me what to buy")
        .await
        .unwrap();

    assert!(!turn.allocation_detected);
    assert!(turn.tool_trace.is_empty());
    assert!(!turn.reply.contains(DISCLAIMER));
    assert_eq!(session.phase(), DialoguePhase::CollectingProfile);
}

#[tokio::test]
async fn test_unreachable_ticker_degrades_gracefully() {
    let provider = ScriptedProvider::new()
        .then_call("get_stock_price", json!({"ticker_symbol": "ZZZZ123"}))
        .then_reply("I could not retrieve data for ZZZZ123 right now. Shall we look at BBCA.JK instead?");
    let advisor = ScriptedAdvisor::new(provider);
    let mut session = Session::new();

    let turn = session.submit(&advisor, "What about ZZZZ123?").await.unwrap();

    assert_eq!(turn.tool_trace.len(), 1);
    assert!(!turn.tool_trace[0].success);
    assert!(turn.tool_trace[0].output.starts_with("Error: failed to fetch stock data:"));
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.phase(), DialoguePhase::Researching);
}

#[tokio::test]
async fn test_missing_disclaimer_is_appended() {
    let provider = ScriptedProvider::new()
        .then_reply(recommendation(false))
        .then_reply("Gold hedges against Rupiah depreciation.");
    let advisor = ScriptedAdvisor::new(provider);
    let mut session = Session::new();

    let turn = session.submit(&advisor, "Moderate").await.unwrap();
    assert!(turn.disclaimer_appended);
    assert!(session.history()[1].content.ends_with(DISCLAIMER));
    assert_eq!(session.phase(), DialoguePhase::Disclaimed);

    session.submit(&advisor, "Why gold?").await.unwrap();
    assert_eq!(session.phase(), DialoguePhase::FollowUp);
}

#[tokio::test]
async fn test_unknown_tool_is_reported_to_model() {
    let provider = ScriptedProvider::new()
        .then_call("get_bond_yield", json!({"country": "ID"}))
        .then_reply("I don't have bond data; let's continue with your profile. How old are you?");
    let advisor = ScriptedAdvisor::new(provider);
    let mut session = Session::new();

    let turn = session.submit(&advisor, "What are bond yields?").await.unwrap();
    assert!(!turn.tool_trace[0].success);
    assert!(turn.tool_trace[0].output.starts_with("Error:"));
}

#[tokio::test]
async fn test_reset_starts_over() {
    let provider = ScriptedProvider::new()
        .then_reply("How old are you?")
        .then_reply("Welcome back! How old are you?");
    let advisor = ScriptedAdvisor::new(provider);
    let mut session = Session::new();
    let id = session.id.clone();

    session.submit(&advisor, "Hi").await.unwrap();
    session.reset();
    assert_eq!(session.message_count(), 0);
    assert!(!session.has_agent());

    session.submit(&advisor, "Hi again").await.unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.agent_builds(), 1);
}
