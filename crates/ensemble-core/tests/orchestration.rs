//! End-to-end orchestration runs against a scripted LLM client.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ensemble_core::{
    AgentDescriptor, AgentKind, Controller, EventBus, OrchestrationConfig, RunEvent, RunSignals,
    RunStatus, StrategyKind, ROUND_LIMIT_MESSAGE,
};
use ensemble_llm::{
    AgentInvocation, AgentReply, ContextSet, LlmClient, Message, RoutingRequest,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ensemble_core=debug")
        .with_test_writer()
        .try_init();
}

/// Plays back pre-scripted replies and records every invocation.
#[derive(Default)]
struct ScriptedClient {
    agent_replies: Mutex<VecDeque<AgentReply>>,
    routing_decisions: Mutex<VecDeque<serde_json::Value>>,
    failing_agents: HashSet<String>,
    form_fails: bool,
    invocations: Mutex<Vec<(String, String, usize)>>,
    routing_calls: AtomicUsize,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn with_agent_reply(self, reply: AgentReply) -> Self {
        self.agent_replies.lock().unwrap().push_back(reply);
        self
    }

    fn with_routing_decision(self, decision: serde_json::Value) -> Self {
        self.routing_decisions.lock().unwrap().push_back(decision);
        self
    }

    fn with_failing_agent(mut self, name: &str) -> Self {
        self.failing_agents.insert(name.to_string());
        self
    }

    fn with_failing_form_synthesis(mut self) -> Self {
        self.form_fails = true;
        self
    }

    fn invocations(&self) -> Vec<(String, String, usize)> {
        self.invocations.lock().unwrap().clone()
    }

    fn agent_call_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    fn routing_call_count(&self) -> usize {
        self.routing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke_agent(&self, request: AgentInvocation) -> ensemble_llm::Result<AgentReply> {
        if self.failing_agents.contains(&request.agent_name) {
            return Err(ensemble_llm::Error::Api("scripted failure".to_string()));
        }
        self.invocations
            .lock()
            .unwrap()
            .push((request.agent_name, request.message, request.history.len()));
        let reply = self
            .agent_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| AgentReply::text("ok"));
        Ok(reply)
    }

    async fn invoke_routing(
        &self,
        _request: RoutingRequest,
    ) -> ensemble_llm::Result<serde_json::Value> {
        self.routing_calls.fetch_add(1, Ordering::SeqCst);
        let decision = self
            .routing_decisions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| serde_json::json!({}));
        Ok(decision)
    }

    async fn synthesize_form(&self, _message: &str) -> ensemble_llm::Result<serde_json::Value> {
        if self.form_fails {
            return Err(ensemble_llm::Error::InvalidResponse(
                "unusable form".to_string(),
            ));
        }
        Ok(serde_json::json!({"fields": [{"name": "region", "type": "text"}]}))
    }
}

fn team_config() -> OrchestrationConfig {
    OrchestrationConfig::new("growth-team", "Prepare the Q3 report")
        .with_agent(
            AgentDescriptor::new("Manager", AgentKind::Manager)
                .with_role_description("You coordinate the team."),
        )
        .with_agent(AgentDescriptor::new("Analyst", AgentKind::Agent))
        .with_agent(AgentDescriptor::new("Researcher", AgentKind::Agent))
}

#[tokio::test]
async fn missing_manager_fails_before_any_invocation() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());
    let config = OrchestrationConfig::new("team", "go")
        .with_agent(AgentDescriptor::new("Analyst", AgentKind::Agent));

    for kind in [StrategyKind::LlmRouted, StrategyKind::ManagerDirected] {
        let result = controller
            .run(kind, config.clone(), Vec::new(), &RunSignals::new())
            .await;

        assert_eq!(result.status, RunStatus::Error);
        assert!(result.error.unwrap().contains("no manager agent"));
    }
    assert_eq!(client.agent_call_count(), 0);
}

#[tokio::test]
async fn round_cap_is_a_graceful_completion() {
    init_tracing();
    // the default manager reply carries no routing signal, so it self-loops
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());
    let config = team_config().with_max_rounds(3);

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            config,
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.error.as_deref(), Some(ROUND_LIMIT_MESSAGE));
    assert_eq!(result.total_rounds, 3);
    assert_eq!(client.agent_call_count(), 3);
}

#[tokio::test]
async fn single_round_cap_with_self_looping_manager() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());
    let config = team_config().with_max_rounds(1);

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            config,
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.total_rounds, 1);
    assert_eq!(result.error.as_deref(), Some(ROUND_LIMIT_MESSAGE));
    assert_eq!(client.agent_call_count(), 1);
}

#[tokio::test]
async fn user_messages_always_route_to_the_manager() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            // even if a later routing call would pick someone else
            .with_routing_decision(serde_json::json!({"workflowComplete": true})),
    );
    let controller = Controller::new(client.clone());

    let result = controller
        .run(
            StrategyKind::LlmRouted,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let invocations = client.invocations();
    assert_eq!(invocations[0].0, "Manager");
    // the user-sourced round decided deterministically, no routing call
    assert_eq!(client.routing_call_count(), 1);
}

#[tokio::test]
async fn roster_mention_short_circuits_routing() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_routing_decision(serde_json::json!({"workflowComplete": true})),
    );
    let controller = Controller::new(client.clone());
    let history = vec![
        Message::user("Prepare the Q3 report"),
        Message::from_agent("Researcher", "Handing off. @Analyst analyze the Q3 numbers"),
    ];

    let result = controller
        .run(
            StrategyKind::LlmRouted,
            team_config(),
            history,
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let invocations = client.invocations();
    assert_eq!(invocations[0].0, "Analyst");
    assert_eq!(invocations[0].1, "analyze the Q3 numbers");
}

#[tokio::test]
async fn cancel_before_start_runs_no_turns() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());
    let signals = RunSignals::new();
    signals.request_cancel();

    let result = controller
        .run(StrategyKind::ManagerDirected, team_config(), Vec::new(), &signals)
        .await;

    assert_eq!(result.status, RunStatus::Cancelled);
    assert_eq!(result.total_rounds, 0);
    assert_eq!(client.agent_call_count(), 0);
}

#[tokio::test]
async fn manager_redirect_appends_a_new_message() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new().with_agent_reply(
        AgentReply::text("Which API key should I use?")
            .with_directives(serde_json::json!({"redirectToUser": true})),
    ));
    let controller = Controller::new(client.clone());

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::AwaitingUser);
    // seeded user message plus the appended (not amended) manager question
    assert_eq!(result.final_conversation_history.len(), 2);
    let last = result.last_assistant_message().unwrap();
    assert_eq!(last.agent_name.as_deref(), Some("Manager"));
    assert_eq!(last.content, "Which API key should I use?");
}

#[tokio::test]
async fn info_request_amends_the_manager_message_and_suspends() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new().with_routing_decision(serde_json::json!({"infoRequest": true})),
    );
    let controller = Controller::new(client.clone());
    let history = vec![
        Message::user("Deploy the service"),
        Message::from_agent("Manager", "I need your deployment region."),
    ];

    let result = controller
        .run(StrategyKind::LlmRouted, team_config(), history, &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::AwaitingUser);
    // the existing manager message was amended in place, nothing appended
    assert_eq!(result.final_conversation_history.len(), 2);
    let last = result.final_conversation_history.last().unwrap();
    assert!(last.content.starts_with("I need your deployment region."));
    assert!(last.content.contains("input form has been attached"));
    assert!(result
        .final_context_sets
        .iter()
        .any(|s| s.set_name == "info-request-round-0"));
}

#[tokio::test]
async fn failed_form_synthesis_degrades_to_a_manager_notice() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_failing_form_synthesis()
            .with_routing_decision(serde_json::json!({"infoRequest": true}))
            .with_routing_decision(serde_json::json!({"workflowComplete": true})),
    );
    let controller = Controller::new(client.clone());
    let history = vec![
        Message::user("Deploy the service"),
        Message::from_agent("Manager", "I need your deployment region."),
    ];

    let result = controller
        .run(StrategyKind::LlmRouted, team_config(), history, &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let invocations = client.invocations();
    assert_eq!(invocations[0].0, "Manager");
    assert!(invocations[0].1.contains("could not be turned into a form"));
}

#[tokio::test]
async fn context_request_replaces_context_wholesale() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_routing_decision(serde_json::json!({
                "contextRequest": true,
                "newContext": [{"setName": "plan", "text": "v2"}],
                "nextAgentName": "Analyst"
            }))
            .with_routing_decision(serde_json::json!({"workflowComplete": true})),
    );
    let controller = Controller::new(client.clone());
    let config = team_config().with_initial_context(vec![
        ContextSet::new("plan", "v1"),
        ContextSet::new("notes", "scratch"),
    ]);
    let history = vec![
        Message::user("Prepare the Q3 report"),
        Message::from_agent("Researcher", "Context is stale, please refresh."),
    ];

    let result = controller
        .run(StrategyKind::LlmRouted, config, history, &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.final_context_sets.len(), 1);
    assert_eq!(result.final_context_sets[0].set_name, "plan");
    assert_eq!(result.final_context_sets[0].text, "v2");
}

#[tokio::test]
async fn unknown_routed_agent_falls_back_to_the_manager() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_routing_decision(serde_json::json!({"nextAgentName": "Ghost"}))
            .with_routing_decision(serde_json::json!({"workflowComplete": true})),
    );
    let controller = Controller::new(client.clone());
    let history = vec![
        Message::user("Prepare the Q3 report"),
        Message::from_agent("Researcher", "Passing along my findings."),
    ];

    let result = controller
        .run(StrategyKind::LlmRouted, team_config(), history, &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(client.invocations()[0].0, "Manager");
}

#[tokio::test]
async fn specialist_failure_becomes_a_notice_to_the_manager() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_failing_agent("Analyst")
            .with_agent_reply(AgentReply::text("@Analyst crunch the numbers"))
            .with_agent_reply(
                AgentReply::text("Understood, wrapping up.")
                    .with_directives(serde_json::json!({"workflowComplete": true})),
            ),
    );
    let controller = Controller::new(client.clone());

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let notice = result
        .final_conversation_history
        .iter()
        .find(|m| m.content.contains("failed to complete its turn"))
        .expect("failure notice present");
    assert!(notice.content.contains("Analyst"));
    // both manager turns ran; the failed specialist turn was recovered
    let invocations = client.invocations();
    assert_eq!(invocations.len(), 2);
    assert!(invocations.iter().all(|(name, _, _)| name == "Manager"));
}

#[tokio::test]
async fn manager_failure_aborts_the_run() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new().with_failing_agent("Manager"));
    let controller = Controller::new(client.clone());

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Error);
    assert!(result.error.unwrap().contains("Manager"));
}

#[tokio::test]
async fn manager_handoff_reaches_the_specialist() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_agent_reply(AgentReply::text("Delegating.").with_directives(
                serde_json::json!({
                    "nextAgentName": "Analyst",
                    "messageForNextAgent": "verify the revenue figures"
                }),
            ))
            .with_agent_reply(AgentReply::text("Figures verified."))
            .with_agent_reply(
                AgentReply::text("All done.")
                    .with_directives(serde_json::json!({"workflowComplete": true})),
            ),
    );
    let controller = Controller::new(client.clone());

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let invocations = client.invocations();
    assert_eq!(invocations[1].0, "Analyst");
    assert_eq!(invocations[1].1, "verify the revenue figures");
    // control returned to the manager after the specialist turn
    assert_eq!(invocations[2].0, "Manager");
}

#[tokio::test]
async fn specialists_are_stateless_while_managers_get_a_window() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_agent_reply(AgentReply::text("Delegating.").with_directives(
                serde_json::json!({
                    "nextAgentName": "Analyst",
                    "messageForNextAgent": "verify the revenue figures"
                }),
            ))
            .with_agent_reply(AgentReply::text("Figures verified."))
            .with_agent_reply(
                AgentReply::text("All done.")
                    .with_directives(serde_json::json!({"workflowComplete": true})),
            ),
    );
    let controller = Controller::new(client.clone());

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let invocations = client.invocations();
    assert_eq!(invocations.len(), 3);
    // manager turns see a bounded window, specialist turns no history
    assert_eq!(invocations[0].0, "Manager");
    assert!(invocations[0].2 > 0);
    assert_eq!(invocations[1].0, "Analyst");
    assert_eq!(invocations[1].2, 0);
    assert_eq!(invocations[2].0, "Manager");
    assert!(invocations[2].2 > 0);
}

#[tokio::test]
async fn llm_routed_history_follows_the_recipient_kind() {
    init_tracing();
    let client = Arc::new(
        ScriptedClient::new()
            .with_routing_decision(serde_json::json!({"nextAgentName": "Analyst"}))
            .with_routing_decision(serde_json::json!({"workflowComplete": true})),
    );
    let controller = Controller::new(client.clone());
    // a long history must reach the manager bounded, not verbatim
    let mut history = vec![Message::user("Prepare the Q3 report")];
    for i in 0..30 {
        history.push(Message::from_agent("Researcher", format!("finding {i}")));
    }
    history.push(Message::user("How is it going?"));

    let result = controller
        .run(
            StrategyKind::LlmRouted,
            team_config(),
            history,
            &RunSignals::new(),
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    let invocations = client.invocations();
    // round 0: user source forces the manager, who gets a bounded window
    assert_eq!(invocations[0].0, "Manager");
    assert!(invocations[0].2 > 0);
    assert!(invocations[0].2 <= 20);
    // round 1: the routed specialist acts statelessly
    assert_eq!(invocations[1].0, "Analyst");
    assert_eq!(invocations[1].2, 0);
}

#[tokio::test]
async fn completing_decision_still_commits_its_context_replacement() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new().with_routing_decision(serde_json::json!({
        "workflowComplete": true,
        "contextRequest": true,
        "newContext": [{"setName": "summary", "text": "final state"}]
    })));
    let controller = Controller::new(client.clone());
    let config = team_config().with_initial_context(vec![ContextSet::new("plan", "v1")]);
    let history = vec![
        Message::user("Prepare the Q3 report"),
        Message::from_agent("Researcher", "Everything is wrapped up."),
    ];

    let result = controller
        .run(StrategyKind::LlmRouted, config, history, &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.error.is_none());
    assert_eq!(result.final_context_sets.len(), 1);
    assert_eq!(result.final_context_sets[0].set_name, "summary");
    assert_eq!(result.final_context_sets[0].text, "final state");
}

#[tokio::test]
async fn direct_mode_runs_one_turn_and_completes() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());
    let config = OrchestrationConfig::new("solo", "Summarize this document")
        .with_agent(AgentDescriptor::new("Summarizer", AgentKind::Agent))
        .with_agent_order(vec!["Summarizer".to_string()]);

    let result = controller
        .run(StrategyKind::Direct, config, Vec::new(), &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.error.is_none());
    assert_eq!(client.agent_call_count(), 1);
    assert_eq!(client.invocations()[0].0, "Summarizer");
}

#[tokio::test]
async fn direct_mode_requires_an_agent_order() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());
    let config = OrchestrationConfig::new("solo", "go")
        .with_agent(AgentDescriptor::new("Summarizer", AgentKind::Agent));

    let result = controller
        .run(StrategyKind::Direct, config, Vec::new(), &RunSignals::new())
        .await;

    assert_eq!(result.status, RunStatus::Error);
    assert!(result.error.unwrap().contains("agent order"));
    assert_eq!(client.agent_call_count(), 0);
}

#[tokio::test]
async fn pause_then_continue_resumes_the_run() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let bus = Arc::new(EventBus::default());
    let controller = Controller::new(client.clone()).with_event_bus(bus.clone());
    let mut events = bus.subscribe();

    let signals = RunSignals::new();
    signals.request_pause();
    let release = signals.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        release.signal_continue();
    });

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config().with_max_rounds(2),
            Vec::new(),
            &signals,
        )
        .await;

    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(result.total_rounds, 2);

    let mut saw_pause = false;
    let mut saw_resume = false;
    while let Ok(event) = events.try_recv() {
        match event {
            RunEvent::RunPaused { .. } => saw_pause = true,
            RunEvent::RunResumed { .. } => saw_resume = true,
            _ => {}
        }
    }
    assert!(saw_pause);
    assert!(saw_resume);
}

#[tokio::test]
async fn cancel_while_paused_wins() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());

    let signals = RunSignals::new();
    signals.request_pause();
    let cancel = signals.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        cancel.request_cancel();
    });

    let result = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &signals,
        )
        .await;

    assert_eq!(result.status, RunStatus::Cancelled);
    assert_eq!(client.agent_call_count(), 0);
}

#[tokio::test]
async fn spawned_runs_are_registered_and_deregistered() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new());
    let controller = Controller::new(client.clone());

    let handle = controller.spawn_run(
        StrategyKind::ManagerDirected,
        team_config().with_max_rounds(1),
        Vec::new(),
    );
    assert!(!controller.cancel_run(uuid::Uuid::new_v4()));

    let result = handle.final_result().await.unwrap();
    assert_eq!(result.status, RunStatus::Completed);
    assert_eq!(controller.active_run_count(), 0);
}

#[tokio::test]
async fn awaiting_user_history_reloads_into_a_follow_up_run() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new().with_agent_reply(
        AgentReply::text("Which region?")
            .with_directives(serde_json::json!({"redirectToUser": true})),
    ));
    let controller = Controller::new(client.clone());

    let suspended = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            Vec::new(),
            &RunSignals::new(),
        )
        .await;
    assert_eq!(suspended.status, RunStatus::AwaitingUser);

    // persist and reload the record, as an external store would
    let json = serde_json::to_string(&suspended).unwrap();
    let reloaded: ensemble_core::OrchestrationFinalResult = serde_json::from_str(&json).unwrap();
    assert_eq!(
        reloaded.final_conversation_history,
        suspended.final_conversation_history
    );

    let mut history = reloaded.final_conversation_history;
    history.push(Message::user("eu-west-1"));

    let client = Arc::new(ScriptedClient::new().with_agent_reply(
        AgentReply::text("Deploying to eu-west-1.")
            .with_directives(serde_json::json!({"workflowComplete": true})),
    ));
    let controller = Controller::new(client.clone());
    let resumed = controller
        .run(
            StrategyKind::ManagerDirected,
            team_config(),
            history,
            &RunSignals::new(),
        )
        .await;

    assert_eq!(resumed.status, RunStatus::Completed);
    assert_eq!(resumed.final_conversation_history.len(), 4);
    assert_eq!(resumed.final_conversation_history[2].content, "eu-west-1");
}
