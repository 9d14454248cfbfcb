use corral_panes::{DiscoveryConfig, PaneQuery, discover_agents, find_pane};
use corral_testing::{FakeMux, LogFixture, pane};

const WEB_ID: &str = "0b6e4c52-7a51-4d3e-9c1f-5d2a8e9f0a11";
const DOCS_ID: &str = "5f0d9c3b-2e1a-4b7c-8d6e-1a2b3c4d5e6f";

fn config(logs: &LogFixture) -> DiscoveryConfig {
    DiscoveryConfig {
        log_dir: logs.dir().to_path_buf(),
        ..DiscoveryConfig::default()
    }
}

fn fleet() -> FakeMux {
    FakeMux::new()
        .with_pane(pane("zsh", "main", "/home/dev"))
        .with_pane(pane("api — claude", "work", "/src/api"))
        .with_pane(pane("", &format!("claude-{}", WEB_ID), "/src/web"))
        .with_pane(pane("", &format!("gemini-{}", DOCS_ID), "/src/docs"))
}

#[tokio::test]
async fn test_discovers_log_and_session_agents() {
    let logs = LogFixture::new();
    let api_log = logs.write("claude_corral_api.log", "").unwrap();
    let web_log = logs
        .write(&format!("claude_corral_{}.log", WEB_ID), "")
        .unwrap();
    let mux = fleet();

    let agents = discover_agents(&mux, &config(&logs)).await;

    let summary: Vec<_> = agents
        .iter()
        .map(|a| (a.identity.name.as_str(), a.key(), a.pane.session_name.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("api", "claude:api".to_string(), "work".to_string()),
            ("docs", DOCS_ID.to_string(), format!("gemini-{}", DOCS_ID)),
            ("web", WEB_ID.to_string(), format!("claude-{}", WEB_ID)),
        ]
    );

    assert_eq!(agents[0].log_path, api_log);
    assert_eq!(agents[2].log_path, web_log);
    // Pane-only sessions get the log path they would be piped to.
    assert_eq!(
        agents[1].log_path,
        logs.path(&format!("gemini_corral_{}.log", DOCS_ID))
    );
}

#[tokio::test]
async fn test_stale_logs_are_collected() {
    let logs = LogFixture::new();
    let stale = logs.write("claude_corral_billing.log", "old output\n").unwrap();
    let stale_uuid = logs
        .write("claude_corral_99999999-0000-4000-8000-000000000000.log", "")
        .unwrap();
    let unrelated = logs.write("notes.log", "keep me").unwrap();

    let agents = discover_agents(&fleet(), &config(&logs)).await;

    assert_eq!(agents.len(), 2);
    assert!(!stale.exists());
    assert!(!stale_uuid.exists());
    assert!(unrelated.exists());
}

#[tokio::test]
async fn test_failed_pane_query_collects_nothing() {
    let logs = LogFixture::new();
    let log = logs.write("claude_corral_api.log", "").unwrap();
    let mux = fleet();
    mux.fail_list_panes(true);

    let agents = discover_agents(&mux, &config(&logs)).await;

    assert!(agents.is_empty());
    assert!(log.exists());
}

#[tokio::test]
async fn test_collection_can_be_disabled() {
    let logs = LogFixture::new();
    let stale = logs.write("claude_corral_billing.log", "").unwrap();
    let config = DiscoveryConfig {
        collect_stale: false,
        ..config(&logs)
    };

    discover_agents(&FakeMux::new(), &config).await;
    assert!(stale.exists());
}

#[tokio::test]
async fn test_find_pane_against_live_mux() {
    let mux = FakeMux::new()
        .with_pane(pane("my-agent", "main", "/work/my-agent"))
        .with_pane(pane("", &format!("claude-{}", WEB_ID), "/work/other"));

    let by_id = find_pane(&mux, &PaneQuery::named("my-agent").with_session_id(WEB_ID))
        .await
        .unwrap();
    assert_eq!(by_id.session_name, format!("claude-{}", WEB_ID));

    let by_name = find_pane(&mux, &PaneQuery::named("my_agent")).await.unwrap();
    assert_eq!(by_name.session_name, "main");

    mux.fail_list_panes(true);
    assert_eq!(find_pane(&mux, &PaneQuery::named("my-agent")).await, None);
}

#[tokio::test]
async fn test_one_agent_per_pane() {
    let logs = LogFixture::new();
    let legacy = logs.write("claude_corral_api.log", "before restart\n").unwrap();
    let mux = FakeMux::new().with_pane(pane(
        "api — claude",
        &format!("claude-{}", WEB_ID),
        "/src/api",
    ));

    let agents = discover_agents(&mux, &config(&logs)).await;

    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].key(), WEB_ID);
    assert_eq!(agents[0].identity.name, "api");
    assert_eq!(
        agents[0].log_path,
        logs.path(&format!("claude_corral_{}.log", WEB_ID))
    );
    assert!(!legacy.exists());
}

#[tokio::test]
async fn test_uuid_log_and_session_are_one_agent() {
    let logs = LogFixture::new();
    let log = logs
        .write(&format!("claude_corral_{}.log", WEB_ID), "")
        .unwrap();
    let mux = FakeMux::new().with_pane(pane("", &format!("claude-{}", WEB_ID), "/src/web"));

    let agents = discover_agents(&mux, &config(&logs)).await;

    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].log_path, log);
}
