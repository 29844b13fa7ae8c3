//! End-to-end gateway behavior against scripted subordinate servers.

#![cfg(unix)]

mod common;

use std::time::Duration;

use common::{
    INIT_OK, crash_script, echo_script, fast_config, forking_hang_script, gateway,
    init_hang_script, is_running, request_hang_script, responder, script_server, test_env,
};
use dcl_core::{GatewayError, NO_CONTENT_SENTINEL, Registry};
use serde_json::{Map, json};

fn echo_registry() -> Registry {
    Registry::new().with_server(script_server("echo", "test echo server", &echo_script()))
}

#[tokio::test]
async fn test_catalog_lists_echo_without_spawning() {
    let (gateway, launcher) = gateway(echo_registry(), test_env(), fast_config());

    let catalog = gateway.list_catalog();
    assert!(catalog.starts_with("Available MCP Servers:\n\n"));
    assert!(catalog.contains("[MCP] echo\n      test echo server\n"));
    assert!(catalog.ends_with("load_mcp_tools(mcp_name='server_name')"));
    assert_eq!(launcher.spawn_count(), 0);
}

#[tokio::test]
async fn test_load_echo_lists_ping() {
    let (gateway, launcher) = gateway(echo_registry(), test_env(), fast_config());

    let listing = gateway.load_server("echo").await;
    assert!(listing.starts_with("[OK] Tools from echo:"), "{listing}");
    assert!(listing.contains("[TOOL] ping"));
    assert!(listing.contains("replies pong"));
    assert!(listing.contains("call_mcp_tool(mcp_name='echo'"));

    assert_eq!(launcher.spawn_count(), 1);
    launcher.assert_no_survivors();
}

#[tokio::test]
async fn test_invoke_echo_ping_returns_pong() {
    let (gateway, launcher) = gateway(echo_registry(), test_env(), fast_config());

    let output = gateway.invoke_operation("echo", "ping", None).await;
    assert_eq!(output, "pong");

    let again = gateway
        .invoke_operation("echo", "ping", Some(Map::new()))
        .await;
    assert_eq!(again, "pong");

    // One fresh subordinate per call, none left behind
    assert_eq!(launcher.spawn_count(), 2);
    launcher.assert_no_survivors();
}

#[tokio::test]
async fn test_unknown_server_lists_known_names_without_spawning() {
    let registry = echo_registry().with_server(script_server("other", "second", "exit 0"));
    let (gateway, launcher) = gateway(registry, test_env(), fast_config());

    let output = gateway.load_server("nope").await;
    assert_eq!(
        output,
        "[ERROR] Unknown MCP server: nope\n\nAvailable servers: echo, other"
    );
    let err = gateway.try_invoke_operation("nope", "x", None).await.unwrap_err();
    assert_eq!(err.kind(), "UnknownServer");
    assert_eq!(launcher.spawn_count(), 0);
}

#[tokio::test]
async fn test_missing_credentials_block_spawn() {
    let registry = Registry::new()
        .with_server(script_server("svc", "needs a token", &echo_script()).with_env("TOKEN", ""))
        .with_required("svc", ["TOKEN"]);
    let (gateway, launcher) = gateway(registry, test_env(), fast_config());

    let err = gateway
        .try_invoke_operation("svc", "ping", None)
        .await
        .unwrap_err();
    match err {
        GatewayError::MissingCredentials { name, missing } => {
            assert_eq!(name, "svc");
            assert_eq!(missing, vec!["TOKEN"]);
        }
        other => panic!("expected MissingCredentials, got {other:?}"),
    }

    let catalog = gateway.list_catalog();
    assert!(catalog.contains("⚠️  Missing env vars: TOKEN"));
    let text = gateway.invoke_operation("svc", "ping", None).await;
    assert!(text.starts_with("[ERROR] Cannot use svc: Missing required environment variables: TOKEN"));

    assert_eq!(launcher.spawn_count(), 0);
}

#[tokio::test]
async fn test_credentials_present_allows_spawn() {
    let registry = Registry::new()
        .with_server(script_server("svc", "needs a token", &echo_script()))
        .with_required("svc", ["TOKEN"]);
    let (gateway, launcher) = gateway(registry, test_env().with_var("TOKEN", "t0k"), fast_config());

    assert_eq!(gateway.invoke_operation("svc", "ping", None).await, "pong");
    assert_eq!(launcher.spawn_count(), 1);
}

#[tokio::test]
async fn test_handshake_hang_is_init_timeout() {
    let registry = Registry::new().with_server(script_server("slow", "hangs", &init_hang_script()));
    let config = fast_config().with_init_timeout(Duration::from_millis(500));
    let (gateway, launcher) = gateway(registry, test_env(), config);

    let err = gateway.try_load_server("slow").await.unwrap_err();
    assert!(matches!(err, GatewayError::InitTimeout { .. }), "{err:?}");

    launcher.assert_no_survivors();
}

#[tokio::test]
async fn test_handshake_hang_stops_processes_the_subordinate_started() {
    let pid_file = tempfile::NamedTempFile::new().unwrap();
    let script = forking_hang_script(pid_file.path());
    let registry = Registry::new().with_server(script_server("npxlike", "forks", &script));
    let config = fast_config().with_init_timeout(Duration::from_millis(500));
    let (gateway, launcher) = gateway(registry, test_env(), config);

    let text = gateway.load_server("npxlike").await;
    assert_eq!(
        text,
        "[ERROR] Timeout connecting to npxlike (exceeded 500ms initialization timeout)"
    );

    let background: u32 = std::fs::read_to_string(pid_file.path())
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    launcher.assert_no_survivors();
    assert!(!is_running(background), "background pid {background} outlived the session");
}

#[tokio::test]
async fn test_request_hang_is_operation_timeout() {
    let registry =
        Registry::new().with_server(script_server("stuck", "hangs later", &request_hang_script()));
    let config = fast_config().with_operation_timeout(Duration::from_millis(500));
    let (gateway, launcher) = gateway(registry, test_env(), config);

    let err = gateway
        .try_invoke_operation("stuck", "anything", None)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::OperationTimeout { .. }), "{err:?}");

    let text = gateway.load_server("stuck").await;
    assert!(text.contains("operation timeout"), "{text}");

    assert_eq!(launcher.spawn_count(), 2);
    launcher.assert_no_survivors();
}

#[tokio::test]
async fn test_crash_is_subordinate_error_with_stderr() {
    let registry = Registry::new().with_server(script_server("crashy", "dies", &crash_script()));
    let (gateway, launcher) = gateway(registry, test_env(), fast_config());

    let err = gateway
        .try_invoke_operation("crashy", "go", None)
        .await
        .unwrap_err();
    let GatewayError::Subordinate { trace, .. } = &err else {
        panic!("expected Subordinate, got {err:?}");
    };
    assert!(trace.contains("fatal: upstream exploded"), "{trace}");

    let text = gateway.invoke_operation("crashy", "go", None).await;
    assert!(text.starts_with("[ERROR] Error calling go on crashy:"), "{text}");
    assert!(text.contains("Diagnostic trace:"));

    launcher.assert_no_survivors();
}

#[tokio::test]
async fn test_unresolvable_command_is_subordinate_error() {
    let registry = Registry::new().with_server(dcl_core::ServerDescriptor::new(
        "ghost",
        "no-such-mcp-binary-anywhere",
        "missing",
    ));
    let (gateway, launcher) = gateway(registry, test_env(), fast_config());

    let text = gateway.load_server("ghost").await;
    assert!(text.starts_with("[ERROR] Error connecting to ghost:"), "{text}");
    assert!(text.contains("no-such-mcp-binary-anywhere"));
    assert!(launcher.pids().is_empty());
}

#[tokio::test]
async fn test_banner_noise_before_handshake_is_ignored() {
    let script = format!("printf 'npx: installed 1 package\\n'; {}", echo_script());
    let registry = Registry::new().with_server(script_server("noisy", "chatty", &script));
    let (gateway, _launcher) = gateway(registry, test_env(), fast_config());

    assert_eq!(gateway.invoke_operation("noisy", "ping", None).await, "pong");
}

#[tokio::test]
async fn test_empty_result_becomes_sentinel() {
    let empty = r#"{"jsonrpc":"2.0","id":2,"result":{"content":[]}}"#;
    let registry = Registry::new().with_server(script_server(
        "quiet",
        "says nothing",
        &responder(r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}"#, empty),
    ));
    let (gateway, _launcher) = gateway(registry, test_env(), fast_config());

    assert_eq!(
        gateway.invoke_operation("quiet", "noop", None).await,
        NO_CONTENT_SENTINEL
    );
    let listing = gateway.load_server("quiet").await;
    assert!(listing.contains("No tools available from this server."));
}

#[tokio::test]
async fn test_structured_only_result_renders_labeled_block() {
    let reply = r#"{"jsonrpc":"2.0","id":2,"result":{"content":[],"structuredContent":{"k":1}}}"#;
    let registry = Registry::new().with_server(script_server(
        "data",
        "structured",
        &responder(ECHO_TOOLS_EMPTY, reply),
    ));
    let (gateway, _launcher) = gateway(registry, test_env(), fast_config());

    let expected = format!(
        "\nStructured content: {}",
        serde_json::to_string_pretty(&json!({"k": 1})).unwrap()
    );
    assert_eq!(gateway.invoke_operation("data", "get", None).await, expected);
}

const ECHO_TOOLS_EMPTY: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}"#;

#[tokio::test]
async fn test_tool_error_text_is_passed_through() {
    let reply = r#"{"jsonrpc":"2.0","id":2,"result":{"content":[{"type":"text","text":"bad input"}],"isError":true}}"#;
    let registry = Registry::new().with_server(script_server(
        "picky",
        "rejects",
        &responder(ECHO_TOOLS_EMPTY, reply),
    ));
    let (gateway, _launcher) = gateway(registry, test_env(), fast_config());

    let result = gateway
        .try_invoke_operation("picky", "x", None)
        .await
        .unwrap();
    assert!(result.is_error);
    assert_eq!(result.render(), "bad input");
}

#[tokio::test]
async fn test_concurrent_calls_each_get_their_own_subordinate() {
    let (gateway, launcher) = gateway(echo_registry(), test_env(), fast_config());

    let (a, b, c) = tokio::join!(
        gateway.invoke_operation("echo", "ping", None),
        gateway.load_server("echo"),
        gateway.invoke_operation("echo", "ping", None),
    );
    assert_eq!(a, "pong");
    assert!(b.contains("[TOOL] ping"));
    assert_eq!(c, "pong");

    assert_eq!(launcher.spawn_count(), 3);
    launcher.assert_no_survivors();
}

#[tokio::test]
async fn test_subordinate_ping_is_answered_mid_request() {
    // The subordinate only replies once its own ping has been answered
    let script = format!(
        "read _; printf '%s\\n' '{INIT_OK}'; read _; read _; \
         printf '%s\\n' '{{\"jsonrpc\":\"2.0\",\"id\":\"srv-1\",\"method\":\"ping\"}}'; \
         read pong; \
         case \"$pong\" in *srv-1*) printf '%s\\n' '{}';; esac; read _",
        common::ECHO_PONG
    );
    let registry = Registry::new().with_server(script_server("pinger", "pings back", &script));
    let (gateway, _launcher) = gateway(registry, test_env(), fast_config());

    assert_eq!(gateway.invoke_operation("pinger", "ping", None).await, "pong");
}
