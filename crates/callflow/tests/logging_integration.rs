//! Integration tests for tracing spans and events
//!
//! These tests run the pipeline under a subscriber to make sure spans and
//! events are emitted without disturbing the results.

use callflow::core::logging::init_logging;
use callflow::plugins::native::{to_json, InputFormat};
use callflow::prelude::*;
use callflow::render;
use tracing_subscriber::util::SubscriberInitExt;

fn input() -> String {
    let user = Container::person("shop", "user");
    let api = Container::system("shop", "api");
    to_json(&[CallRecord::new(1, user, api, "browse", 0).completed(2, 4, "page")]).unwrap()
}

#[test]
fn test_tracing_spans_created_during_pipeline() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let output = render(&input(), "mermaid").unwrap();
    assert!(output.contains("shop.user ->> shop.api : browse()"));
}

#[test]
fn test_recorder_with_tracing() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let recorder = Recorder::new(CallIdGenerator::new());
    let user = Container::person("shop", "user");
    let api = Container::system("shop", "api");
    let page: Result<&str, String> = recorder.traced(&user, &api, "browse", vec![], || Ok("page"));

    assert_eq!(page, Ok("page"));
    assert_eq!(recorder.trace().messages().len(), 2);
}

#[test]
fn test_orchestrator_with_tracing() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let orchestrator = Orchestrator::with_all_plugins();
    let output = orchestrator
        .process(&input(), InputFormat::Calls, "plantuml")
        .unwrap();
    assert!(output.starts_with("@startuml App"));
}
