mod common;

use common::FakeClient;
use pinpoint_lsp::completion::CompletionRequest;
use pinpoint_lsp::pagination::PageRequest;
use pinpoint_lsp::types::Locate;
use pinpoint_lsp::{Capability, EngineError};
use tower_lsp::lsp_types::*;

fn client() -> FakeClient {
    FakeClient::new()
        .with_file("main.py", "shape = Shape()\nshape.\n")
        .with_completions(vec![
            CompletionItem {
                label: "area".to_string(),
                kind: Some(CompletionItemKind::METHOD),
                detail: Some("() -> int".to_string()),
                documentation: Some(Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: "Area of the shape.".to_string(),
                })),
                insert_text: Some("area()".to_string()),
                ..CompletionItem::default()
            },
            CompletionItem {
                label: "name".to_string(),
                kind: Some(CompletionItemKind::FIELD),
                documentation: Some(Documentation::String("Display name".to_string())),
                ..CompletionItem::default()
            },
            CompletionItem {
                label: "zzz".to_string(),
                ..CompletionItem::default()
            },
        ])
}

fn request() -> CompletionRequest {
    CompletionRequest::new(Locate::find("main.py", "shape.<|>\n").unwrap())
}

#[tokio::test]
async fn test_completion_keeps_server_order() {
    let engine = client().engine();
    let page = engine.completion(&request()).await.unwrap().unwrap();

    let labels: Vec<&str> = page.items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, ["area", "name", "zzz"]);

    let area = &page.items[0];
    assert_eq!(area.kind, "Method");
    assert_eq!(area.detail.as_deref(), Some("() -> int"));
    assert_eq!(area.documentation.as_deref(), Some("Area of the shape."));
    assert_eq!(area.insert_text, "area()");

    let name = &page.items[1];
    assert_eq!(name.kind, "Field");
    assert_eq!(name.documentation.as_deref(), Some("Display name"));
    assert_eq!(name.insert_text, "name");

    assert_eq!(page.items[2].kind, "Unknown");
}

#[tokio::test]
async fn test_completion_paginates() {
    let engine = client().engine();
    let first = engine
        .completion(&request().with_page(PageRequest::first(2)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.total, 3);
    assert!(first.has_more);

    let next = PageRequest::first(2).next_after(&first).unwrap();
    let second = engine
        .completion(&request().with_page(next))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].label, "zzz");
    assert!(!second.has_more);
}

#[tokio::test]
async fn test_completion_unlocatable_is_none() {
    let engine = client().engine();
    let req = CompletionRequest::new(Locate::find("main.py", "other.<|>").unwrap());
    assert!(engine.completion(&req).await.unwrap().is_none());
}

#[tokio::test]
async fn test_completion_requires_capability() {
    let engine = client().without(Capability::Completion).engine();
    assert!(matches!(
        engine.completion(&request()).await,
        Err(EngineError::UnsupportedCapability {
            capability: Capability::Completion,
            ..
        })
    ));
}
