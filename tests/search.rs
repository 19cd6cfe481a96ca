mod common;

use std::path::PathBuf;

use common::{FakeClient, info, range};
use pinpoint_lsp::pagination::PageRequest;
use pinpoint_lsp::search::SearchRequest;
use pinpoint_lsp::{Capability, EngineError};
use tower_lsp::lsp_types::*;

fn client() -> FakeClient {
    let mut handler = info("Handler", SymbolKind::CLASS, "web/b.py", range(3, 0, 20, 0));
    handler.container_name = Some("web".to_string());

    FakeClient::new().with_workspace_symbols(vec![
        info("handle", SymbolKind::FUNCTION, "web/b.py", range(30, 0, 32, 0)),
        handler,
        info("Handler", SymbolKind::CLASS, "web/a.py", range(10, 0, 12, 0)),
        info("handle", SymbolKind::METHOD, "web/a.py", range(11, 4, 12, 0)),
        info("unrelated", SymbolKind::VARIABLE, "web/a.py", range(0, 0, 0, 9)),
    ])
}

#[tokio::test]
async fn test_search_sorted_by_name_then_uri() {
    let engine = client().engine();
    let page = engine.search(&SearchRequest::new("andle")).await.unwrap().unwrap();

    let found: Vec<(String, PathBuf)> = page
        .items
        .iter()
        .map(|item| (item.name.clone(), item.file_path.clone()))
        .collect();
    assert_eq!(
        found,
        [
            ("Handler".to_string(), PathBuf::from("web/a.py")),
            ("Handler".to_string(), PathBuf::from("web/b.py")),
            ("handle".to_string(), PathBuf::from("web/a.py")),
            ("handle".to_string(), PathBuf::from("web/b.py")),
        ]
    );

    let handler = &page.items[1];
    assert_eq!(handler.kind, "Class");
    assert_eq!(handler.line, 4);
    assert_eq!(handler.container.as_deref(), Some("web"));
}

#[tokio::test]
async fn test_search_filters_by_kind() {
    let engine = client().engine();
    let req = SearchRequest::new("andle").with_kinds([SymbolKind::METHOD, SymbolKind::FUNCTION]);
    let page = engine.search(&req).await.unwrap().unwrap();

    let kinds: Vec<&str> = page.items.iter().map(|item| item.kind.as_str()).collect();
    assert_eq!(kinds, ["Method", "Function"]);
}

#[tokio::test]
async fn test_search_paginates() {
    let engine = client().engine();
    let req = SearchRequest::new("").with_page(PageRequest::first(2));

    let first = engine.search(&req).await.unwrap().unwrap();
    assert_eq!(first.total, 5);
    assert!(first.has_more);

    let mut names: Vec<String> = first.items.iter().map(|item| item.name.clone()).collect();
    let mut page_req = req.page.next_after(&first);
    while let Some(next) = page_req {
        let page = engine
            .search(&SearchRequest::new("").with_page(next.clone()))
            .await
            .unwrap()
            .unwrap();
        names.extend(page.items.iter().map(|item| item.name.clone()));
        page_req = next.next_after(&page);
    }

    assert_eq!(names, ["Handler", "Handler", "handle", "handle", "unrelated"]);
}

#[tokio::test]
async fn test_search_requires_workspace_symbols() {
    let engine = client().without(Capability::WorkspaceSymbol).engine();
    assert!(matches!(
        engine.search(&SearchRequest::new("x")).await,
        Err(EngineError::UnsupportedCapability {
            capability: Capability::WorkspaceSymbol,
            ..
        })
    ));
}
