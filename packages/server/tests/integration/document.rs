use serde_json::json;

use crate::common::{TestApp, routes};

mod document_crud {
    use super::*;

    #[tokio::test]
    async fn create_starts_at_version_one() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("doc1").await;
        let ws = app.create_workspace(&token, "Docs").await;

        let res = app
            .post_with_token(
                routes::DOCUMENTS,
                &json!({ "title": "D1", "content": "x", "workspace_id": ws }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["version"], 1);
        assert_eq!(res.body["creator"]["username"], "doc1");
        assert!(res.body["last_modifier"].is_null());
    }

    #[tokio::test]
    async fn two_updates_reach_version_three() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("doc2").await;
        let ws = app.create_workspace(&token, "Docs").await;
        let doc = app.create_document(&token, ws, "D1", "x").await;

        let res = app
            .put_with_token(&routes::document(doc), &json!({ "content": "y" }), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["version"], 2);

        let res = app
            .put_with_token(&routes::document(doc), &json!({ "content": "z" }), &token)
            .await;
        assert_eq!(res.body["version"], 3);
        assert_eq!(res.body["content"], "z");
        assert_eq!(res.body["last_modifier"]["username"], "doc2");
    }

    #[tokio::test]
    async fn list_requires_workspace_and_orders_by_update_time() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("doc3").await;
        let ws = app.create_workspace(&token, "Docs").await;
        let d1 = app.create_document(&token, ws, "First", "a").await;
        app.create_document(&token, ws, "Second", "b").await;

        // Touch the older document so it surfaces first.
        app.put_with_token(&routes::document(d1), &json!({ "content": "a2" }), &token)
            .await;

        let res = app
            .get_with_token(&format!("{}?workspace_id={ws}", routes::DOCUMENTS), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "First");
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("doc4").await;
        let ws = app.create_workspace(&token, "Docs").await;
        let doc = app.create_document(&token, ws, "Doomed", "x").await;

        let res = app.delete_with_token(&routes::document(doc), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::document(doc), &token).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn other_user_gets_not_found() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("doc5").await;
        let token_b = app.create_authenticated_user("doc6").await;
        let ws = app.create_workspace(&token_a, "Docs").await;
        let doc = app.create_document(&token_a, ws, "Private", "secret").await;

        let res = app.get_with_token(&routes::document(doc), &token_b).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");

        let res = app
            .put_with_token(&routes::document(doc), &json!({ "content": "own" }), &token_b)
            .await;
        assert_eq!(res.status, 404);

        // No version was burned by the rejected update.
        let res = app.get_with_token(&routes::document(doc), &token_a).await;
        assert_eq!(res.body["version"], 1);
    }
}

mod document_search {
    use super::*;

    #[tokio::test]
    async fn matches_title_or_content_case_insensitively() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("searcher1").await;
        let ws = app.create_workspace(&token, "Docs").await;
        app.create_document(&token, ws, "Meeting Notes", "agenda items").await;
        app.create_document(&token, ws, "Roadmap", "the NEEDLE is here").await;
        app.create_document(&token, ws, "Unrelated", "nothing").await;

        let res = app
            .get_with_token(&routes::document_search("needle", ws), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Roadmap");

        let res = app
            .get_with_token(&routes::document_search("meeting", ws), &token)
            .await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn escapes_like_wildcards() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("searcher2").await;
        let ws = app.create_workspace(&token, "Docs").await;
        app.create_document(&token, ws, "abc", "plain").await;
        app.create_document(&token, ws, "a_c", "wildcard").await;

        // An underscore in the term is a literal, not a single-char wildcard.
        let res = app
            .get_with_token(&routes::document_search("a_c", ws), &token)
            .await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "a_c");
    }

    #[tokio::test]
    async fn scoped_to_the_given_workspace() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("searcher3").await;
        let ws1 = app.create_workspace(&token, "One").await;
        let ws2 = app.create_workspace(&token, "Two").await;
        app.create_document(&token, ws1, "shared term", "x").await;
        app.create_document(&token, ws2, "shared term", "x").await;

        let res = app
            .get_with_token(&routes::document_search("shared", ws1), &token)
            .await;

        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }
}

mod optimistic_locking {
    use super::*;

    #[tokio::test]
    async fn disabled_by_default_last_writer_wins() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("lock1").await;
        let ws = app.create_workspace(&token, "Docs").await;
        let doc = app.create_document(&token, ws, "D", "x").await;

        // A stale expected_version is ignored when the mode is off.
        let res = app
            .put_with_token(
                &routes::document(doc),
                &json!({ "content": "y", "expected_version": 99 }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["version"], 2);
    }

    #[tokio::test]
    async fn enabled_mode_conflicts_on_stale_version() {
        let app = TestApp::spawn_with(|c| c.documents.optimistic_locking = true).await;
        let token = app.create_authenticated_user("lock2").await;
        let ws = app.create_workspace(&token, "Docs").await;
        let doc = app.create_document(&token, ws, "D", "x").await;

        let res = app
            .put_with_token(
                &routes::document(doc),
                &json!({ "content": "y", "expected_version": 2 }),
                &token,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");

        let res = app
            .put_with_token(
                &routes::document(doc),
                &json!({ "content": "y", "expected_version": 1 }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["version"], 2);
    }
}
