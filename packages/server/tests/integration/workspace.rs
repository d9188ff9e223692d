use serde_json::json;

use crate::common::{TestApp, routes};

mod workspace_crud {
    use super::*;

    #[tokio::test]
    async fn create_applies_defaults() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("owner1").await;

        let res = app
            .post_with_token(routes::WORKSPACES, &json!({ "name": "Research" }), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Research");
        assert_eq!(res.body["color"], "#1A6ED8");
        assert_eq!(res.body["is_active"], true);
        assert_eq!(res.body["owner"]["username"], "owner1");
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("owner2").await;

        let res = app
            .post_with_token(routes::WORKSPACES, &json!({ "name": "   " }), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn list_returns_only_owned_workspaces() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("lister_a").await;
        let token_b = app.create_authenticated_user("lister_b").await;
        app.create_workspace(&token_a, "A1").await;
        app.create_workspace(&token_a, "A2").await;
        app.create_workspace(&token_b, "B1").await;

        let res = app.get_with_token(routes::WORKSPACES, &token_a).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        // Descending creation order.
        assert_eq!(items[0]["name"], "A2");
        assert_eq!(items[1]["name"], "A1");
    }

    #[tokio::test]
    async fn list_includes_task_summaries() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("lister_c").await;
        let ws = app.create_workspace(&token, "With tasks").await;
        app.create_task(&token, ws, "T1").await;
        app.create_task(&token, ws, "T2").await;

        let res = app.get_with_token(routes::WORKSPACES, &token).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items[0]["tasks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_includes_nested_tasks_and_files() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("owner3").await;
        let ws = app.create_workspace(&token, "Detail").await;
        app.create_task(&token, ws, "T1").await;
        app.upload_file("notes.txt", b"hello".to_vec(), Some(ws), None, &token)
            .await;

        let res = app.get_with_token(&routes::workspace(ws), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["files"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["tasks"][0]["creator"]["username"], "owner3");
        assert_eq!(res.body["files"][0]["uploader"]["username"], "owner3");
    }

    #[tokio::test]
    async fn update_patches_fields() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("owner4").await;
        let ws = app.create_workspace(&token, "Before").await;

        let res = app
            .put_with_token(
                &routes::workspace(ws),
                &json!({ "name": "After", "color": "#FF0000", "is_active": false }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "After");
        assert_eq!(res.body["color"], "#FF0000");
        assert_eq!(res.body["is_active"], false);
    }
}

mod workspace_delete_guard {
    use super::*;

    #[tokio::test]
    async fn delete_empty_workspace_succeeds() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("deleter1").await;
        let ws = app.create_workspace(&token, "Empty").await;

        let res = app.delete_with_token(&routes::workspace(ws), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::workspace(ws), &token).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn delete_with_tasks_conflicts_and_preserves_workspace() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("deleter2").await;
        let ws = app.create_workspace(&token, "Busy").await;
        app.create_task(&token, ws, "Blocker").await;

        let res = app.delete_with_token(&routes::workspace(ws), &token).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");

        let res = app.get_with_token(&routes::workspace(ws), &token).await;
        assert_eq!(res.status, 200);
    }
}

mod ownership_isolation {
    use super::*;

    #[tokio::test]
    async fn other_user_cannot_see_or_mutate_workspace() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("iso_a").await;
        let token_b = app.create_authenticated_user("iso_b").await;
        let ws = app.create_workspace(&token_a, "Private").await;

        let res = app.get_with_token(&routes::workspace(ws), &token_b).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");

        let res = app
            .put_with_token(&routes::workspace(ws), &json!({ "name": "Stolen" }), &token_b)
            .await;
        assert_eq!(res.status, 404);

        let res = app.delete_with_token(&routes::workspace(ws), &token_b).await;
        assert_eq!(res.status, 404);
    }
}

mod stats {
    use super::*;

    #[tokio::test]
    async fn computes_counts_and_completion_rate() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("stats1").await;
        let ws = app.create_workspace(&token, "Stats").await;

        app.create_task(&token, ws, "Open task").await;
        let t2 = app.create_task(&token, ws, "In progress").await;
        let t3 = app.create_task(&token, ws, "Done").await;
        app.put_with_token(&routes::task(t2), &json!({ "status": "in_progress" }), &token)
            .await;
        app.put_with_token(&routes::task(t3), &json!({ "status": "completed" }), &token)
            .await;
        app.upload_file("a.txt", b"a".to_vec(), Some(ws), None, &token)
            .await;

        let res = app.get_with_token(&routes::workspace_stats(ws), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_tasks"], 3);
        assert_eq!(res.body["open_tasks"], 1);
        assert_eq!(res.body["in_progress_tasks"], 1);
        assert_eq!(res.body["completed_tasks"], 1);
        assert_eq!(res.body["total_files"], 1);
        // round(1/3 * 100) = 33
        assert_eq!(res.body["completion_rate"], 33);
    }

    #[tokio::test]
    async fn empty_workspace_has_zero_completion_rate() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("stats2").await;
        let ws = app.create_workspace(&token, "Empty stats").await;

        let res = app.get_with_token(&routes::workspace_stats(ws), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total_tasks"], 0);
        assert_eq!(res.body["completion_rate"], 0);
    }
}
