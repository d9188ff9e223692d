use serde_json::json;

use crate::common::{TestApp, routes};

mod comment_threads {
    use super::*;

    #[tokio::test]
    async fn list_returns_top_level_with_nested_replies() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("commenter1").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;

        let parent = app.create_comment(&token, task, "hi", None).await;
        app.create_comment(&token, task, "re", Some(parent)).await;

        let res = app
            .get_with_token(&routes::comments_for_task(task), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["content"], "hi");
        assert_eq!(items[0]["author"]["username"], "commenter1");
        let replies = items[0]["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["content"], "re");
    }

    #[tokio::test]
    async fn create_trims_and_rejects_blank_content() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("commenter2").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({ "content": "   ", "task_id": task }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({ "content": "  padded  ", "task_id": task }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201);
        assert_eq!(res.body["content"], "padded");
    }

    #[tokio::test]
    async fn reply_parent_must_share_the_task() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("commenter3").await;
        let ws = app.create_workspace(&token, "W").await;
        let task_a = app.create_task(&token, ws, "A").await;
        let task_b = app.create_task(&token, ws, "B").await;
        let parent = app.create_comment(&token, task_a, "on A", None).await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({ "content": "re", "task_id": task_b, "parent_id": parent }),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn replying_to_a_reply_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("commenter4").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;
        let parent = app.create_comment(&token, task, "top", None).await;
        let reply = app.create_comment(&token, task, "re", Some(parent)).await;

        let res = app
            .post_with_token(
                routes::COMMENTS,
                &json!({ "content": "re-re", "task_id": task, "parent_id": reply }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn list_requires_owning_the_task() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("commenter5").await;
        let token_b = app.create_authenticated_user("commenter6").await;
        let ws = app.create_workspace(&token_a, "W").await;
        let task = app.create_task(&token_a, ws, "T").await;
        app.create_comment(&token_a, task, "private", None).await;

        let res = app
            .get_with_token(&routes::comments_for_task(task), &token_b)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }
}

mod author_only_mutation {
    use super::*;

    #[tokio::test]
    async fn non_author_gets_permission_denied_not_not_found() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("author_a").await;
        let token_b = app.create_authenticated_user("author_b").await;
        let ws = app.create_workspace(&token_a, "W").await;
        let task = app.create_task(&token_a, ws, "T").await;
        let comment = app.create_comment(&token_a, task, "mine", None).await;

        // Distinct from the NOT_FOUND used for workspace-ownership misses.
        let res = app.delete_with_token(&routes::comment(comment), &token_b).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");

        let res = app
            .put_with_token(&routes::comment(comment), &json!({ "content": "edit" }), &token_b)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn author_can_update_own_comment() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("author_c").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;
        let comment = app.create_comment(&token, task, "before", None).await;

        let res = app
            .put_with_token(&routes::comment(comment), &json!({ "content": "after" }), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"], "after");
    }

    #[tokio::test]
    async fn mutating_missing_comment_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("author_d").await;

        let res = app.delete_with_token(&routes::comment(99999), &token).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }
}

mod cascade_delete {
    use super::*;

    #[tokio::test]
    async fn removes_direct_replies_only() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("cascader1").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;

        let doomed = app.create_comment(&token, task, "doomed", None).await;
        app.create_comment(&token, task, "r1", Some(doomed)).await;
        app.create_comment(&token, task, "r2", Some(doomed)).await;

        let survivor = app.create_comment(&token, task, "survivor", None).await;
        app.create_comment(&token, task, "sr", Some(survivor)).await;

        let res = app.delete_with_token(&routes::comment(doomed), &token).await;
        assert_eq!(res.status, 204);

        let res = app
            .get_with_token(&routes::comments_for_task(task), &token)
            .await;
        let items = res.body.as_array().unwrap();
        // The unrelated thread is untouched.
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["content"], "survivor");
        assert_eq!(items[0]["replies"].as_array().unwrap().len(), 1);
    }
}
