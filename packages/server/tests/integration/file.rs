use serde_json::json;

use crate::common::{TestApp, routes};

mod file_upload {
    use super::*;

    #[tokio::test]
    async fn upload_to_workspace_succeeds() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader1").await;
        let ws = app.create_workspace(&token, "W").await;

        let res = app
            .upload_file("report.txt", b"contents".to_vec(), Some(ws), None, &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["original_name"], "report.txt");
        assert_eq!(res.body["size"], 8);
        assert_eq!(res.body["workspace_id"], ws);
        assert_eq!(res.body["uploader"]["username"], "uploader1");
        let path = res.body["path"].as_str().unwrap();
        assert!(path.ends_with("/download"), "unexpected path: {path}");
        assert_eq!(app.artifact_count(), 1);
    }

    #[tokio::test]
    async fn upload_via_task_resolves_ownership_through_the_chain() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader2").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;

        let res = app
            .upload_file("att.bin", vec![0u8; 16], None, Some(task), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["task_id"], task);
        assert!(res.body["workspace_id"].is_null());
    }

    #[tokio::test]
    async fn upload_without_parent_is_rejected_and_leaves_no_artifact() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader3").await;

        let res = app
            .upload_file("loose.txt", b"data".to_vec(), None, None, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(app.artifact_count(), 0);
    }

    #[tokio::test]
    async fn rejected_authorization_cleans_up_the_artifact() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("uploader4").await;
        let token_b = app.create_authenticated_user("uploader5").await;
        let ws = app.create_workspace(&token_a, "Private").await;

        let res = app
            .upload_file("sneak.txt", b"data".to_vec(), Some(ws), None, &token_b)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
        // No metadata row and no artifact remain after the rejection.
        assert_eq!(app.artifact_count(), 0);
        let list = app.get_with_token(routes::FILES, &token_a).await;
        assert!(list.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_rejects_traversal_filenames() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader6").await;
        let ws = app.create_workspace(&token, "W").await;

        let res = app
            .upload_file("../evil.sh", b"#!/bin/sh".to_vec(), Some(ws), None, &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(app.artifact_count(), 0);
    }

    #[tokio::test]
    async fn second_file_field_is_rejected_without_orphaning_artifacts() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader8").await;
        let ws = app.create_workspace(&token, "W").await;

        let first = reqwest::multipart::Part::bytes(b"first".to_vec()).file_name("one.txt");
        let second = reqwest::multipart::Part::bytes(b"second".to_vec()).file_name("two.txt");
        let form = reqwest::multipart::Form::new()
            .text("workspace_id", ws.to_string())
            .part("file", first)
            .part("file", second);

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::FILE_UPLOAD))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();

        assert_eq!(status, 400, "{text}");
        assert!(text.contains("VALIDATION_ERROR"));
        // The first part's artifact must not survive the rejection.
        assert_eq!(app.artifact_count(), 0);
    }

    #[tokio::test]
    async fn task_from_another_workspace_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader9").await;
        let ws_a = app.create_workspace(&token, "A").await;
        let ws_b = app.create_workspace(&token, "B").await;
        let task_b = app.create_task(&token, ws_b, "T").await;

        // Both parents are owned, but they disagree about the workspace.
        let res = app
            .upload_file("split.txt", b"x".to_vec(), Some(ws_a), Some(task_b), &token)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert_eq!(app.artifact_count(), 0);
    }

    #[tokio::test]
    async fn matching_workspace_and_task_pair_is_accepted() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader10").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;

        let res = app
            .upload_file("both.txt", b"x".to_vec(), Some(ws), Some(task), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["workspace_id"], ws);
        assert_eq!(res.body["task_id"], task);
    }

    #[tokio::test]
    async fn identical_content_uploads_remain_independent() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("uploader7").await;
        let ws = app.create_workspace(&token, "W").await;

        let data = b"same bytes".to_vec();
        let res1 = app
            .upload_file("a.txt", data.clone(), Some(ws), None, &token)
            .await;
        let res2 = app
            .upload_file("b.txt", data, Some(ws), None, &token)
            .await;
        assert_eq!(res1.status, 201);
        assert_eq!(res2.status, 201);
        assert_eq!(app.artifact_count(), 2);

        // Deleting one must not disturb the other's artifact.
        let res = app.delete_with_token(&routes::file(res1.id()), &token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.artifact_count(), 1);

        let (status, bytes) = app.download_file(res2.id(), &token).await;
        assert_eq!(status, 200);
        assert_eq!(bytes, b"same bytes");
    }
}

mod file_download {
    use super::*;

    #[tokio::test]
    async fn round_trips_bytes_with_metadata_headers() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("downloader1").await;
        let ws = app.create_workspace(&token, "W").await;
        let res = app
            .upload_file("data.txt", b"round trip".to_vec(), Some(ws), None, &token)
            .await;
        let id = res.id();

        let (status, bytes) = app.download_file(id, &token).await;

        assert_eq!(status, 200);
        assert_eq!(bytes, b"round trip");
    }

    #[tokio::test]
    async fn other_user_gets_not_found() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("downloader2").await;
        let token_b = app.create_authenticated_user("downloader3").await;
        let ws = app.create_workspace(&token_a, "W").await;
        let res = app
            .upload_file("p.txt", b"private".to_vec(), Some(ws), None, &token_a)
            .await;

        let (status, _) = app.download_file(res.id(), &token_b).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn missing_artifact_is_a_storage_error_not_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("downloader4").await;
        let ws = app.create_workspace(&token, "W").await;
        let res = app
            .upload_file("gone.txt", b"bytes".to_vec(), Some(ws), None, &token)
            .await;
        let id = res.id();

        // Simulate an operator wiping the artifact directory out from under
        // the metadata.
        assert_eq!(app.artifact_count(), 1);
        app.wipe_artifacts();
        assert_eq!(app.artifact_count(), 0);

        let res = app.get_with_token(&routes::file_download(id), &token).await;
        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.code(), "STORAGE_ERROR");
    }
}

mod file_metadata {
    use super::*;

    #[tokio::test]
    async fn list_filters_by_workspace_and_task() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("meta1").await;
        let ws = app.create_workspace(&token, "W").await;
        let task = app.create_task(&token, ws, "T").await;
        app.upload_file("ws.txt", b"a".to_vec(), Some(ws), None, &token).await;
        app.upload_file("task.txt", b"b".to_vec(), None, Some(task), &token).await;

        let res = app
            .get_with_token(&format!("{}?workspace_id={ws}", routes::FILES), &token)
            .await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        let res = app
            .get_with_token(&format!("{}?task_id={task}", routes::FILES), &token)
            .await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        // Unfiltered: both, newest first.
        let res = app.get_with_token(routes::FILES, &token).await;
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn patch_updates_tags_without_touching_the_artifact() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("meta2").await;
        let ws = app.create_workspace(&token, "W").await;
        let res = app
            .upload_file("tagme.txt", b"x".to_vec(), Some(ws), None, &token)
            .await;
        let id = res.id();

        let res = app
            .patch_with_token(&routes::file(id), &json!({ "tags": ["a", "b"] }), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["tags"], json!(["a", "b"]));
        assert_eq!(app.artifact_count(), 1);

        let (status, bytes) = app.download_file(id, &token).await;
        assert_eq!(status, 200);
        assert_eq!(bytes, b"x");
    }

    #[tokio::test]
    async fn delete_removes_row_and_artifact() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("meta3").await;
        let ws = app.create_workspace(&token, "W").await;
        let res = app
            .upload_file("bye.txt", b"x".to_vec(), Some(ws), None, &token)
            .await;
        let id = res.id();

        let res = app.delete_with_token(&routes::file(id), &token).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.artifact_count(), 0);

        let res = app.get_with_token(&routes::file(id), &token).await;
        assert_eq!(res.status, 404);
    }
}
