use serde_json::json;

use crate::common::{TestApp, routes};

mod register {
    use super::*;

    #[tokio::test]
    async fn returns_token_and_user_projection() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({ "username": "alice", "password": "pass123", "display_name": "Alice" }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["token"].as_str().is_some());
        assert_eq!(res.body["user"]["username"], "alice");
        assert_eq!(res.body["user"]["display_name"], "Alice");
        // Credential material never leaves the server.
        assert!(res.body["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn display_name_defaults_to_username() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({ "username": "bob", "password": "pass123" }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["user"]["display_name"], "bob");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("carol").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({ "username": "carol", "password": "pass123" }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn rejects_short_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({ "username": "dave", "password": "short" }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_invalid_username_characters() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({ "username": "has space", "password": "pass123" }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn succeeds_and_records_last_login() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("erin").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "username": "erin", "password": "pass123" }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].as_str().is_some());
        assert!(res.body["user"]["last_login_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("frank").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "username": "frank", "password": "wrong-pass" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn rejects_unknown_username() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({ "username": "nobody", "password": "pass123" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "INVALID_CREDENTIALS");
    }
}

mod me_and_profile {
    use super::*;

    #[tokio::test]
    async fn me_returns_current_account() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("grace").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "grace");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn me_with_garbage_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.token").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.code(), "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn profile_update_changes_display_name_and_email() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("heidi").await;

        let res = app
            .put_with_token(
                routes::PROFILE,
                &json!({ "display_name": "Heidi H", "email": "heidi@example.com" }),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["display_name"], "Heidi H");
        assert_eq!(res.body["email"], "heidi@example.com");
    }
}
