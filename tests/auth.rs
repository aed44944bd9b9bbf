mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{init_app, TestContext};
use tasker::auth::{LoginResponse, JWT_COOKIE_NAME};
use tasker::models::Role;
use tasker::store::CredentialStore;

fn session(token: &str) -> Cookie<'static> {
    Cookie::new(JWT_COOKIE_NAME, token.to_owned())
}

#[actix_rt::test]
async fn test_login_sets_cookie_and_redirect() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "alice", "password": "correct" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == JWT_COOKIE_NAME)
        .map(|c| c.into_owned())
        .expect("login must set the session cookie");
    assert!(cookie.http_only().unwrap_or(false));
    assert!(cookie.secure().unwrap_or(false));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(
        cookie.max_age(),
        Some(actix_web::cookie::time::Duration::seconds(86400))
    );
    assert_eq!(ctx.codec.extract_subject(cookie.value()).as_deref(), Some("alice"));

    let body: LoginResponse = test::read_body_json(resp).await;
    assert_eq!(body.username, "alice");
    assert_eq!(body.role, Role::User);
    assert_eq!(body.redirect, "/user/home");
}

#[actix_rt::test]
async fn test_admin_login_redirects_to_admin_home() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "root", "password": "toor" }))
        .to_request();
    let body: LoginResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.role, Role::Admin);
    assert_eq!(body.redirect, "/admin/home");
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let mut bodies = Vec::new();
    for (username, password) in [("alice", "wrong"), ("nobody", "correct")] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp
            .response()
            .cookies()
            .all(|c| c.name() != JWT_COOKIE_NAME));
        let body: Value = test::read_body_json(resp).await;
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["error"], "Invalid username or password");
}

#[actix_rt::test]
async fn test_user_token_is_forbidden_on_admin_routes() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;
    let token = ctx.token_for("alice", Role::User);

    for uri in ["/admin/users", "/admin/home", "//admin/users", "/admin/tasks/"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .cookie(session(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "GET {}", uri);
    }
}

#[actix_rt::test]
async fn test_missing_cookie_is_unauthorized() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    for uri in ["/admin/users", "/user/home", "/api/tasks", "/api/users/me", "/api/other"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "GET {}", uri);
    }
}

#[actix_rt::test]
async fn test_dot_segments_do_not_escape_to_public_routes() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/../../admin/users")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_user_and_admin_reach_user_routes() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    for (username, role) in [("alice", Role::User), ("root", Role::Admin)] {
        let req = test::TestRequest::get()
            .uri("/user/home")
            .cookie(session(&ctx.token_for(username, role)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["subject"], username);
        assert_eq!(body["role"], role.as_str());
    }

    let req = test::TestRequest::get()
        .uri("/admin/home")
        .cookie(session(&ctx.token_for("root", Role::Admin)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_role_is_read_from_store_not_token() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    // Correctly signed, but the role claim does not match the account.
    let token = ctx.token_for("alice", Role::Admin);
    let req = test::TestRequest::get()
        .uri("/admin/home")
        .cookie(session(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_public_routes_ignore_bad_cookies() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let req = test::TestRequest::get()
        .uri("/health")
        .cookie(session("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .cookie(session("not-a-token"))
        .set_json(json!({ "username": "alice", "password": "correct" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_invalid_and_expired_cookies_are_unauthorized() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let mut tampered = ctx.token_for("alice", Role::User);
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let expired = ctx
        .codec
        .issue(
            1,
            "alice",
            Role::User,
            chrono::Utc::now() - chrono::Duration::seconds(86400 + 5),
        )
        .unwrap();

    for token in [tampered, expired, "garbage".to_string()] {
        let req = test::TestRequest::get()
            .uri("/user/home")
            .cookie(session(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_rt::test]
async fn test_deleted_user_token_is_unauthorized() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;
    let token = ctx.token_for("alice", Role::User);

    assert!(ctx.store.remove("alice"));

    let req = test::TestRequest::get()
        .uri("/user/home")
        .cookie(session(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_token_for_reused_username_is_unauthorized() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;
    let token = ctx.token_for("alice", Role::User);

    // The account is deleted and someone else registers the same name.
    assert!(ctx.store.remove("alice"));
    ctx.store
        .insert(common::identity(99, "alice", "someone-else", Role::User));

    let req = test::TestRequest::get()
        .uri("/user/home")
        .cookie(session(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/user/home")
        .cookie(session(&ctx.token_for("alice", Role::User)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_is_admin_ignores_token_for_reused_admin_name() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;
    let token = ctx.token_for("root", Role::Admin);

    assert!(ctx.store.remove("root"));
    ctx.store
        .insert(common::identity(42, "root", "replacement", Role::Admin));

    let req = test::TestRequest::get()
        .uri("/api/auth/is-admin")
        .cookie(session(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["admin"], false);

    let req = test::TestRequest::get()
        .uri("/admin/home")
        .cookie(session(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_key_rotation_invalidates_outstanding_tokens() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;
    let old_token = ctx.token_for("alice", Role::User);

    ctx.codec
        .rotate_key(b"rotated-integration-secret-0123456789abcdef");

    let req = test::TestRequest::get()
        .uri("/user/home")
        .cookie(session(&old_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/user/home")
        .cookie(session(&ctx.token_for("alice", Role::User)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_logout_is_idempotent() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;
    let token = ctx.token_for("alice", Role::User);

    for cookie in [Some(session(&token)), None, None] {
        let mut req = test::TestRequest::post().uri("/api/auth/logout");
        if let Some(cookie) = cookie {
            req = req.cookie(cookie);
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == JWT_COOKIE_NAME)
            .map(|c| c.into_owned())
            .expect("logout must clear the session cookie");
        assert_eq!(cleared.value(), "");
        assert_eq!(
            cleared.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }
}

#[actix_rt::test]
async fn test_register_ignores_role_and_rejects_duplicates() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let payload = json!({
        "username": "mallory",
        "email": "mallory@example.com",
        "password": "password123",
        "role": "ADMIN"
    });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp
        .response()
        .cookies()
        .all(|c| c.name() != JWT_COOKIE_NAME));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["role"], "USER");

    let stored = ctx.store.find_by_username("mallory").await.unwrap().unwrap();
    assert_eq!(stored.role, Role::User);
    assert_ne!(stored.password_hash, "password123");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_authenticated_and_admin_status_endpoints() {
    let ctx = TestContext::new();
    let app = init_app(&ctx).await;

    let cases = [
        (Some(ctx.token_for("alice", Role::User)), true, false),
        (Some(ctx.token_for("root", Role::Admin)), true, true),
        (Some("garbage".to_string()), false, false),
        (None, false, false),
    ];

    for (token, authenticated, admin) in cases {
        let mut req = test::TestRequest::get().uri("/api/auth/authenticated");
        if let Some(token) = &token {
            req = req.cookie(session(token));
        }
        let body: Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert_eq!(body["authenticated"], authenticated);

        let mut req = test::TestRequest::get().uri("/api/auth/is-admin");
        if let Some(token) = &token {
            req = req.cookie(session(token));
        }
        let body: Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert_eq!(body["admin"], admin);
    }
}
