#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::{TestContext, draft, titles, tomorrow, yesterday};
use serde_json::{Value, json};

#[actix_web::test]
async fn owner_sees_drafts_and_scheduled_posts_on_own_profile() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let reader = ctx.user("reader").await;
    ctx.post(author.id, draft("Public", yesterday())).await;
    ctx.post(author.id, draft("Scheduled", tomorrow())).await;
    let mut hidden = draft("Unpublished", -chrono::Duration::days(2));
    hidden.is_published = false;
    ctx.post(author.id, hidden).await;
    let app = init_app!(ctx);

    let own: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(author.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(own["profile"]["username"], "author");
    assert_eq!(titles(&own["page"]), ["Scheduled", "Public", "Unpublished"]);

    for req in [
        test::TestRequest::get().uri("/profile/author/"),
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(reader.bearer()),
    ] {
        let other: Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert_eq!(titles(&other["page"]), ["Public"]);
    }
}

#[actix_web::test]
async fn profile_never_exposes_private_fields() {
    let ctx = TestContext::new();
    ctx.user("author").await;
    let app = init_app!(ctx);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/author/").to_request(),
    )
    .await;
    assert!(body["profile"].get("email").is_none());
    assert!(body["profile"].get("password_hash").is_none());
}

#[actix_web::test]
async fn unknown_profile_is_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/nobody/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn user_edits_own_profile() {
    let ctx = TestContext::new();
    let user = ctx.user("oldname").await;
    let app = init_app!(ctx);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/edit/")
            .insert_header(user.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(form["username"], "oldname");
    assert!(form.get("password_hash").is_none());

    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit/")
            .insert_header(user.bearer())
            .set_json(json!({
                "username": "newname",
                "email": "New@Example.com",
                "first_name": "Ada",
                "last_name": "Lovelace"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(updated["username"], "newname");
    assert_eq!(updated["email"], "new@example.com");

    let profile: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/newname/").to_request(),
    )
    .await;
    assert_eq!(profile["profile"]["first_name"], "Ada");
}

#[actix_web::test]
async fn profile_edit_requires_login_and_a_free_username() {
    let ctx = TestContext::new();
    ctx.user("taken").await;
    let user = ctx.user("someone").await;
    let app = init_app!(ctx);
    let form = json!({ "username": "taken", "email": "s@example.com" });

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit/")
            .set_json(&form)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit/")
            .insert_header(user.bearer())
            .set_json(&form)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn registration_and_login_issue_working_tokens() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_json(json!({
                "username": "newcomer",
                "email": "newcomer@example.com",
                "password": "correct-horse"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered: Value = test::read_body_json(resp).await;
    assert_eq!(registered["token_type"], "Bearer");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_json(json!({ "username": "newcomer", "password": "wrong-horse" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let login: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_json(json!({ "username": "newcomer", "password": "correct-horse" }))
            .to_request(),
    )
    .await;
    let token = login["access_token"].as_str().unwrap();

    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/edit/")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(me["username"], "newcomer");
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    ctx.user("existing").await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/registration/")
            .set_json(json!({
                "username": "existing",
                "email": "other@example.com",
                "password": "long-enough"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn health_check_answers() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(body["status"], "ok");
}
