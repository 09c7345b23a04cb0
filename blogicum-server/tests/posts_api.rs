#[macro_use]
mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use common::{TestContext, draft, titles, tomorrow, yesterday};
use serde_json::{Value, json};

#[actix_web::test]
async fn published_post_is_listed_on_index_and_category_page() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let news = ctx.category("news", true).await;
    let mut d = draft("Fresh news", yesterday());
    d.category_id = Some(news.id);
    ctx.post(author.id, d).await;
    let app = init_app!(ctx);

    let index: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(titles(&index), ["Fresh news"]);
    assert_eq!(index["items"][0]["category"]["slug"], "news");
    assert_eq!(index["items"][0]["author"]["username"], "author");
    assert_eq!(index["items"][0]["comment_count"], 0);

    let category: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/category/news/").to_request(),
    )
    .await;
    assert_eq!(category["category"]["slug"], "news");
    assert_eq!(titles(&category["page"]), ["Fresh news"]);
}

#[actix_web::test]
async fn scheduled_post_is_hidden_from_everyone_but_its_author() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let reader = ctx.user("reader").await;
    let news = ctx.category("news", true).await;
    let mut d = draft("Tomorrow's news", tomorrow());
    d.category_id = Some(news.id);
    let post = ctx.post(author.id, d).await;
    let app = init_app!(ctx);

    for user in [None, Some(&reader), Some(&author)] {
        let mut req = test::TestRequest::get().uri("/");
        if let Some(user) = user {
            req = req.insert_header(user.bearer());
        }
        let index: Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert!(titles(&index).is_empty());
    }

    let category: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/category/news/").to_request(),
    )
    .await;
    assert!(titles(&category["page"]).is_empty());

    let detail_uri = format!("/posts/{}/", post.id);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&detail_uri)
            .insert_header(reader.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&detail_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let detail: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&detail_uri)
            .insert_header(author.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(detail["post"]["title"], "Tomorrow's news");
}

#[actix_web::test]
async fn unpublished_category_hides_its_posts() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let hidden = ctx.category("hidden", false).await;
    let mut d = draft("In hidden category", yesterday());
    d.category_id = Some(hidden.id);
    ctx.post(author.id, d).await;
    ctx.post(author.id, draft("No category", yesterday())).await;
    let app = init_app!(ctx);

    let index: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(titles(&index), ["No category"]);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/category/hidden/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/category/missing/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unpublished_post_is_hidden_even_in_the_past() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let mut d = draft("Draft", yesterday());
    d.is_published = false;
    ctx.post(author.id, d).await;
    let app = init_app!(ctx);

    let index: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(titles(&index).is_empty());
}

#[actix_web::test]
async fn index_is_newest_first_and_paginated() {
    let ctx = TestContext::with_page_size(2);
    let author = ctx.user("author").await;
    for days in 1..=5 {
        ctx.post(author.id, draft(&format!("{days} days ago"), -chrono::Duration::days(days)))
            .await;
    }
    let app = init_app!(ctx);

    let first: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(titles(&first), ["1 days ago", "2 days ago"]);
    assert_eq!(first["num_pages"], 3);
    assert_eq!(first["has_next"], true);

    let garbage: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=abc").to_request(),
    )
    .await;
    assert_eq!(garbage["number"], 1);

    let overshoot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=999").to_request(),
    )
    .await;
    assert_eq!(overshoot["number"], 3);
    assert_eq!(titles(&overshoot), ["5 days ago"]);
}

#[actix_web::test]
async fn author_creates_and_edits_a_post() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(author.bearer())
            .set_json(json!({
                "title": "First",
                "text": "Hello",
                "pub_date": "2020-01-01T00:00:00Z"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["author_id"], author.id.to_string());
    assert_eq!(created["is_published"], true);
    let post_id = created["id"].as_str().unwrap().to_string();

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{post_id}/edit/"))
            .insert_header(author.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(form["title"], "First");

    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{post_id}/edit/"))
            .insert_header(author.bearer())
            .set_json(json!({
                "title": "First, revised",
                "text": "Hello again",
                "pub_date": "2020-01-01T00:00:00Z",
                "is_published": false
            }))
            .to_request(),
    )
    .await;
    assert_eq!(updated["title"], "First, revised");
    assert_eq!(updated["is_published"], false);
}

#[actix_web::test]
async fn non_author_edit_and_delete_redirect_without_changes() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let intruder = ctx.user("intruder").await;
    let post = ctx.post(author.id, draft("Mine", yesterday())).await;
    let app = init_app!(ctx);
    let detail = format!("/posts/{}/", post.id);

    let requests = [
        test::TestRequest::get().uri(&format!("/posts/{}/edit/", post.id)),
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .set_json(json!({
                "title": "Stolen",
                "text": "Stolen",
                "pub_date": "2020-01-01T00:00:00Z"
            })),
        test::TestRequest::get().uri(&format!("/posts/{}/delete/", post.id)),
        test::TestRequest::post().uri(&format!("/posts/{}/delete/", post.id)),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.insert_header(intruder.bearer()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            detail
        );
    }

    let stored = ctx.stored_post(post.id).await.expect("post must survive");
    assert_eq!(stored.title, "Mine");
}

#[actix_web::test]
async fn author_deletes_own_post() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let post = ctx.post(author.id, draft("Short-lived", yesterday())).await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", post.id))
            .insert_header(author.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(ctx.stored_post(post.id).await.is_none());

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn mutations_require_login() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let post = ctx.post(author.id, draft("Mine", yesterday())).await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .set_json(json!({"title": "x", "text": "y", "pub_date": "2020-01-01T00:00:00Z"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(ctx.stored_post(post.id).await.is_some());
}

#[actix_web::test]
async fn bad_token_is_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_post_form_lists_field_errors() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header(author.bearer())
            .set_json(json!({"title": "", "text": "", "pub_date": "2020-01-01T00:00:00Z"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, ["title", "text"]);
}

#[actix_web::test]
async fn repeated_detail_requests_agree() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let reader = ctx.user("reader").await;
    let post = ctx.post(author.id, draft("Stable", yesterday())).await;
    let app = init_app!(ctx);
    let uri = format!("/posts/{}/", post.id);

    let first: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(reader.bearer())
            .to_request(),
    )
    .await;
    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(reader.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(first, second);
}

#[actix_web::test]
async fn unknown_route_is_json_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/no/such/page/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "page not found");
}

#[actix_web::test]
async fn every_response_carries_tracing_and_security_headers() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let post = ctx.post(author.id, draft("Mine", yesterday())).await;
    let app = init_app!(ctx);

    let requests = [
        (test::TestRequest::get().uri("/"), StatusCode::OK),
        (
            test::TestRequest::get()
                .uri("/")
                .insert_header((header::AUTHORIZATION, "Bearer garbage")),
            StatusCode::UNAUTHORIZED,
        ),
        (
            test::TestRequest::post()
                .uri("/posts/create/")
                .set_json(json!({ "title": "x", "text": "y" })),
            StatusCode::UNAUTHORIZED,
        ),
        (
            test::TestRequest::get().uri("/posts/not-a-uuid/"),
            StatusCode::NOT_FOUND,
        ),
        (
            test::TestRequest::post()
                .uri(&format!("/posts/{}/delete/", post.id))
                .insert_header(author.bearer()),
            StatusCode::NO_CONTENT,
        ),
    ];

    for (req, expected) in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), expected);
        let headers = resp.headers();
        assert!(headers.contains_key("x-request-id"));
        assert!(headers.contains_key("server-timing"));
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    }
}

#[actix_web::test]
async fn rejected_token_gets_json_error_and_keeps_request_id() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .insert_header((header::AUTHORIZATION, "Token nope"))
            .insert_header(("x-request-id", "req-42"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-42");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");
}

#[actix_web::test]
async fn anonymous_mutation_gets_json_error() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .set_json(json!({ "title": "x", "text": "y" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");
}

#[actix_web::test]
async fn non_author_with_invalid_form_is_still_redirected() {
    let ctx = TestContext::new();
    let author = ctx.user("author").await;
    let intruder = ctx.user("intruder").await;
    let post = ctx.post(author.id, draft("Mine", yesterday())).await;
    let app = init_app!(ctx);
    let uri = format!("/posts/{}/edit/", post.id);

    for body in [json!({ "title": "", "text": "", "pub_date": "2020-01-01T00:00:00Z" }), json!({})] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&uri)
                .insert_header(intruder.bearer())
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            format!("/posts/{}/", post.id)
        );
    }

    // the author gets the field errors
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header(author.bearer())
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stored_post(post.id).await.unwrap().title, "Mine");
}
