/// End-to-end API tests against PostgreSQL
///
/// Run with `DATABASE_URL=... cargo test -p recipe-api -- --ignored`.

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use recipe_shared::models::user::User;
use serde_json::{json, Value};

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_account_then_login() {
    let ctx = TestContext::new().await.unwrap();
    let email = TestContext::unique_email();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/users/create/",
            None,
            Some(json!({ "email": email, "password": "longenough", "name": "A" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "email": email, "name": "A" }));

    let (status, body) = ctx
        .send(
            Method::POST,
            "/users/token/",
            None,
            Some(json!({ "email": email, "password": "longenough" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx.send(Method::GET, "/users/me/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_email_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let email = TestContext::unique_email();
    let body = json!({ "email": email, "password": "longenough", "name": "A" });

    let (status, _) = ctx.send(Method::POST, "/users/create/", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .send(
            Method::POST,
            "/users/create/",
            None,
            Some(json!({ "email": email.to_uppercase(), "password": "longenough", "name": "B" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_bad_credentials_forbidden() {
    let ctx = TestContext::new().await.unwrap();
    let (user, _) = ctx.account().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/users/token/",
            None,
            Some(json!({ "email": user.email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("token").is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_profile_password_update() {
    let ctx = TestContext::new().await.unwrap();
    let (user, token) = ctx.account().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::PATCH,
            "/users/me/",
            Some(&token),
            Some(json!({ "name": "Renamed", "password": "newpassword123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    assert!(User::authenticate(&ctx.db, &user.email, "newpassword123").await.is_ok());
    assert!(User::authenticate(&ctx.db, &user.email, "longenough").await.is_err());

    let (status, _) = ctx
        .send(Method::POST, "/users/me/", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_profile_put_requires_every_field() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.account().await.unwrap();

    let (status, _) = ctx
        .send(Method::PUT, "/users/me/", Some(&token), Some(json!({ "name": "Only" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_logout_revokes_token() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.account().await.unwrap();

    let (status, _) = ctx.send(Method::DELETE, "/users/token/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send(Method::GET, "/users/me/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_tags_are_scoped_to_owner() {
    let ctx = TestContext::new().await.unwrap();
    let (u1, t1) = ctx.account().await.unwrap();
    let (_, t2) = ctx.account().await.unwrap();

    let (status, _) = ctx
        .send(Method::POST, "/recipe/tags/", Some(&t1), Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, vegan) = ctx
        .send(Method::POST, "/recipe/tags/", Some(&t1), Some(json!({ "name": "Vegan" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vegan["name"], "Vegan");

    ctx.send(Method::POST, "/recipe/tags/", Some(&t1), Some(json!({ "name": "Dessert" })))
        .await;
    ctx.send(Method::POST, "/recipe/tags/", Some(&t2), Some(json!({ "name": "Fruity" })))
        .await;

    let (status, tags) = ctx.send(Method::GET, "/recipe/tags/", Some(&t1), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Vegan", "Dessert"]);

    let owner: uuid::Uuid = sqlx::query_scalar("SELECT user_id FROM tags WHERE id = $1::uuid")
        .bind(vegan["id"].as_str().unwrap())
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(owner, u1.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_ingredients_ignore_supplied_owner() {
    let ctx = TestContext::new().await.unwrap();
    let (u1, t1) = ctx.account().await.unwrap();
    let (u2, _) = ctx.account().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/recipe/ingredients/",
            Some(&t1),
            Some(json!({ "name": "Kale", "user": u2.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let owner: uuid::Uuid =
        sqlx::query_scalar("SELECT user_id FROM ingredients WHERE id = $1::uuid")
            .bind(body["id"].as_str().unwrap())
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(owner, u1.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_recipe_representations() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.account().await.unwrap();

    let (_, tag) = ctx
        .send(Method::POST, "/recipe/tags/", Some(&token), Some(json!({ "name": "Thai" })))
        .await;
    let (_, ingredient) = ctx
        .send(
            Method::POST,
            "/recipe/ingredients/",
            Some(&token),
            Some(json!({ "name": "Prawns" })),
        )
        .await;

    let (status, created) = ctx
        .send(
            Method::POST,
            "/recipe/recipes/",
            Some(&token),
            Some(json!({
                "name": "Thai prawn curry",
                "time_minutes": 20,
                "price": 7.5,
                "tags": [tag["id"], tag["id"]],
                "ingredients": [ingredient["id"]],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["price"], "7.50");
    assert_eq!(ids(&created["tags"]), vec![tag["id"].as_str().unwrap()]);
    assert_eq!(ids(&created["ingredients"]), vec![ingredient["id"].as_str().unwrap()]);

    let uri = format!("/recipe/recipes/{}/", created["id"].as_str().unwrap());
    let (status, detail) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tags"], json!([{ "id": tag["id"], "name": "Thai" }]));
    assert_eq!(
        detail["ingredients"],
        json!([{ "id": ingredient["id"], "name": "Prawns" }])
    );

    let (_, list) = ctx.send(Method::GET, "/recipe/recipes/", Some(&token), None).await;
    assert_eq!(list[0]["tags"], json!([tag["id"]]));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_recipe_update_and_delete() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.account().await.unwrap();

    let (_, tag) = ctx
        .send(Method::POST, "/recipe/tags/", Some(&token), Some(json!({ "name": "Quick" })))
        .await;
    let (_, created) = ctx
        .send(
            Method::POST,
            "/recipe/recipes/",
            Some(&token),
            Some(json!({
                "name": "Omelette",
                "time_minutes": 5,
                "price": "3.20",
                "link": "https://example.com/omelette",
                "tags": [tag["id"]],
            })),
        )
        .await;
    let uri = format!("/recipe/recipes/{}/", created["id"].as_str().unwrap());

    let (status, patched) = ctx
        .send(Method::PATCH, &uri, Some(&token), Some(json!({ "time_minutes": 7 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["time_minutes"], 7);
    assert_eq!(patched["link"], "https://example.com/omelette");
    assert_eq!(patched["tags"], json!([tag["id"]]));

    let (status, replaced) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "name": "Plain omelette" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["time_minutes"], 0);
    assert_eq!(replaced["price"], "0.00");
    assert_eq!(replaced["link"], Value::Null);
    assert_eq!(replaced["tags"], json!([]));

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_recipe_validation() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.account().await.unwrap();

    for body in [
        json!({ "name": "" }),
        json!({ "name": "Soup", "price": "1.234" }),
        json!({ "name": "Soup", "price": 1000 }),
        json!({ "name": "Soup", "time_minutes": -1 }),
        json!({ "name": "Soup", "tags": ["00000000-0000-0000-0000-000000000000"] }),
    ] {
        let (status, _) = ctx
            .send(Method::POST, "/recipe/recipes/", Some(&token), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }

    let (_, list) = ctx.send(Method::GET, "/recipe/recipes/", Some(&token), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_recipe_patch_null_name_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.account().await.unwrap();

    let (_, created) = ctx
        .send(Method::POST, "/recipe/recipes/", Some(&token), Some(json!({ "name": "Stew" })))
        .await;
    let uri = format!("/recipe/recipes/{}/", created["id"].as_str().unwrap());

    let (status, _) = ctx
        .send(Method::PATCH, &uri, Some(&token), Some(json!({ "name": null })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(detail["name"], "Stew");
    assert_eq!(detail["price"], "0.00");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_other_accounts_recipe_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let (_, t1) = ctx.account().await.unwrap();
    let (_, t2) = ctx.account().await.unwrap();

    let (_, created) = ctx
        .send(Method::POST, "/recipe/recipes/", Some(&t1), Some(json!({ "name": "Secret" })))
        .await;
    let uri = format!("/recipe/recipes/{}/", created["id"].as_str().unwrap());

    for method in [Method::GET, Method::DELETE] {
        let (status, _) = ctx.send(method, &uri, Some(&t2), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = ctx
        .send(Method::PATCH, &uri, Some(&t2), Some(json!({ "name": "Mine" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send(Method::GET, &uri, Some(&t1), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_admin_routes_require_flags() {
    let ctx = TestContext::new().await.unwrap();
    let (plain, plain_token) = ctx.account().await.unwrap();
    let (_, staff_token) = ctx.staff_account().await.unwrap();
    let (_, super_token) = ctx.superuser_account().await.unwrap();

    let (status, _) = ctx.send(Method::GET, "/admin/users/", Some(&plain_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = ctx.send(Method::GET, "/admin/users/", Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(users.as_array().unwrap().iter().any(|u| u["email"] == plain.email));

    let uri = format!("/admin/users/{}/", plain.id);
    let (status, _) = ctx
        .send(Method::PATCH, &uri, Some(&staff_token), Some(json!({ "is_active": false })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(Method::PATCH, &uri, Some(&super_token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .send(Method::PATCH, &uri, Some(&super_token), Some(json!({ "is_active": false })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = ctx.send(Method::GET, "/users/me/", Some(&plain_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_health_connected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
