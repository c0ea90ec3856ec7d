mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_post(
    server: &common::TestServer,
    client: &reqwest::Client,
    token: &str,
    parent: Option<Uuid>,
    title: &str,
) -> Result<Value> {
    let mut url = server.url("/api/v1/posts");
    if let Some(parent) = parent {
        url = format!("{}?parent_id={}", url, parent);
    }

    let res = client
        .post(url)
        .bearer_auth(token)
        .json(&json!({"title": title, "content": "body text"}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());

    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

fn id_of(post: &Value) -> Uuid {
    Uuid::parse_str(post["id"].as_str().expect("id")).expect("uuid")
}

#[tokio::test]
async fn posts_replies_and_listings() -> Result<()> {
    if common::database().await?.is_none() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let author = common::register_and_login(server, &client).await?;

    let post = create_post(server, &client, &author.token, None, "first").await?;
    assert_eq!(post["user_id"], author.id.to_string());
    assert!(post.get("parent_id").is_none());

    let reply = create_post(server, &client, &author.token, Some(id_of(&post)), "re: first").await?;
    assert_eq!(reply["parent_id"], post["id"]);

    let comments: Value = client
        .get(server.url(&format!("/api/v1/posts/{}/comments", id_of(&post))))
        .send()
        .await?
        .json()
        .await?;
    let comments = comments["data"].as_array().expect("array");
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], reply["id"]);
    assert_eq!(comments[0]["username"], author.username);

    // Newest first
    let mine: Value = client
        .get(server.url(&format!("/api/v1/posts?user_id={}", author.id)))
        .send()
        .await?
        .json()
        .await?;
    let mine = mine["data"].as_array().expect("array");
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0]["id"], reply["id"]);
    assert_eq!(mine[1]["id"], post["id"]);

    let page_two: Value = client
        .get(server.url(&format!("/api/v1/posts?user_id={}&page=2&limit=1", author.id)))
        .send()
        .await?
        .json()
        .await?;
    let page_two = page_two["data"].as_array().expect("array");
    assert_eq!(page_two.len(), 1);
    assert_eq!(page_two[0]["id"], post["id"]);
    Ok(())
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() -> Result<()> {
    if common::database().await?.is_none() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let author = common::register_and_login(server, &client).await?;
    let stranger = common::register_and_login(server, &client).await?;

    let post = create_post(server, &client, &author.token, None, "mine").await?;
    let path = format!("/api/v1/posts/{}", id_of(&post));

    let res = client
        .patch(server.url(&path))
        .bearer_auth(&stranger.token)
        .json(&json!({"title": "hijacked"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(server.url(&path)).bearer_auth(&stranger.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Same response as for a post that does not exist at all
    let missing = format!("/api/v1/posts/{}", Uuid::new_v4());
    let res_missing = client.delete(server.url(&missing)).bearer_auth(&stranger.token).send().await?;
    assert_eq!(res_missing.status(), StatusCode::NOT_FOUND);

    let res = client
        .patch(server.url(&path))
        .bearer_auth(&author.token)
        .json(&json!({"title": "mine, edited"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let listing: Value = client
        .get(server.url(&format!("/api/v1/posts?user_id={}", author.id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listing["data"][0]["title"], "mine, edited");

    let res = client.delete(server.url(&path)).bearer_auth(&author.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn reply_to_missing_parent_is_not_found() -> Result<()> {
    if common::database().await?.is_none() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let author = common::register_and_login(server, &client).await?;

    let res = client
        .post(format!("{}?parent_id={}", server.url("/api/v1/posts"), Uuid::new_v4()))
        .bearer_auth(&author.token)
        .json(&json!({"title": "orphan", "content": ""}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
