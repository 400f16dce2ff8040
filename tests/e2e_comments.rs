//! E2E tests for comment operations (creating, tree fetching, deleting, liking)

mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn test_create_comment_without_auth() {
    let server = TestServer::new().await;

    let comment_data = serde_json::json!({
        "text": "Great post!",
        "postId": "p1"
    });

    let response = server
        .client
        .post(server.url("/comments"))
        .json(&comment_data)
        .send()
        .await
        .unwrap();

    // Should return 401 Unauthorized
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_comment_and_reply_on_post() {
    let server = TestServer::new().await;
    let user = server.create_user("gridiron").await;
    let token = server.create_token(&user).await;

    // Top-level comment with an explicit post target
    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "Great post!", "postId": "p1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let comment: Value = response.json().await.unwrap();
    assert!(comment.get("_id").is_some());
    assert_eq!(comment["postId"], "p1");
    assert!(comment["videoId"].is_null());
    assert_eq!(comment["content"], "Great post!");
    assert_eq!(comment["replies"], serde_json::json!([]));
    assert_eq!(comment["likes"], serde_json::json!([]));
    assert_eq!(comment["author"]["username"], "gridiron");

    let parent_id = comment["_id"].as_str().unwrap().to_string();

    // Reply carries only parentId; the post target is inherited
    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "Agreed", "parentId": parent_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["postId"], "p1");
    assert_eq!(reply["parentId"], parent_id);

    // Tree fetch is public and nests the reply
    let response = server
        .client
        .get(server.url("/comments/post/p1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let tree: Value = response.json().await.unwrap();
    let top_level = tree.as_array().unwrap();
    assert_eq!(top_level.len(), 1);
    assert_eq!(top_level[0]["_id"], parent_id);
    let replies = top_level[0]["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["content"], "Agreed");
}

#[tokio::test]
async fn test_video_comment_tree() {
    let server = TestServer::new().await;
    let user = server.create_user("replayer").await;
    let token = server.create_token(&user).await;

    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "What a goal", "videoId": "v42" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let comment: Value = response.json().await.unwrap();
    assert_eq!(comment["videoId"], "v42");
    assert!(comment["postId"].is_null());

    let response = server
        .client
        .get(server.url("/comments/v42"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let tree: Value = response.json().await.unwrap();
    assert_eq!(tree.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_comment_validation() {
    let server = TestServer::new().await;
    let user = server.create_user("strict").await;
    let token = server.create_token(&user).await;

    // Missing target
    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "floating" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Empty text
    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "   ", "postId": "p1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Both targets at once
    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "both", "postId": "p1", "videoId": "v1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Unknown parent
    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "text": "orphan", "parentId": "missing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_delete_comment_author_only() {
    let server = TestServer::new().await;
    let author = server.create_user("author").await;
    let author_token = server.create_token(&author).await;
    let rival = server.create_user("rival").await;
    let rival_token = server.create_token(&rival).await;

    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", author_token))
        .json(&serde_json::json!({ "text": "parent", "postId": "p7" }))
        .send()
        .await
        .unwrap();
    let parent: Value = response.json().await.unwrap();
    let parent_id = parent["_id"].as_str().unwrap().to_string();

    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", rival_token))
        .json(&serde_json::json!({ "text": "reply", "parentId": parent_id }))
        .send()
        .await
        .unwrap();
    let reply: Value = response.json().await.unwrap();
    let reply_id = reply["_id"].as_str().unwrap().to_string();

    // Non-author cannot delete
    let response = server
        .client
        .delete(server.url(&format!("/comments/{}", parent_id)))
        .header("Authorization", format!("Bearer {}", rival_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Author can
    let response = server
        .client
        .delete(server.url(&format!("/comments/{}", parent_id)))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let deleted: Value = response.json().await.unwrap();
    assert_eq!(deleted["deleted"], true);

    // The former reply is promoted to top level
    let response = server
        .client
        .get(server.url("/comments/post/p7"))
        .send()
        .await
        .unwrap();
    let tree: Value = response.json().await.unwrap();
    let top_level = tree.as_array().unwrap();
    assert_eq!(top_level.len(), 1);
    assert_eq!(top_level[0]["_id"], reply_id);

    // Deleting a missing comment is 404
    let response = server
        .client
        .delete(server.url(&format!("/comments/{}", parent_id)))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_toggle_like_roundtrip() {
    let server = TestServer::new().await;
    let author = server.create_user("poster").await;
    let author_token = server.create_token(&author).await;
    let fan = server.create_user("fan").await;
    let fan_token = server.create_token(&fan).await;

    let response = server
        .client
        .post(server.url("/comments"))
        .header("Authorization", format!("Bearer {}", author_token))
        .json(&serde_json::json!({ "text": "likeable", "videoId": "v1" }))
        .send()
        .await
        .unwrap();
    let comment: Value = response.json().await.unwrap();
    let comment_id = comment["_id"].as_str().unwrap().to_string();

    let response = server
        .client
        .patch(server.url(&format!("/comments/{}/like", comment_id)))
        .header("Authorization", format!("Bearer {}", fan_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let like: Value = response.json().await.unwrap();
    assert_eq!(like["likes"], 1);
    assert_eq!(like["liked"], true);

    // Liker shows up in the tree
    let response = server
        .client
        .get(server.url("/comments/v1"))
        .send()
        .await
        .unwrap();
    let tree: Value = response.json().await.unwrap();
    assert_eq!(tree[0]["likes"], serde_json::json!([fan.id]));

    // Second toggle restores the original state
    let response = server
        .client
        .patch(server.url(&format!("/comments/{}/like", comment_id)))
        .header("Authorization", format!("Bearer {}", fan_token))
        .send()
        .await
        .unwrap();
    let like: Value = response.json().await.unwrap();
    assert_eq!(like["likes"], 0);
    assert_eq!(like["liked"], false);

    // Unknown comment is 404
    let response = server
        .client
        .patch(server.url("/comments/missing/like"))
        .header("Authorization", format!("Bearer {}", fan_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
