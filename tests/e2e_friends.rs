//! E2E tests for the friend request flow

mod common;

use common::TestServer;
use serde_json::Value;

#[tokio::test]
async fn test_send_friend_request_without_auth() {
    let server = TestServer::new().await;
    let target = server.create_user("target").await;

    let response = server
        .client
        .post(server.url(&format!("/friends/{}", target.id)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_send_request_validation() {
    let server = TestServer::new().await;
    let user = server.create_user("loner").await;
    let token = server.create_token(&user).await;

    // Cannot friend yourself
    let response = server
        .client
        .post(server.url(&format!("/friends/{}", user.id)))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Unknown target user
    let response = server
        .client
        .post(server.url("/friends/ghost"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_request_accept_flow() {
    let server = TestServer::new().await;
    let u1 = server.create_user("u1").await;
    let u1_token = server.create_token(&u1).await;
    let u2 = server.create_user("u2").await;
    let u2_token = server.create_token(&u2).await;

    // U1 sends a request to U2
    let response = server
        .client
        .post(server.url(&format!("/friends/{}", u2.id)))
        .header("Authorization", format!("Bearer {}", u1_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let relationship: Value = response.json().await.unwrap();
    assert_eq!(relationship["status"], "pending");

    // U2 sees it incoming, U1 sees it sent
    let incoming: Value = server
        .client
        .get(server.url("/friends/requests"))
        .header("Authorization", format!("Bearer {}", u2_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(incoming.as_array().unwrap().len(), 1);
    assert_eq!(incoming[0]["_id"], u1.id);

    let sent: Value = server
        .client
        .get(server.url("/friends/sent"))
        .header("Authorization", format!("Bearer {}", u1_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sent.as_array().unwrap().len(), 1);
    assert_eq!(sent[0]["_id"], u2.id);

    // Duplicate send conflicts and changes nothing
    let response = server
        .client
        .post(server.url(&format!("/friends/{}", u2.id)))
        .header("Authorization", format!("Bearer {}", u1_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let incoming: Value = server
        .client
        .get(server.url("/friends/requests"))
        .header("Authorization", format!("Bearer {}", u2_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(incoming.as_array().unwrap().len(), 1);

    // U2 accepts
    let response = server
        .client
        .post(server.url(&format!("/friends/accept/{}", u1.id)))
        .header("Authorization", format!("Bearer {}", u2_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let relationship: Value = response.json().await.unwrap();
    assert_eq!(relationship["status"], "friend");

    // Friend lists are symmetric, pending sets are empty
    let u1_friends: Value = server
        .client
        .get(server.url("/friends"))
        .header("Authorization", format!("Bearer {}", u1_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(u1_friends[0]["_id"], u2.id);

    let u2_friends: Value = server
        .client
        .get(server.url("/friends"))
        .header("Authorization", format!("Bearer {}", u2_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(u2_friends[0]["_id"], u1.id);

    let incoming: Value = server
        .client
        .get(server.url("/friends/requests"))
        .header("Authorization", format!("Bearer {}", u2_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(incoming.as_array().unwrap().is_empty());

    // Accepting again conflicts
    let response = server
        .client
        .post(server.url(&format!("/friends/accept/{}", u1.id)))
        .header("Authorization", format!("Bearer {}", u2_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_decline_and_reject_alias() {
    let server = TestServer::new().await;
    let sender = server.create_user("sender").await;
    let sender_token = server.create_token(&sender).await;
    let receiver = server.create_user("receiver").await;
    let receiver_token = server.create_token(&receiver).await;

    server
        .client
        .post(server.url(&format!("/friends/{}", receiver.id)))
        .header("Authorization", format!("Bearer {}", sender_token))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .post(server.url(&format!("/friends/decline/{}", sender.id)))
        .header("Authorization", format!("Bearer {}", receiver_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let relationship: Value = response.json().await.unwrap();
    assert_eq!(relationship["status"], "none");

    // No friendship was created on either side
    let friends: Value = server
        .client
        .get(server.url("/friends"))
        .header("Authorization", format!("Bearer {}", receiver_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(friends.as_array().unwrap().is_empty());

    // Declining with nothing pending is a no-op, via the reject alias
    let response = server
        .client
        .post(server.url(&format!("/friends/reject/{}", sender.id)))
        .header("Authorization", format!("Bearer {}", receiver_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
