//! E2E tests for bearer-token authentication

mod common;

use common::TestServer;

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/friends"))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let server = TestServer::new().await;
    let user = server.create_user("cookiefan").await;
    let token = server.create_token(&user).await;

    let response = server
        .client
        .get(server.url("/friends"))
        .header("Cookie", format!("session={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_revoked_token_is_rejected() {
    let server = TestServer::new().await;
    let user = server.create_user("revoked").await;
    let token = server.create_token(&user).await;

    let response = server
        .client
        .get(server.url("/friends"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    server.state.db.revoke_auth_token(&token).await.unwrap();

    let response = server
        .client
        .get(server.url("/friends"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
