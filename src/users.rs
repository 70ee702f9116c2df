//! Per-user and batch-user drivers
//!
//! Two shapes over the same fetch loop: one request per known user ID, and
//! one request per block of synthetic IDs when sampling the ID space
//! without a leaderboard to start from.

use crate::client::{ApiClient, RequestDescriptor};
use crate::config::SampleConfig;
use crate::error::Result;
use crate::models::{BatchUsersResponse, Gamemode, User, UserId};

/// Fetch each user's full profile, preserving input order
pub async fn fetch_users(
    client: &ApiClient,
    gamemode: Gamemode,
    ids: &[UserId],
) -> Result<Vec<User>> {
    let mut users = Vec::with_capacity(ids.len());

    for &id in ids {
        tracing::info!(user = %id, "pulling user");
        let request = RequestDescriptor::new(format!("users/{}/{}", id, gamemode.api_name()))
            .query("key", "id");
        users.push(client.fetch::<User>(&request).await?);
    }

    Ok(users)
}

/// Number of blocks the sampling scheme produces
pub fn sample_block_count(scheme: &SampleConfig) -> u64 {
    scheme.max_user_id / scheme.stride / scheme.batch_size as u64
}

/// The synthetic IDs of one sampling block
///
/// Block `index` starts at `stride * batch_size * index` and takes every
/// `stride`-th ID from there, `batch_size` of them.
pub fn sample_block(scheme: &SampleConfig, index: u64) -> Vec<UserId> {
    let start = scheme.stride * scheme.batch_size as u64 * index;
    (0..scheme.batch_size as u64)
        .map(|j| UserId(start + scheme.stride * j))
        .collect()
}

/// Pull a fixed-stride sample of the user ID space through the batch endpoint
///
/// A block whose response carries no users contributes zero records and
/// does not abort the blocks after it; most synthetic IDs simply do not
/// exist.
pub async fn fetch_user_sample(client: &ApiClient, scheme: &SampleConfig) -> Result<Vec<User>> {
    let blocks = sample_block_count(scheme);
    let mut users = Vec::new();

    for index in 0..blocks {
        let ids = sample_block(scheme, index);
        let mut request = RequestDescriptor::new("users");
        for id in &ids {
            request = request.query("ids[]", id);
        }

        tracing::info!(
            block = index,
            of = blocks,
            first_id = scheme.stride * scheme.batch_size as u64 * index,
            "pulling user batch"
        );
        let body: BatchUsersResponse = client.fetch(&request).await?;
        if body.users.is_empty() {
            tracing::warn!(block = index, "batch yielded no users, skipping");
            continue;
        }
        users.extend(body.users);
    }

    tracing::info!(count = users.len(), "sample pull complete");
    Ok(users)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, TokenCell, TokenProvider};
    use crate::config::RetryConfig;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticProvider;

    #[async_trait]
    impl TokenProvider for StaticProvider {
        async fn issue_token(&self) -> crate::error::Result<AccessToken> {
            Ok(AccessToken::new("static"))
        }
    }

    fn test_client(server: &MockServer) -> ApiClient {
        ApiClient::with_token_cell(
            server.uri(),
            TokenCell::new(AccessToken::new("static")),
            Arc::new(StaticProvider),
            RetryConfig {
                max_attempts: 1,
                backoff_unit: Duration::from_millis(1),
                max_delay: Duration::from_millis(10),
            },
        )
    }

    #[test]
    fn default_scheme_produces_the_expected_block_count() {
        let scheme = SampleConfig::default();
        assert_eq!(sample_block_count(&scheme), 189_500);
    }

    #[test]
    fn sample_blocks_stride_without_overlap() {
        let scheme = SampleConfig {
            max_user_id: 37_900_000,
            stride: 4,
            batch_size: 50,
        };

        let first = sample_block(&scheme, 0);
        assert_eq!(first.len(), 50);
        assert_eq!(first[0], UserId(0));
        assert_eq!(first[1], UserId(4));
        assert_eq!(first[49], UserId(196));

        let second = sample_block(&scheme, 1);
        assert_eq!(second[0], UserId(200), "blocks are contiguous in ID space");
    }

    #[tokio::test]
    async fn fetch_users_preserves_input_order() {
        let server = MockServer::start().await;
        for id in [7_u64, 3, 11] {
            Mock::given(method("GET"))
                .and(path(format!("/users/{id}/osu")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": id})),
                )
                .mount(&server)
                .await;
        }

        let client = test_client(&server);
        let ids = vec![UserId(7), UserId(3), UserId(11)];
        let users = fetch_users(&client, Gamemode::Osu, &ids).await.unwrap();

        let got: Vec<UserId> = users.iter().map(|u| u.id).collect();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn empty_batch_is_skipped_without_aborting_later_blocks() {
        let server = MockServer::start().await;
        // First block comes back empty, the second carries two users.
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"users": []})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"users": [{"id": 8}, {"id": 12}]}),
            ))
            .mount(&server)
            .await;

        let scheme = SampleConfig {
            max_user_id: 40,
            stride: 2,
            batch_size: 10,
        };
        assert_eq!(sample_block_count(&scheme), 2);

        let client = test_client(&server);
        let users = fetch_user_sample(&client, &scheme).await.unwrap();

        let got: Vec<UserId> = users.iter().map(|u| u.id).collect();
        assert_eq!(got, vec![UserId(8), UserId(12)]);
    }
}
