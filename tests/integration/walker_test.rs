//! Prefix walker integration tests using LocalStack.
//!
//! These tests verify that the walker finds the first file key through the
//! real ListObjectsV2 API, including pagination and nested prefixes.

use crate::common::LocalStackTestContext;
use sp_error::{ListingError, SpError};
use sp_walker::{
    ListingService, PrefixWalker, RetryConfig, S3Config, S3Lister, WalkerConfig,
    create_s3_client,
};

async fn lister_for(ctx: &LocalStackTestContext, bucket: &str, page_size: i32) -> S3Lister {
    let s3_config = S3Config::new(bucket)
        .with_endpoint(&ctx.endpoint)
        .with_region(&ctx.region)
        .with_credentials("test", "test");

    let client = create_s3_client(&s3_config).await.unwrap();

    S3Lister::new(client)
        .with_page_size(page_size)
        .with_retry(RetryConfig::none())
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_walk_finds_nested_file() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "sp-walker-nested";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_keys(
        bucket,
        &["a/", "a/README", "a/b/notes", "c/d/report.csv", "c/e/other.csv"],
    )
    .await
    .unwrap();

    let lister = lister_for(&ctx, bucket, 1000).await;
    let walker = PrefixWalker::new(lister, bucket, WalkerConfig::new());
    let report = walker.walk("").await.unwrap();

    assert_eq!(report.key, Some("c/d/report.csv".to_string()));
    assert!(report.stats.denied_prefixes.is_empty());

    ctx.empty_bucket(bucket).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_walk_follows_pagination() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "sp-walker-pages";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_keys(bucket, &["a/deep.txt", "m", "n", "z.txt"])
        .await
        .unwrap();

    // With one key per page, "z.txt" sits on the last root page, and must be
    // found before "a/" is entered
    let lister = lister_for(&ctx, bucket, 1).await;
    let walker = PrefixWalker::new(lister, bucket, WalkerConfig::new());
    let report = walker.walk("").await.unwrap();

    assert_eq!(report.key, Some("z.txt".to_string()));
    assert_eq!(report.stats.prefixes_visited, 1);
    assert_eq!(report.stats.pages_fetched, 4);

    ctx.empty_bucket(bucket).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_walk_from_prefix_without_files() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "sp-walker-nofiles";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_keys(bucket, &["logs/", "logs/2024/", "logs/2024/LATEST", "other.txt"])
        .await
        .unwrap();

    let lister = lister_for(&ctx, bucket, 1000).await;
    let walker = PrefixWalker::new(lister, bucket, WalkerConfig::new());
    let key = walker.find_first_file_key("logs/").await.unwrap();

    assert!(key.is_none());

    ctx.empty_bucket(bucket).await.ok();
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_is_a_service_error() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "sp-walker-does-not-exist";
    let lister = lister_for(&ctx, bucket, 1000).await;

    let err = lister.list_page(bucket, "", None).await.unwrap_err();
    assert!(matches!(err, ListingError::Service { ref code, .. } if code == "NoSuchBucket"));

    let walker = PrefixWalker::new(lister, bucket, WalkerConfig::new());
    let err = walker.walk("").await.unwrap_err();
    assert!(matches!(err, SpError::Listing(ListingError::Service { .. })));
}
