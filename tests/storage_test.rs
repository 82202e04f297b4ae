//! Store behavior on a real SQLite file

use boardhound::config::Config;
use boardhound::models::{CompanyBoard, Provider};
use boardhound::storage::{open_store, BoardStore, CountPredicate};
use tokio_test::assert_ok;

fn config_in(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.database.sqlite_path = dir.path().join("nested/boards.db");
    config
}

#[tokio::test]
async fn test_boards_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    {
        let store = assert_ok!(open_store(&config).await);
        let board = CompanyBoard::new("Acme", "https://jobs.lever.co/acme", Provider::Lever);
        assert!(assert_ok!(store.upsert_board_url(&board).await));
        assert!(assert_ok!(store.set_enabled("https://jobs.lever.co/acme", false).await));
    }

    let store = open_store(&config).await.unwrap();
    assert_eq!(store.count_where(CountPredicate::All).await.unwrap(), 1);
    assert_eq!(store.count_where(CountPredicate::Enabled).await.unwrap(), 0);
    assert_eq!(
        store.is_enabled("https://jobs.lever.co/acme").await.unwrap(),
        Some(false)
    );
}

#[tokio::test]
async fn test_upsert_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&config_in(&dir)).await.unwrap();

    let first = CompanyBoard::new("Acme", "https://boards.greenhouse.io/acme", Provider::Greenhouse);
    let renamed = CompanyBoard::new("Acme Corp", "https://boards.greenhouse.io/acme", Provider::Greenhouse);
    assert!(store.upsert_board_url(&first).await.unwrap());
    store.set_enabled(&first.url, false).await.unwrap();
    assert!(!store.upsert_board_url(&renamed).await.unwrap());

    // The disabled flag survives the second upsert
    assert_eq!(store.is_enabled(&first.url).await.unwrap(), Some(false));
}

#[tokio::test]
async fn test_custom_pages_query() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&config_in(&dir)).await.unwrap();
    for (slug, provider) in [("acme", Provider::Lever), ("beta", Provider::Greenhouse)] {
        store
            .upsert_board_url(&CompanyBoard::new(slug, provider.board_url(slug), provider))
            .await
            .unwrap();
    }

    let lever = store
        .query_urls("SELECT url FROM company_urls WHERE provider = 'lever'")
        .await
        .unwrap();
    assert_eq!(lever, vec!["https://jobs.lever.co/acme".to_string()]);
    assert!(store.query_urls("SELECT nope FROM nowhere").await.is_err());
}
