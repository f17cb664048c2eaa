//! Property tests for both storage strategies, and durability of the
//! file-backed `SQLite` store across reopen.

use proptest::prelude::*;
use rstest::rstest;

use todo_service::domain::{Description, Item, ItemId};
use todo_service::infrastructure::{
    InMemoryItemRepository, ItemRepository, RepositoryError, SqliteItemRepository,
};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn description_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!&<>]{1,24}"
}

async fn save_all(repository: &dyn ItemRepository, texts: &[String]) {
    for text in texts {
        repository
            .create(&Description::parse(text.clone()).unwrap())
            .await
            .unwrap();
    }
}

fn texts(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.description.as_str().to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn in_memory_lists_in_insertion_order(
        inputs in proptest::collection::vec(description_strategy(), 0..16)
    ) {
        let items = runtime().block_on(async {
            let repository = InMemoryItemRepository::new();
            save_all(&repository, &inputs).await;
            repository.list_all().await.unwrap()
        });

        prop_assert_eq!(texts(&items), inputs);
        for (position, item) in items.iter().enumerate() {
            prop_assert_eq!(item.id.value(), i64::try_from(position).unwrap());
        }
    }

    #[test]
    fn sqlite_lists_in_insertion_order(
        inputs in proptest::collection::vec(description_strategy(), 0..16)
    ) {
        let items = runtime().block_on(async {
            let repository = SqliteItemRepository::connect("sqlite::memory:").await.unwrap();
            save_all(&repository, &inputs).await;
            repository.list_all().await.unwrap()
        });

        prop_assert_eq!(texts(&items), inputs);
        prop_assert!(items.windows(2).all(|pair| pair[0].id.value() < pair[1].id.value()));
    }

    #[test]
    fn in_memory_delete_shifts_later_positions(
        (inputs, removed) in proptest::collection::vec(description_strategy(), 1..16)
            .prop_flat_map(|inputs| {
                let length = inputs.len();
                (Just(inputs), 0..length)
            })
    ) {
        let items = runtime().block_on(async {
            let repository = InMemoryItemRepository::new();
            save_all(&repository, &inputs).await;
            repository
                .delete_by_id(ItemId::new(i64::try_from(removed).unwrap()))
                .await
                .unwrap();
            repository.list_all().await.unwrap()
        });

        let mut expected = inputs.clone();
        expected.remove(removed);
        prop_assert_eq!(texts(&items), expected);
        for (position, item) in items.iter().enumerate() {
            prop_assert_eq!(item.id.value(), i64::try_from(position).unwrap());
        }
    }

    #[test]
    fn sqlite_delete_keeps_other_keys(
        (inputs, removed) in proptest::collection::vec(description_strategy(), 1..16)
            .prop_flat_map(|inputs| {
                let length = inputs.len();
                (Just(inputs), 0..length)
            })
    ) {
        let (before, after, removed_key) = runtime().block_on(async {
            let repository = SqliteItemRepository::connect("sqlite::memory:").await.unwrap();
            save_all(&repository, &inputs).await;
            let before = repository.list_all().await.unwrap();
            let removed_key = before[removed].id;
            repository.delete_by_id(removed_key).await.unwrap();
            (before, repository.list_all().await.unwrap(), removed_key)
        });

        let expected: Vec<Item> = before
            .into_iter()
            .filter(|item| item.id != removed_key)
            .collect();
        prop_assert_eq!(after, expected);
    }
}

// =============================================================================
// File-backed durability
// =============================================================================

#[rstest]
#[tokio::test]
async fn sqlite_file_keeps_items_and_keys_across_reopen() {
    let directory = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        directory.path().join("todo.db").display()
    );

    {
        let repository = SqliteItemRepository::connect(&url).await.unwrap();
        save_all(
            &repository,
            &["a".to_string(), "b".to_string(), "c".to_string()],
        )
        .await;
        repository.delete_by_id(ItemId::new(3)).await.unwrap();
        repository.close().await;
    }

    let reopened = SqliteItemRepository::connect(&url).await.unwrap();
    let items = reopened.list_all().await.unwrap();
    assert_eq!(texts(&items), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        items.iter().map(|item| item.id.value()).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let created = reopened
        .create(&Description::parse("d").unwrap())
        .await
        .unwrap();
    assert_eq!(created.id.value(), 4);

    assert_eq!(
        reopened.delete_by_id(ItemId::new(3)).await,
        Err(RepositoryError::NotFound("todo 3".to_string()))
    );
    reopened.close().await;
}
