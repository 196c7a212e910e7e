mod common;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use common::{harness, Call, FakeGateway};
use dummydash::cache::{self, CacheBridge, SqliteCache};
use dummydash::config::Config;
use dummydash::db;
use dummydash::gateway::{GatewayError, RemoteGateway};
use dummydash::resources::{
    CommentDraft, CommentEdit, Difficulty, Post, PostDraft, Product, Reactions, Recipe,
    RecipeDraft, Resource, TagSet, Todo, TodoDraft, ValidationError,
};
use dummydash::sync::{Found, ResourceSync, RowStatus, SyncError};

fn seeded_todos() -> Arc<FakeGateway> {
    let gateway = FakeGateway::new();
    gateway.set_list(
        Resource::Todos,
        vec![
            common::todo(1, "Water plants", false, 3),
            common::todo(3, "Call mom", true, 4),
            common::todo(5, "Fix bike", false, 5),
        ],
    );
    gateway
}

#[tokio::test]
async fn first_load_fetches_then_cache_answers() {
    let h = harness(seeded_todos());

    let first = h.sync.collection::<Todo>().await.unwrap();
    assert_eq!(first.records.len(), 3);
    assert_eq!(h.gateway.list_calls(Resource::Todos), 1);

    let second = h.sync.collection::<Todo>().await.unwrap();
    assert_eq!(second.records, first.records);
    assert_eq!(
        h.gateway.list_calls(Resource::Todos),
        1,
        "cached snapshot should be authoritative"
    );
    assert_eq!(h.cache.keys().await, vec!["dummyjson_todos".to_string()]);
}

#[tokio::test]
async fn first_load_uses_configured_limit() {
    let h = harness(seeded_todos());
    h.sync.collection::<Todo>().await.unwrap();

    match &h.gateway.calls()[0] {
        Call::List(Resource::Todos, paging) => {
            assert_eq!(paging.limit, 30);
            assert_eq!(paging.skip, 0);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn create_without_remote_id_uses_next_local_id() {
    let h = harness(seeded_todos());
    let draft = TodoDraft {
        todo: "Buy milk".into(),
        completed: false,
        user_id: 2,
    };

    let created = h.sync.create(&draft).await.unwrap();
    assert_eq!(created.id, 6);
    assert_eq!(created.todo, "Buy milk");
    assert_eq!(created.user_id, 2);
    assert!(!created.completed);

    let stored = cache::load::<Todo>(&*h.cache).await.unwrap().unwrap();
    assert_eq!(stored.records.len(), 4);
    assert_eq!(stored.records[0], created, "new records go first");

    let sent = h.gateway.calls().into_iter().find_map(|c| match c {
        Call::Add(Resource::Todos, body) => Some(body),
        _ => None,
    });
    assert_eq!(
        sent,
        Some(json!({ "todo": "Buy milk", "completed": false, "userId": 2 }))
    );
}

#[tokio::test]
async fn create_uses_fresh_remote_id() {
    let h = harness(seeded_todos());
    h.gateway.assign_id(Resource::Todos, 255);

    let created = h
        .sync
        .create(&TodoDraft {
            todo: "Read".into(),
            ..TodoDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 255);
}

#[tokio::test]
async fn colliding_remote_id_is_replaced() {
    let h = harness(seeded_todos());
    h.gateway.assign_id(Resource::Todos, 3);

    let created = h
        .sync
        .create(&TodoDraft {
            todo: "Read".into(),
            ..TodoDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 6);

    let ids: Vec<u64> = h
        .sync
        .collection::<Todo>()
        .await
        .unwrap()
        .records
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![6, 1, 3, 5]);
}

#[tokio::test]
async fn invalid_draft_never_reaches_remote() {
    let h = harness(seeded_todos());
    let err = h
        .sync
        .create(&TodoDraft {
            todo: "   ".into(),
            ..TodoDraft::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::Empty("Todo"))
    ));
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn update_keeps_fields_the_form_does_not_carry() {
    let gateway = FakeGateway::new();
    gateway.set_list(Resource::Posts, vec![common::post(1, "Old title")]);
    let h = harness(gateway);

    let original = h.sync.find::<Post>(1).await.unwrap();
    let mut draft = PostDraft::from(&original);
    draft.title = "New title".into();
    draft.tags = TagSet::parse("history, travel");

    let updated = h.sync.update(1, &draft).await.unwrap();
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.tags, vec!["history", "travel"]);
    assert_eq!(updated.views, Some(305));
    assert_eq!(updated.reactions.total(), 15);
    assert!(matches!(updated.reactions, Reactions::Breakdown(_)));

    let stored = h.sync.find::<Post>(1).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let h = harness(seeded_todos());
    let err = h
        .sync
        .update(
            42,
            &TodoDraft {
                todo: "Ghost".into(),
                ..TodoDraft::default()
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No todo with id 42");
    assert_eq!(h.gateway.write_calls(), 0);
}

#[tokio::test]
async fn locally_created_records_can_be_edited_and_deleted() {
    let h = harness(seeded_todos());
    let created = h
        .sync
        .create(&TodoDraft {
            todo: "Local only".into(),
            ..TodoDraft::default()
        })
        .await
        .unwrap();

    // The remote side answers 404 for this id; the local change stands.
    let edited = h
        .sync
        .update(
            created.id,
            &TodoDraft {
                todo: "Still local".into(),
                completed: true,
                user_id: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.todo, "Still local");
    assert!(edited.completed);

    h.sync.delete::<Todo>(created.id).await.unwrap();
    let remaining = h.sync.collection::<Todo>().await.unwrap().records;
    assert!(remaining.iter().all(|t| t.id != created.id));
}

#[tokio::test]
async fn delete_removes_from_persisted_snapshot() {
    let h = harness(seeded_todos());
    h.sync.delete::<Todo>(3).await.unwrap();

    let stored = cache::load::<Todo>(&*h.cache).await.unwrap().unwrap();
    let ids: Vec<u64> = stored.records.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(h.sync.flags().get(Resource::Todos, 3).await, RowStatus::Idle);
}

#[tokio::test]
async fn deleting_an_absent_id_is_a_no_op() {
    let h = harness(seeded_todos());
    h.sync.delete::<Todo>(3).await.unwrap();
    h.sync.delete::<Todo>(3).await.unwrap();

    let deletes = h
        .gateway
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Delete(..)))
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn remote_failure_leaves_cache_and_flags_row() {
    let h = harness(seeded_todos());
    let before = h.sync.collection::<Todo>().await.unwrap().records;
    h.gateway.fail(Resource::Todos, 500);

    let err = h.sync.delete::<Todo>(1).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Gateway(GatewayError::Status { status: 500, .. })
    ));
    assert_eq!(h.sync.flags().get(Resource::Todos, 1).await, RowStatus::Failed);

    let after = cache::load::<Todo>(&*h.cache).await.unwrap().unwrap();
    assert_eq!(after.records, before);

    h.gateway.recover(Resource::Todos);
    h.sync.delete::<Todo>(1).await.unwrap();
    assert_eq!(h.sync.flags().get(Resource::Todos, 1).await, RowStatus::Idle);
}

#[tokio::test]
async fn failed_update_keeps_original_record() {
    let h = harness(seeded_todos());
    h.sync.collection::<Todo>().await.unwrap();
    h.gateway.fail(Resource::Todos, 503);

    let result = h
        .sync
        .update(
            1,
            &TodoDraft {
                todo: "Changed".into(),
                ..TodoDraft::default()
            },
        )
        .await;
    assert!(result.is_err());
    assert_eq!(h.sync.find::<Todo>(1).await.unwrap().todo, "Water plants");
}

#[tokio::test]
async fn toggle_twice_restores_completion() {
    let h = harness(seeded_todos());

    let once = h.sync.toggle_todo(1).await.unwrap();
    assert!(once.completed);
    let twice = h.sync.toggle_todo(1).await.unwrap();
    assert!(!twice.completed);

    let bodies: Vec<_> = h
        .gateway
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Update(Resource::Todos, 1, body) => Some(body),
            _ => None,
        })
        .collect();
    assert_eq!(
        bodies,
        vec![json!({ "completed": true }), json!({ "completed": false })]
    );
}

#[tokio::test]
async fn refresh_discards_local_changes() {
    let h = harness(seeded_todos());
    h.sync.delete::<Todo>(1).await.unwrap();
    assert_eq!(h.sync.collection::<Todo>().await.unwrap().records.len(), 2);

    let fresh = h.sync.refresh::<Todo>().await.unwrap();
    assert_eq!(fresh.records.len(), 3);
    assert_eq!(h.gateway.list_calls(Resource::Todos), 2);
}

#[tokio::test]
async fn failed_first_load_persists_nothing() {
    let gateway = seeded_todos();
    gateway.fail(Resource::Todos, 500);
    let h = harness(gateway);

    assert!(h.sync.collection::<Todo>().await.is_err());
    assert!(h.cache.keys().await.is_empty());
}

#[tokio::test]
async fn malformed_list_items_are_skipped() {
    let gateway = FakeGateway::new();
    gateway.set_list(
        Resource::Todos,
        vec![
            common::todo(1, "Fine", false, 1),
            json!({ "id": 2, "completed": "nope" }),
        ],
    );
    let h = harness(gateway);

    let records = h.sync.collection::<Todo>().await.unwrap().records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 1);
}

#[tokio::test]
async fn users_failure_degrades_to_empty_list() {
    let gateway = seeded_todos();
    gateway.fail(Resource::Users, 500);
    let h = harness(gateway);

    let (todos, users) = h.sync.with_users::<Todo>().await.unwrap();
    assert_eq!(todos.records.len(), 3);
    assert!(users.is_empty());
}

#[tokio::test]
async fn users_are_loaded_alongside() {
    let gateway = seeded_todos();
    gateway.set_list(
        Resource::Users,
        vec![common::user(3, "emilys"), common::user(4, "michaelw")],
    );
    let h = harness(gateway);

    let (_, users) = h.sync.with_users::<Todo>().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].username, "michaelw");
}

#[tokio::test]
async fn recipe_edit_keeps_image_and_normalizes_ingredients() {
    let gateway = FakeGateway::new();
    gateway.set_list(Resource::Recipes, vec![common::recipe(1, "Pizza")]);
    let h = harness(gateway);

    let recipe = h.sync.find::<Recipe>(1).await.unwrap();
    assert_eq!(recipe.ingredients[0].name, "2 cups flour");
    assert_eq!(recipe.ingredients[0].quantity, "");
    assert_eq!(recipe.difficulty, Difficulty::Medium);

    let mut draft = RecipeDraft::from(&recipe);
    draft.image = None;
    draft.name = "Margherita".into();
    draft.add_ingredient("basil", "a handful").unwrap();

    let updated = h.sync.update(1, &draft).await.unwrap();
    assert_eq!(updated.name, "Margherita");
    assert_eq!(updated.ingredients.len(), 3);
    assert_eq!(updated.image.as_deref(), Some("https://cdn.example/pizza.webp"));
}

#[tokio::test]
async fn comment_create_and_edit() {
    let gateway = FakeGateway::new();
    gateway.set_list(
        Resource::Comments,
        vec![common::comment(1, "Nice one", "oliviaw")],
    );
    let h = harness(gateway);

    let created = h
        .sync
        .create(&CommentDraft {
            body: "Me too".into(),
            post_id: 1,
            user_id: 9,
            username: Some("jamesd".into()),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 2);
    assert_eq!(created.user.display_name(), "jamesd");

    let edited = h
        .sync
        .update(
            1,
            &CommentEdit {
                body: "Nice one!".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.body, "Nice one!");
    assert_eq!(edited.likes, 2);
    assert_eq!(edited.user.display_name(), "oliviaw");
}

#[tokio::test]
async fn lookup_falls_back_to_remote_without_caching() {
    let gateway = FakeGateway::new();
    gateway.set_list(Resource::Products, vec![common::product(1, "Lamp")]);
    let h = harness(gateway);
    h.sync.delete::<Product>(1).await.unwrap();

    // Gone locally, still known remotely.
    let fetched = h.sync.lookup::<Product>(1).await.unwrap();
    assert!(!fetched.is_cached());
    assert_eq!(fetched.into_record().title, "Lamp");
    assert!(h.sync.find::<Product>(1).await.unwrap_err().is_not_found());

    let missing = h.sync.lookup::<Product>(999).await.unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn lookup_prefers_cached_record() {
    let gateway = FakeGateway::new();
    gateway.set_list(Resource::Products, vec![common::product(1, "Lamp")]);
    let h = harness(gateway);

    match h.sync.lookup::<Product>(1).await.unwrap() {
        Found::Cached(product) => assert_eq!(product.title, "Lamp"),
        other => panic!("expected cached record, got {other:?}"),
    }
    assert!(!h.gateway.calls().iter().any(|c| matches!(c, Call::Fetch(..))));
}

#[tokio::test]
async fn row_is_pending_while_delete_is_in_flight() {
    let h = harness(seeded_todos());
    h.sync.collection::<Todo>().await.unwrap();
    let gate = h.gateway.hold(Resource::Todos, 1);

    let observe = async {
        while !h.gateway.calls().contains(&Call::Delete(Resource::Todos, 1)) {
            tokio::task::yield_now().await;
        }
        let during = h.sync.flags().get(Resource::Todos, 1).await;
        gate.notify_one();
        during
    };
    let (deleted, during) = tokio::join!(h.sync.delete::<Todo>(1), observe);

    deleted.unwrap();
    assert_eq!(during, RowStatus::Pending);
    assert_eq!(h.sync.flags().get(Resource::Todos, 1).await, RowStatus::Idle);
}

#[tokio::test]
async fn overlapping_deletes_both_stick() {
    let h = harness(seeded_todos());
    h.sync.collection::<Todo>().await.unwrap();
    let first = h.gateway.hold(Resource::Todos, 1);
    let second = h.gateway.hold(Resource::Todos, 3);

    // Release in the opposite order to the requests.
    let (a, b, ()) = tokio::join!(
        h.sync.delete::<Todo>(1),
        h.sync.delete::<Todo>(3),
        async {
            second.notify_one();
            first.notify_one();
        }
    );
    a.unwrap();
    b.unwrap();

    let ids: Vec<u64> = h
        .sync
        .collection::<Todo>()
        .await
        .unwrap()
        .records
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![5]);
    let stored = cache::load::<Todo>(&*h.cache).await.unwrap().unwrap();
    assert_eq!(stored.records.len(), 1);
}

#[tokio::test]
async fn toggle_and_create_overlapping_a_delete_keep_every_change() {
    let h = harness(seeded_todos());
    h.sync.collection::<Todo>().await.unwrap();
    let toggle_gate = h.gateway.hold(Resource::Todos, 1);
    let delete_gate = h.gateway.hold(Resource::Todos, 5);
    let draft = TodoDraft {
        todo: "Buy milk".into(),
        ..TodoDraft::default()
    };

    let (toggled, deleted, created, ()) = tokio::join!(
        h.sync.toggle_todo(1),
        h.sync.delete::<Todo>(5),
        h.sync.create(&draft),
        async {
            delete_gate.notify_one();
            toggle_gate.notify_one();
        }
    );
    assert!(toggled.unwrap().completed);
    deleted.unwrap();
    let created = created.unwrap();

    let records = h.sync.collection::<Todo>().await.unwrap().records;
    let ids: Vec<u64> = records.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![created.id, 1, 3]);
    assert!(records[1].completed);
}

#[tokio::test]
async fn sqlite_snapshot_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("cache.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let gateway = seeded_todos();
    let build = |gateway: Arc<FakeGateway>| {
        ResourceSync::new(
            Arc::new(SqliteCache::new(pool.clone())) as Arc<dyn CacheBridge>,
            gateway as Arc<dyn RemoteGateway>,
            Config::default().api.limits,
        )
    };

    let first = build(gateway.clone());
    first
        .create(&TodoDraft {
            todo: "Persist me".into(),
            ..TodoDraft::default()
        })
        .await
        .unwrap();

    let second = build(gateway.clone());
    let records = second.collection::<Todo>().await.unwrap().records;
    assert_eq!(records[0].todo, "Persist me");
    assert_eq!(records.len(), 4);
    assert_eq!(gateway.list_calls(Resource::Todos), 1);
}
