use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Barrier;

use quill_persist::{
    Draft, DraftService, DraftStore, DraftVersion, MemoryStore, NewVersion, PersistError,
    Principal, Result, ThreadService, ThreadStore, UpsertOutcome,
};

async fn setup() -> (Arc<MemoryStore>, DraftService, String) {
    let store = Arc::new(MemoryStore::new());
    let threads = ThreadService::new(store.clone());
    let thread = threads
        .create_thread(&Principal::new("u1"), None, None)
        .await
        .unwrap();
    let drafts = DraftService::new(store.clone(), store.clone());
    (store, drafts, thread.id)
}

#[tokio::test]
async fn test_create_defaults_title_from_first_line() {
    let (_, drafts, thread_id) = setup().await;
    let long_line = "x".repeat(120);
    let created = drafts
        .create(&thread_id, None, NewVersion::new(format!("{}\nbody", long_line)))
        .await
        .unwrap();

    assert_eq!(created.draft.current_version, 1);
    assert_eq!(created.version.version, 1);
    assert_eq!(created.draft.title.chars().count(), 80);
}

#[tokio::test]
async fn test_create_on_missing_thread() {
    let (_, drafts, _) = setup().await;
    let err = drafts.create("missing", None, NewVersion::new("hi")).await;
    assert!(matches!(err, Err(PersistError::ThreadNotFound(_))));
}

#[tokio::test]
async fn test_sequential_appends() {
    let (_, drafts, thread_id) = setup().await;
    let created = drafts
        .create(&thread_id, Some("Launch".into()), NewVersion::new("v1"))
        .await
        .unwrap();
    let id = created.draft.id;

    drafts
        .append_version(&id, NewVersion::new("v2").edit_prompt("shorter"))
        .await
        .unwrap();
    let third = drafts
        .append_version(&id, NewVersion::new("v3").changes(vec!["tone".into()]))
        .await
        .unwrap();

    assert_eq!(third.draft.current_version, 3);
    let versions: Vec<u32> = drafts
        .list_versions(&id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_overwrite_keeps_version_count() {
    let (_, drafts, thread_id) = setup().await;
    let id = drafts
        .create(&thread_id, None, NewVersion::new("first"))
        .await
        .unwrap()
        .draft
        .id;
    drafts.append_version(&id, NewVersion::new("second")).await.unwrap();

    let rewritten = drafts.overwrite_version(&id, None, "second, edited").await.unwrap();
    assert_eq!(rewritten.version, 2);

    let old = drafts.overwrite_version(&id, Some(1), "first, edited").await.unwrap();
    assert_eq!(old.content, "first, edited");

    let draft = drafts.get(&id).await.unwrap();
    assert_eq!(draft.current_version, 2);
    assert_eq!(drafts.list_versions(&id).await.unwrap().len(), 2);

    let missing = drafts.overwrite_version(&id, Some(9), "nope").await;
    assert!(matches!(missing, Err(PersistError::VersionNotFound { version: 9, .. })));
}

#[tokio::test]
async fn test_parent_message_backfill() {
    let (_, drafts, thread_id) = setup().await;
    let id = drafts
        .create(&thread_id, None, NewVersion::new("text"))
        .await
        .unwrap()
        .draft
        .id;

    drafts.set_parent_message(&id, None, "msg-1").await.unwrap();
    let version = drafts.get_version(&id, 1).await.unwrap();
    assert_eq!(version.parent_message_id.as_deref(), Some("msg-1"));

    let err = drafts.set_parent_message("ghost", None, "msg-1").await;
    assert!(matches!(err, Err(PersistError::DraftNotFound(_))));
}

#[tokio::test]
async fn test_rename_and_delete() {
    let (_, drafts, thread_id) = setup().await;
    let id = drafts
        .create(&thread_id, None, NewVersion::new("text"))
        .await
        .unwrap()
        .draft
        .id;

    assert_eq!(drafts.rename(&id, "  New name ").await.unwrap().title, "New name");
    assert!(matches!(drafts.rename(&id, " ").await, Err(PersistError::Validation(_))));

    drafts.delete(&id).await.unwrap();
    assert!(matches!(drafts.get(&id).await, Err(PersistError::DraftNotFound(_))));
    assert!(matches!(drafts.list_versions(&id).await, Err(PersistError::DraftNotFound(_))));
}

#[tokio::test]
async fn test_active_draft_is_most_recently_updated() {
    let (_, drafts, thread_id) = setup().await;
    let first = drafts
        .create(&thread_id, None, NewVersion::new("a"))
        .await
        .unwrap()
        .draft
        .id;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = drafts
        .create(&thread_id, None, NewVersion::new("b"))
        .await
        .unwrap()
        .draft
        .id;
    assert_eq!(drafts.active_for_thread(&thread_id).await.unwrap().unwrap().id, second);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    drafts.append_version(&first, NewVersion::new("a2")).await.unwrap();
    assert_eq!(drafts.active_for_thread(&thread_id).await.unwrap().unwrap().id, first);
    assert_eq!(drafts.list_for_thread(&thread_id).await.unwrap().len(), 2);
}

/// Holds every `get_draft` caller until both racers have read the base version
struct RacingStore {
    inner: Arc<MemoryStore>,
    barrier: Barrier,
}

#[async_trait]
impl DraftStore for RacingStore {
    async fn insert_draft(&self, draft: Draft, first: DraftVersion) -> Result<()> {
        self.inner.insert_draft(draft, first).await
    }

    async fn get_draft(&self, draft_id: &str) -> Result<Option<Draft>> {
        let draft = self.inner.get_draft(draft_id).await?;
        self.barrier.wait().await;
        Ok(draft)
    }

    async fn active_draft(&self, thread_id: &str) -> Result<Option<Draft>> {
        self.inner.active_draft(thread_id).await
    }

    async fn list_drafts(&self, thread_id: &str) -> Result<Vec<Draft>> {
        self.inner.list_drafts(thread_id).await
    }

    async fn upsert_version(&self, version: DraftVersion) -> Result<UpsertOutcome> {
        self.inner.upsert_version(version).await
    }

    async fn advance_current_version(&self, draft_id: &str, version: u32) -> Result<Draft> {
        self.inner.advance_current_version(draft_id, version).await
    }

    async fn get_version(&self, draft_id: &str, version: u32) -> Result<Option<DraftVersion>> {
        self.inner.get_version(draft_id, version).await
    }

    async fn list_versions(&self, draft_id: &str) -> Result<Vec<DraftVersion>> {
        self.inner.list_versions(draft_id).await
    }

    async fn update_version_content(&self, draft_id: &str, version: u32, content: &str) -> Result<()> {
        self.inner.update_version_content(draft_id, version, content).await
    }

    async fn set_version_parent(&self, draft_id: &str, version: u32, message_id: &str) -> Result<()> {
        self.inner.set_version_parent(draft_id, version, message_id).await
    }

    async fn rename_draft(&self, draft_id: &str, title: &str) -> Result<Draft> {
        self.inner.rename_draft(draft_id, title).await
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<()> {
        self.inner.delete_draft(draft_id).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_appends_collapse_onto_one_version() {
    let (store, plain, thread_id) = setup().await;
    let id = plain
        .create(&thread_id, None, NewVersion::new("base"))
        .await
        .unwrap()
        .draft
        .id;

    let racing = Arc::new(RacingStore {
        inner: store.clone(),
        barrier: Barrier::new(2),
    });
    let drafts = DraftService::new(store.clone() as Arc<dyn ThreadStore>, racing);

    let (a, b) = tokio::join!(
        drafts.append_version(&id, NewVersion::new("left")),
        drafts.append_version(&id, NewVersion::new("right")),
    );
    assert_eq!(a.unwrap().version.version, 2);
    assert_eq!(b.unwrap().version.version, 2);

    let draft = plain.get(&id).await.unwrap();
    assert_eq!(draft.current_version, 2);

    let versions = plain.list_versions(&id).await.unwrap();
    assert_eq!(versions.iter().map(|v| v.version).collect::<Vec<_>>(), vec![1, 2]);
    assert!(["left", "right"].contains(&versions[1].content.as_str()));
}
