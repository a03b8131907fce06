use super::*;
use wire::Role;

fn new_lead(session_id: &str, name: &str) -> NewLead {
    NewLead {
        session_id: session_id.into(),
        name: name.into(),
        email: format!("{}@example.test", name.to_lowercase()),
        phone: "+1 555 0100".into(),
        query: "pricing?".into(),
        page_url: "https://example.test/pricing".into(),
        country: "Canada".into(),
    }
}

#[tokio::test]
async fn create_assigns_increasing_ids() {
    let store = MemoryStore::new();
    let a = store.create(new_lead("17000000000000001", "Alice")).await.unwrap();
    let b = store.create(new_lead("17000000000000002", "Bob")).await.unwrap();
    assert!(b > a);
}

#[tokio::test]
async fn create_rejects_duplicate_session() {
    let store = MemoryStore::new();
    store.create(new_lead("17000000000000001", "Alice")).await.unwrap();
    let err = store.create(new_lead("17000000000000001", "Mallory")).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(ref s) if s == "17000000000000001"));

    let lead = store.find_by_session("17000000000000001").await.unwrap().unwrap();
    assert_eq!(lead.name, "Alice");
}

#[tokio::test]
async fn save_transcript_replaces_turns() {
    let store = MemoryStore::new();
    store.create(new_lead("17000000000000001", "Alice")).await.unwrap();

    let first = vec![Turn::new(Role::User, "hi", 1)];
    assert!(store.save_transcript("17000000000000001", &first).await.unwrap());

    let second = vec![Turn::new(Role::User, "hi", 1), Turn::new(Role::Model, "hello", 2)];
    assert!(store.save_transcript("17000000000000001", &second).await.unwrap());

    let lead = store.find_by_session("17000000000000001").await.unwrap().unwrap();
    assert_eq!(lead.transcript, second);
}

#[tokio::test]
async fn save_transcript_unknown_session_returns_false() {
    let store = MemoryStore::new();
    let turns = vec![Turn::new(Role::User, "hi", 1)];
    assert!(!store.save_transcript("99999999999999999", &turns).await.unwrap());
}

#[tokio::test]
async fn list_is_newest_first_and_paged() {
    let store = MemoryStore::new();
    for i in 1..=3 {
        store.create(new_lead(&format!("1700000000000000{i}"), &format!("L{i}"))).await.unwrap();
    }

    let page = store.list(2, 0).await.unwrap();
    assert_eq!(page.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(), ["L3", "L2"]);

    let rest = store.list(2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "L1");
}

#[tokio::test]
async fn summary_counts_turns() {
    let store = MemoryStore::new();
    store.create(new_lead("17000000000000001", "Alice")).await.unwrap();
    let turns = vec![Turn::new(Role::User, "a", 1), Turn::new(Role::Model, "b", 2)];
    store.save_transcript("17000000000000001", &turns).await.unwrap();

    let page = store.list(10, 0).await.unwrap();
    assert_eq!(page[0].turns, 2);
}

#[tokio::test]
async fn get_and_delete() {
    let store = MemoryStore::new();
    let id = store.create(new_lead("17000000000000001", "Alice")).await.unwrap();

    assert!(store.get(id).await.unwrap().is_some());
    assert!(store.delete(id).await.unwrap());
    assert!(store.get(id).await.unwrap().is_none());
    assert!(!store.delete(id).await.unwrap());
}

#[tokio::test]
async fn settings_put_many_upserts() {
    let store = MemoryStore::new();
    assert!(SettingsStore::all(&store).await.unwrap().is_empty());

    store
        .put_many(&[("header_title".into(), "Help".into()), ("theme_color".into(), "#fff".into())])
        .await
        .unwrap();
    store.put_many(&[("header_title".into(), "Support".into())]).await.unwrap();

    let all = SettingsStore::all(&store).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["header_title"], "Support");
}
