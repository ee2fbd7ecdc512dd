use std::collections::HashSet;

use quiz_core::model::{QuestionId, QuestionRecord, SessionSize, SlotTag};
use storage::repository::{QuestionBank, QuestionSource};
use storage::sqlite::SqliteRepository;

fn build_record(id: u32) -> QuestionRecord {
    QuestionRecord::new(
        QuestionId::new(id.to_string()),
        format!("Question {id}"),
        [
            format!("correct {id}"),
            format!("wrong a {id}"),
            format!("wrong b {id}"),
        ],
    )
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_answer_slots() {
    let repo = connect("memdb_roundtrip").await;
    let record = build_record(1);
    repo.upsert_question(&record).await.unwrap();

    let fetched = repo.fetch(SessionSize::new(5).unwrap()).await.expect("fetch");
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], record);
    assert_eq!(fetched[0].answer(SlotTag::Answer1), "correct 1");
}

#[tokio::test]
async fn sqlite_fetch_limits_and_returns_distinct_questions() {
    let repo = connect("memdb_limit").await;
    for id in 1..=10 {
        repo.upsert_question(&build_record(id)).await.unwrap();
    }

    let fetched = repo.fetch(SessionSize::new(4).unwrap()).await.unwrap();
    assert_eq!(fetched.len(), 4);
    let ids: HashSet<_> = fetched.iter().map(|q| q.id().clone()).collect();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn sqlite_short_pool_returns_what_exists() {
    let repo = connect("memdb_short").await;
    for id in 1..=3 {
        repo.upsert_question(&build_record(id)).await.unwrap();
    }

    let fetched = repo.fetch(SessionSize::DEFAULT).await.unwrap();
    assert_eq!(fetched.len(), 3);
}

#[tokio::test]
async fn sqlite_upsert_overwrites_existing_question() {
    let repo = connect("memdb_upsert").await;
    repo.upsert_question(&build_record(1)).await.unwrap();
    let updated = QuestionRecord::new(
        QuestionId::new("1"),
        "Updated",
        ["x".into(), "y".into(), "z".into()],
    )
    .unwrap();
    repo.upsert_question(&updated).await.unwrap();

    assert_eq!(repo.count_questions().await.unwrap(), 1);
    let fetched = repo.fetch(SessionSize::DEFAULT).await.unwrap();
    assert_eq!(fetched[0].question(), "Updated");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.count_questions().await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_fetch_skips_rows_with_blank_answers() {
    let repo = connect("memdb_blank_row").await;
    repo.upsert_question(&build_record(1)).await.unwrap();
    repo.upsert_question(&build_record(3)).await.unwrap();
    sqlx::query(
        "INSERT INTO questions (id, question, answer1, answer2, answer3) VALUES ('2', 'Broken', 'a', '', 'c')",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    assert_eq!(repo.count_questions().await.unwrap(), 3);
    let fetched = repo.fetch(SessionSize::DEFAULT).await.unwrap();
    let ids: HashSet<_> = fetched.iter().map(|q| q.id().as_str().to_owned()).collect();
    assert_eq!(ids, HashSet::from(["1".to_owned(), "3".to_owned()]));
}
