use std::sync::Arc;

use integration_tests::{backends, TempDb};
use rb_core::traits::MockBoardRepo;
use rb_core::{AppError, Board, BoardStore, MessageBoard, ThreadStore};
use rb_db_memory::MemoryRepo;
use rb_db_sqlite::SqliteRepo;
use uuid::Uuid;

#[tokio::test]
async fn get_or_create_is_idempotent() {
    for backend in backends().await.unwrap() {
        let boards = backend.board.boards();
        assert_eq!(boards.find_by_name("b").await.unwrap(), None);

        let first = boards.get_or_create("b").await.unwrap();
        let second = boards.get_or_create("b").await.unwrap();
        assert_eq!(first, Board::new("b"), "{}", backend.name);
        assert_eq!(first, second);
        assert_eq!(boards.find_by_name("b").await.unwrap(), Some(first));
    }
}

#[tokio::test]
async fn attach_creates_missing_boards_and_ignores_repeats() {
    for backend in backends().await.unwrap() {
        let boards = backend.board.boards();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        boards.attach_thread("fresh", a).await.unwrap();
        boards.attach_thread("fresh", b).await.unwrap();
        boards.attach_thread("fresh", a).await.unwrap();

        let board = boards.find_by_name("fresh").await.unwrap().unwrap();
        assert_eq!(board.threads, vec![a, b], "{}", backend.name);
    }
}

#[tokio::test]
async fn boards_are_independent() {
    for backend in backends().await.unwrap() {
        let board = &backend.board;
        let on_a = board.post_thread("a", "for a", "pw").await.unwrap();
        let on_b = board.post_thread("b", "for b", "pw").await.unwrap();

        let listed_a = board.list("a").await.unwrap();
        let listed_b = board.list("b").await.unwrap();
        assert_eq!(listed_a.len(), 1);
        assert_eq!(listed_a[0].id, on_a.id);
        assert_eq!(listed_b[0].id, on_b.id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_get_or_create_makes_one_board() {
    let db = TempDb::new("rb-boards");
    let repo = Arc::new(SqliteRepo::new(&db.url(), 5).await.unwrap());
    let boards = BoardStore::new(repo.clone());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let boards = boards.clone();
            tokio::spawn(async move { boards.get_or_create("race").await })
        })
        .collect();
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(repo.board_count().await.unwrap(), 1);
    let stored = boards.find_by_name("race").await.unwrap().unwrap();
    assert!(results.iter().all(|board| *board == stored));

    let id = Uuid::now_v7();
    boards.attach_thread("race", id).await.unwrap();
    let board = boards.find_by_name("race").await.unwrap().unwrap();
    assert_eq!(board.threads, vec![id]);
    assert_eq!(repo.board_count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_get_or_create_on_memory_makes_one_board() {
    let repo = Arc::new(MemoryRepo::new());
    let boards = BoardStore::new(repo.clone());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let boards = boards.clone();
            tokio::spawn(async move { boards.get_or_create("race").await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Board::new("race"));
    }
    assert_eq!(repo.board_count(), 1);
}

#[tokio::test]
async fn failed_attach_removes_the_new_thread() {
    let threads = Arc::new(MemoryRepo::new());
    let mut boards = MockBoardRepo::new();
    boards
        .expect_attach_thread()
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("disk full")));

    let boards = Arc::new(boards);
    let board = MessageBoard::new(
        BoardStore::new(boards.clone()),
        ThreadStore::new(threads.clone(), boards),
    );

    let err = board.post_thread("b", "hello", "p1").await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(threads.thread_count(), 0);
}
