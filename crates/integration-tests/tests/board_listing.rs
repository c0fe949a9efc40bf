use ab_core::{DEFAULT_REPLY_LIMIT, DEFAULT_THREAD_LIMIT};
use integration_tests::state;

#[tokio::test]
async fn single_thread_with_single_reply() {
    let state = state().await;
    let thread = state
        .lifecycle
        .post_thread("general", "hello world", "secret1")
        .await
        .unwrap();
    state
        .lifecycle
        .post_reply(thread.id, "first reply", "secret2")
        .await
        .unwrap();

    let threads = state.listing.recent_threads("general").await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].replies.len(), 1);
    assert_eq!(threads[0].replies[0].text, "first reply");
}

#[tokio::test]
async fn bumped_thread_moves_to_the_top() {
    let state = state().await;
    let oldest = state.lifecycle.post_thread("general", "oldest", "k").await.unwrap();
    let middle = state.lifecycle.post_thread("general", "middle", "k").await.unwrap();
    let newest = state.lifecycle.post_thread("general", "newest", "k").await.unwrap();

    let order: Vec<_> = state
        .listing
        .recent_threads("general")
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(order, vec![newest.id, middle.id, oldest.id]);

    state.lifecycle.post_reply(oldest.id, "bump", "k").await.unwrap();
    let threads = state.listing.recent_threads("general").await.unwrap();
    let order: Vec<_> = threads.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![oldest.id, newest.id, middle.id]);
    assert!(threads.windows(2).all(|w| w[0].bumped_on >= w[1].bumped_on));
}

#[tokio::test]
async fn listing_applies_thread_and_reply_limits() {
    let state = state().await;
    let mut last = None;
    for n in 0..(DEFAULT_THREAD_LIMIT + 2) {
        last = Some(
            state
                .lifecycle
                .post_thread("busy", &format!("thread {n}"), "k")
                .await
                .unwrap(),
        );
    }
    let last = last.unwrap();
    for n in 0..5 {
        state
            .lifecycle
            .post_reply(last.id, &format!("reply {n}"), "k")
            .await
            .unwrap();
    }

    let threads = state.listing.recent_threads("busy").await.unwrap();
    assert_eq!(threads.len(), DEFAULT_THREAD_LIMIT as usize);

    let top = &threads[0];
    assert_eq!(top.id, last.id);
    assert_eq!(top.replycount, 5);
    assert_eq!(top.replies.len(), DEFAULT_REPLY_LIMIT as usize);
    let texts: Vec<_> = top.replies.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["reply 2", "reply 3", "reply 4"]);

    let full = state.listing.get_thread(last.id).await.unwrap();
    assert_eq!(full.replies.len(), 5);
}

#[tokio::test]
async fn listing_is_idempotent_and_board_scoped() {
    let state = state().await;
    state.lifecycle.post_thread("general", "here", "k").await.unwrap();
    state.lifecycle.post_thread("General", "case matters", "k").await.unwrap();

    let first = state.listing.recent_threads("general").await.unwrap();
    let second = state.listing.recent_threads("general").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].text, "here");

    assert!(state.listing.recent_threads("nowhere").await.unwrap().is_empty());
}

#[tokio::test]
async fn boards_appear_with_their_first_thread() {
    let state = state().await;
    assert!(state.listing.list_boards().await.unwrap().is_empty());

    state.lifecycle.post_thread("tech", "one", "k").await.unwrap();
    state.lifecycle.post_thread("tech", "two", "k").await.unwrap();
    state.lifecycle.post_thread("art", "three", "k").await.unwrap();

    let boards = state.listing.list_boards().await.unwrap();
    let summary: Vec<_> = boards.iter().map(|b| (b.name.as_str(), b.thread_count)).collect();
    assert_eq!(summary, vec![("art", 1), ("tech", 2)]);
}
