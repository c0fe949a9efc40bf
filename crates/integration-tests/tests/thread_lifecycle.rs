use ab_core::{AppError, TOMBSTONE};
use integration_tests::state;
use uuid::Uuid;

#[tokio::test]
async fn posted_thread_reads_back_without_key() {
    let state = state().await;
    let posted = state
        .lifecycle
        .post_thread("general", "hello world", "secret1")
        .await
        .unwrap();

    let read = state.listing.get_thread(posted.id).await.unwrap();
    assert_eq!(read.text, "hello world");
    assert_eq!(read.board, "general");
    assert_eq!(read.created_on, read.bumped_on);

    let json = serde_json::to_string(&read).unwrap();
    assert!(!json.contains("secret1"));
    assert!(!json.contains("delete_password"));
    assert!(!json.contains("reported"));
}

#[tokio::test]
async fn reply_increments_count_and_bumps_thread() {
    let state = state().await;
    let thread = state
        .lifecycle
        .post_thread("general", "hello world", "secret1")
        .await
        .unwrap();

    for n in 1..=3 {
        let reply = state
            .lifecycle
            .post_reply(thread.id, &format!("reply {n}"), "secret2")
            .await
            .unwrap();

        let read = state.listing.get_thread(thread.id).await.unwrap();
        assert_eq!(read.replies.len(), n);
        assert_eq!(read.replycount, n);
        assert_eq!(read.bumped_on, reply.created_on);
        assert!(read.bumped_on >= read.created_on);
        assert_eq!(read.replies.last().unwrap().id, reply.id);
    }
}

#[tokio::test]
async fn reply_to_unknown_thread_is_not_found() {
    let state = state().await;
    let err = state
        .lifecycle
        .post_reply(Uuid::now_v7(), "first reply", "secret2")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("thread", _)));
}

#[tokio::test]
async fn thread_delete_needs_the_right_key() {
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

    // The reply's key does not unlock the thread.
    let err = state.lifecycle.delete_thread(thread.id, "secret2").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    let intact = state.listing.get_thread(thread.id).await.unwrap();
    assert_eq!(intact.text, "hello world");
    assert_eq!(intact.replies[0].text, "first reply");

    state.lifecycle.delete_thread(thread.id, "secret1").await.unwrap();
    let err = state.listing.get_thread(thread.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    // Deleting again is indistinguishable from a wrong key at the boundary.
    let err = state.lifecycle.delete_thread(thread.id, "secret1").await.unwrap_err();
    assert!(err.is_refused_delete());
}

#[tokio::test]
async fn reply_delete_leaves_a_tombstone() {
    let state = state().await;
    let thread = state
        .lifecycle
        .post_thread("general", "hello world", "secret1")
        .await
        .unwrap();
    let reply = state
        .lifecycle
        .post_reply(thread.id, "first reply", "secret2")
        .await
        .unwrap();

    let err = state
        .lifecycle
        .delete_reply(thread.id, reply.id, "wrong")
        .await
        .unwrap_err();
    assert!(err.is_refused_delete());
    let read = state.listing.get_thread(thread.id).await.unwrap();
    assert_eq!(read.replies[0].text, "first reply");

    state
        .lifecycle
        .delete_reply(thread.id, reply.id, "secret2")
        .await
        .unwrap();
    let read = state.listing.get_thread(thread.id).await.unwrap();
    assert_eq!(read.replies.len(), 1);
    assert_eq!(read.replycount, 1);
    assert_eq!(read.replies[0].id, reply.id);
    assert_eq!(read.replies[0].text, TOMBSTONE);
}

#[tokio::test]
async fn reply_delete_is_scoped_to_its_thread() {
    let state = state().await;
    let a = state.lifecycle.post_thread("general", "a", "k").await.unwrap();
    let b = state.lifecycle.post_thread("general", "b", "k").await.unwrap();
    let reply = state.lifecycle.post_reply(a.id, "on a", "k").await.unwrap();

    let err = state.lifecycle.delete_reply(b.id, reply.id, "k").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("reply", _)));
    let read = state.listing.get_thread(a.id).await.unwrap();
    assert_eq!(read.replies[0].text, "on a");
}

#[tokio::test]
async fn reporting_is_idempotent() {
    let state = state().await;
    let thread = state
        .lifecycle
        .post_thread("general", "hello world", "secret1")
        .await
        .unwrap();
    let reply = state
        .lifecycle
        .post_reply(thread.id, "first reply", "secret2")
        .await
        .unwrap();

    for _ in 0..2 {
        state.lifecycle.report_thread(thread.id).await.unwrap();
        state.lifecycle.report_reply(thread.id, reply.id).await.unwrap();
    }

    let err = state.lifecycle.report_thread(Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("thread", _)));
    let err = state
        .lifecycle
        .report_reply(thread.id, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("reply", _)));
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let state = state().await;
    let err = state.lifecycle.post_thread("general", "", "secret1").await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let thread = state.lifecycle.post_thread("general", "ok", "secret1").await.unwrap();
    let err = state.lifecycle.post_reply(thread.id, "text", "").await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(state.listing.get_thread(thread.id).await.unwrap().replycount, 0);
}
