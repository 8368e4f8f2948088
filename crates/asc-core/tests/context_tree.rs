//! Cancellation and deadlines across a tree of contexts shared between tasks.

use std::time::Duration;

use asc_core::{ContextError, RequestContext};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_deadline_on_branch_bounds_its_descendants_only() {
    let root = RequestContext::new();
    let branch = root.child().with_deadline(Instant::now() + Duration::from_secs(5));
    let leaf = branch.child();
    let sibling = root.child();

    let waiter = tokio::spawn(async move { leaf.sleep(Duration::from_secs(60)).await });
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(waiter.await.unwrap(), Err(ContextError::DeadlineExceeded));
    assert_eq!(branch.check(), Err(ContextError::DeadlineExceeded));
    assert_eq!(sibling.check(), Ok(()));
    assert_eq!(root.check(), Ok(()));
}

#[tokio::test(start_paused = true)]
async fn test_root_cancel_reaches_every_task() {
    let root = RequestContext::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = root.child().child();
            tokio::spawn(async move { ctx.run(std::future::pending::<()>()).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    root.cancel();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Err(ContextError::Cancelled));
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_wins_over_later_deadline() {
    let ctx = RequestContext::with_timeout(Duration::from_secs(30));
    let observer = ctx.clone();

    let done = tokio::spawn(async move { observer.done().await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    ctx.cancel();

    assert_eq!(done.await.unwrap(), ContextError::Cancelled);
}
