// Integration tests for the timeline loader over the in-memory source

use std::time::Duration;

use pretty_assertions::assert_eq;
use timeline_pager::{
    core::FetchKind,
    infrastructure::{
        loader::{LoadError, TimelineLoader},
        source::InMemorySource,
    },
    MessageId,
};

#[tokio::test]
async fn jump_to_reply_pages_around_parent() -> Result<(), LoadError> {
    // Every 10th message has a reply "r<n>" that never shows up in a page
    let loader = TimelineLoader::new(InMemorySource::generate(100, 10), 30);
    let page = loader.jump_to("r40").await?;

    assert!(page.messages.iter().any(|m| m.id == MessageId::from(40)));
    assert!(!page.messages.iter().any(|m| m.id == MessageId::from("r40")));
    // The anchor itself is missing, which reads as "oldest edge reached"
    assert!(loader.state().has_loaded_all_older());
    assert_eq!(loader.load_older().await.err(), Some(LoadError::ReachedOldest));
    Ok(())
}

#[tokio::test]
async fn jump_then_scroll_both_ways() -> Result<(), LoadError> {
    let loader = TimelineLoader::new(InMemorySource::generate(200, 0), 20);
    loader.jump_to(100).await?;
    assert!(loader.state().is_jumping_to_anchor());

    while loader.state().is_jumping_to_anchor() {
        loader.load_newer().await?;
    }
    while !loader.state().has_loaded_all_older() {
        loader.load_older().await?;
    }

    assert_eq!(loader.window_len(), 200);
    let window = loader.window();
    assert_eq!(window.first().map(|m| m.id.to_string()), Some(String::from("1")));
    assert_eq!(window.last().map(|m| m.id.to_string()), Some(String::from("200")));
    Ok(())
}

#[tokio::test]
async fn initial_load_after_jump_starts_over() -> Result<(), LoadError> {
    let loader = TimelineLoader::new(InMemorySource::generate(50, 0), 10);
    loader.jump_to(5).await?;
    assert!(loader.state().has_loaded_all_older());

    loader.load_initial().await?;

    let state = loader.state();
    assert!(!state.has_loaded_all_older());
    assert!(!state.is_jumping_to_anchor());
    assert_eq!(loader.window_len(), 10);
    Ok(())
}

#[tokio::test]
async fn clones_share_one_session() -> Result<(), LoadError> {
    let source = InMemorySource::generate(100, 0).with_latency(Duration::from_millis(50));
    let loader = TimelineLoader::new(source, 25);
    loader.load_initial().await?;

    let background = loader.clone();
    let task = tokio::spawn(async move { background.load_older().await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(loader.state().is_loading_older());
    assert_eq!(loader.jump_to(10).await.err(), Some(LoadError::Busy(FetchKind::Older)));

    let page = task.await.map_err(|_| LoadError::NothingLoaded)??;
    assert_eq!(page.messages.len(), 25);
    assert_eq!(loader.window_len(), 50);
    Ok(())
}
