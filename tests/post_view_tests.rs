mod common;

use common::{RecordingReporter, excerpt_quote, welcome_topic};
use post_view::post::{
    ContentDecorator, LinkCount, Modifiers, MultiSelect, PanelToggle, Post, PostType, PostView,
    PostViewError, ScreenTracker, ViewUpdate,
};
use post_view::quote::{ApplyOutcome, ClickOutcome, ClickTarget, ToggleOutcome};
use post_view_config::Config;
use post_view_content::{MemoryContentStore, TopicId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type View = PostView<MemoryContentStore, ScreenTracker>;

fn view_for(post: Post, store: Arc<MemoryContentStore>, tracker: Arc<ScreenTracker>) -> View {
    PostView::new(
        post,
        Some(welcome_topic()),
        store,
        tracker,
        Arc::new(RecordingReporter::new()),
        Arc::new(Config::default()),
    )
}

fn store_with_topic() -> Arc<MemoryContentStore> {
    let store = MemoryContentStore::new();
    store.insert(TopicId(1), 1, "<p>Opening post about the weather</p>");
    store.insert_reply(TopicId(1), 2, 1, "<p>It is sunny</p>");
    store.insert_reply(TopicId(1), 3, 1, "<p>Raining here</p>");
    Arc::new(store)
}

#[tokio::test]
async fn test_insert_decorates_and_tracks() {
    let store = store_with_topic();
    let tracker = Arc::new(ScreenTracker::new());
    let cooked = format!(
        r#"<p><a href="https://example.com">link</a></p>{}"#,
        excerpt_quote(1, "<p>weather</p>")
    );
    let post = Post::new(TopicId(1), 4, cooked)
        .with_link_counts(vec![LinkCount::new("https://example.com", 7)]);
    let mut view = view_for(post, store, Arc::clone(&tracker));
    assert!(!view.is_ready());

    view.did_insert_element();
    assert!(view.is_ready());
    assert_eq!(tracker.tracked_post("post_4"), Some(4));

    let html = view.render();
    assert!(html.contains(
        r#"link<span class="badge badge-notification clicks" title="clicks">7</span></a>"#
    ));
    assert!(html.contains(r#"class="icon-chevron-down""#));
    assert!(view.quotes().blocks()[0].controls_attached());

    view.will_destroy_element();
    assert!(!view.is_ready());
    assert!(!tracker.is_tracking("post_4"));
}

#[tokio::test]
async fn test_quote_expands_through_view() {
    let store = store_with_topic();
    let post = Post::new(TopicId(1), 4, excerpt_quote(1, "<p>weather</p>"));
    let mut view = view_for(post, store, Arc::new(ScreenTracker::new()));
    view.did_insert_element();

    let id = view.quotes().quote_ids()[0];
    assert_eq!(
        view.click_quote_header(id, ClickTarget::Header).unwrap(),
        ClickOutcome::Toggled(ToggleOutcome::Expanding)
    );
    let update = view.settle_next().await;
    assert!(matches!(
        update,
        Some(ViewUpdate::Quote(ApplyOutcome::Expanded { highlighted: true }))
    ));
    assert!(view.render().contains(
        r#"<p>Opening post about the <span class="highlighted">weather</span></p>"#
    ));
}

#[tokio::test]
async fn test_set_cooked_rescans_and_reattaches() {
    let store = store_with_topic();
    let post = Post::new(TopicId(1), 4, "<p>no quotes yet</p>");
    let mut view = view_for(post, store, Arc::new(ScreenTracker::new()));
    view.did_insert_element();
    assert!(view.quotes().blocks().is_empty());

    let ids = view.set_cooked(excerpt_quote(2, "<p>sunny</p>"));
    assert_eq!(ids.len(), 1);
    assert!(view.quotes().block(ids[0]).unwrap().controls_attached());
    assert_eq!(view.post().cooked, excerpt_quote(2, "<p>sunny</p>"));
}

#[tokio::test]
async fn test_set_cooked_before_insert_does_not_attach() {
    let post = Post::new(TopicId(1), 4, "<p>x</p>");
    let mut view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    let ids = view.set_cooked(excerpt_quote(2, "<p>sunny</p>"));
    assert!(!view.quotes().block(ids[0]).unwrap().controls_attached());
}

#[tokio::test]
async fn test_toggle_parent_loads_then_hides() {
    let store = store_with_topic();
    let post = Post::new(TopicId(1), 2, "<p>It is sunny</p>").with_reply_to(1);
    let mut view = view_for(post, store, Arc::new(ScreenTracker::new()));
    let selection = MultiSelect::new();

    assert_eq!(view.toggle_parent().unwrap(), PanelToggle::Loading);
    assert!(view.is_loading_parent());
    assert!(matches!(view.settle_next().await, Some(ViewUpdate::ParentShown)));
    assert!(!view.is_loading_parent());

    let parent = view.parent_post().expect("parent shown");
    assert_eq!(parent.post_number, 1);
    assert_eq!(parent.cooked, "<p>Opening post about the weather</p>");
    assert!(view.class_names(&selection).contains(&"replies-above"));

    assert_eq!(view.toggle_parent().unwrap(), PanelToggle::Hidden);
    assert!(view.parent_post().is_none());
}

#[tokio::test]
async fn test_parent_toggled_off_while_loading_is_dropped() {
    let store = store_with_topic();
    let post = Post::new(TopicId(1), 2, "<p>It is sunny</p>").with_reply_to(1);
    let mut view = view_for(post, store, Arc::new(ScreenTracker::new()));

    view.toggle_parent().unwrap();
    assert_eq!(view.toggle_parent().unwrap(), PanelToggle::Hidden);
    assert!(matches!(view.settle_next().await, Some(ViewUpdate::Stale)));
    assert!(view.parent_post().is_none());
}

#[tokio::test]
async fn test_toggle_parent_without_parent_errors() {
    let post = Post::new(TopicId(1), 1, "<p>first</p>");
    let mut view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    assert!(matches!(
        view.toggle_parent(),
        Err(PostViewError::NoParent { post_number: 1 })
    ));
}

#[tokio::test]
async fn test_missing_parent_reports_failure() {
    let post = Post::new(TopicId(1), 5, "<p>orphan</p>").with_reply_to(99);
    let mut view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    view.toggle_parent().unwrap();
    assert!(matches!(
        view.settle_next().await,
        Some(ViewUpdate::Failed(PostViewError::ParentFetch { post_number: 99, .. }))
    ));
    assert!(!view.is_loading_parent());
}

#[tokio::test]
async fn test_toggle_replies() {
    let post = Post::new(TopicId(1), 1, "<p>Opening post</p>");
    let mut view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    assert!(view.replies_hidden());

    assert_eq!(view.toggle_replies(), PanelToggle::Loading);
    assert_eq!(view.toggle_replies(), PanelToggle::Pending);
    assert!(matches!(view.settle_next().await, Some(ViewUpdate::RepliesShown)));

    let numbers: Vec<u64> = view
        .replies()
        .expect("replies shown")
        .iter()
        .map(|r| r.post_number)
        .collect();
    assert_eq!(numbers, vec![2, 3]);

    assert_eq!(view.toggle_replies(), PanelToggle::Hidden);
    assert!(view.replies().is_none());
}

#[tokio::test]
async fn test_mouse_up_selects_only_with_modifier_in_multi_select() {
    let post = Post::new(TopicId(1), 3, "<p>x</p>");
    let view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    let mut selection = MultiSelect::new();

    assert!(!view.mouse_up(&mut selection, Modifiers::meta()));
    selection.set_active(true);
    assert!(!view.mouse_up(&mut selection, Modifiers::default()));
    assert!(view.mouse_up(&mut selection, Modifiers::ctrl()));

    assert!(view.selected(&selection));
    assert_eq!(view.select_text(&selection), "selected (1)");
    assert!(view.class_names(&selection).contains(&"selected"));

    assert!(view.mouse_up(&mut selection, Modifiers::meta()));
    assert!(!view.selected(&selection));
    assert_eq!(view.select_text(&selection), "select");
}

#[test]
fn test_class_names() {
    let mut post = Post::new(TopicId(1), 3, "<p>x</p>");
    post.post_type = PostType::ModeratorAction;
    post.hidden = true;
    let view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    assert_eq!(
        view.class_names(&MultiSelect::new()),
        vec!["topic-post", "clearfix", "moderator", "hidden"]
    );
}

#[tokio::test]
async fn test_decorator_runs_before_quote_controls() {
    let saw_controls = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&saw_controls);
    let decorator: Arc<dyn ContentDecorator> = Arc::new(move |html: &str| {
        flag.fetch_or(html.contains("icon-chevron"), Ordering::SeqCst);
        html.replace("<pre>", r#"<pre class="lang-auto">"#)
    });

    let cooked = format!("<pre>code</pre>{}", excerpt_quote(1, "<p>weather</p>"));
    let post = Post::new(TopicId(1), 4, cooked);
    let mut view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()))
        .with_decorator(decorator);
    view.did_insert_element();

    let html = view.render();
    assert!(html.contains(r#"<pre class="lang-auto">code</pre>"#));
    assert!(html.contains("icon-chevron-down"));
    assert!(!saw_controls.load(Ordering::SeqCst));
    assert!(view.quotes().blocks()[0].controls_attached());

    view.set_cooked("<pre>more</pre>");
    assert!(view.render().contains(r#"<pre class="lang-auto">more</pre>"#));
}

#[tokio::test]
async fn test_settle_next_returns_none_when_idle() {
    let post = Post::new(TopicId(1), 2, "<p>It is sunny</p>").with_reply_to(1);
    let mut view = view_for(post, store_with_topic(), Arc::new(ScreenTracker::new()));
    assert!(view.settle_next().await.is_none());

    view.toggle_parent().unwrap();
    assert!(matches!(view.settle_next().await, Some(ViewUpdate::ParentShown)));
    assert!(view.settle_next().await.is_none());
}
