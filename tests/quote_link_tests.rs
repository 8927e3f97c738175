mod common;

use common::{
    ManualStore, RecordingReporter, controller_in_welcome, cross_topic_quote, excerpt_quote,
    welcome_topic,
};
use post_view::quote::{
    ClickOutcome, ClickTarget, NavLink, QuoteController, TopicRef, ViewContext, resolve_nav_link,
};
use post_view_config::Config;
use post_view_content::TopicId;
use std::sync::Arc;

#[test]
fn test_same_topic_link_uses_topic_url() {
    let config = Config::default();
    let link = resolve_nav_link(Some(5), Some(TopicId(1)), Some(&welcome_topic()), &config);
    assert_eq!(
        link,
        Some(NavLink::SameTopic {
            post_number: 5,
            href: "/t/welcome/1/5".to_string(),
        })
    );
}

#[test]
fn test_other_topic_link_goes_via_quote() {
    let config = Config::default();
    let link = resolve_nav_link(Some(2), Some(TopicId(5)), Some(&welcome_topic()), &config)
        .expect("link");
    assert_eq!(link.href(), "/t/via-quote/5/2");
    assert_eq!(link.css_class(), "quote-other-topic");
}

#[test]
fn test_missing_topic_assumes_viewed_topic() {
    let config = Config::default();
    let link = resolve_nav_link(Some(1), None, Some(&welcome_topic()), &config).expect("link");
    assert_eq!(link.href(), "/t/welcome/1");
    assert_eq!(link.css_class(), "back");
}

#[test]
fn test_no_post_number_means_no_link() {
    let config = Config::default();
    assert_eq!(
        resolve_nav_link(None, Some(TopicId(1)), Some(&welcome_topic()), &config),
        None
    );
}

#[test]
fn test_links_honor_base_path() {
    let config = Config::default().with_base_path("/forum");
    let cross = resolve_nav_link(Some(2), Some(TopicId(5)), None, &config).expect("link");
    assert_eq!(cross.href(), "/forum/t/via-quote/5/2");
    let same = resolve_nav_link(Some(3), None, Some(&welcome_topic()), &config).expect("link");
    assert_eq!(same.href(), "/forum/t/welcome/1/3");
}

#[tokio::test]
async fn test_header_renders_cross_topic_link() {
    let mut ctrl = controller_in_welcome(
        Arc::new(ManualStore::new()),
        Arc::new(RecordingReporter::new()),
    );
    let id = ctrl.replace_content(&cross_topic_quote(5, 2, "<p>x</p>"))[0];
    ctrl.attach(id).unwrap();

    assert!(ctrl.block(id).unwrap().controls_html().ends_with(
        r#"<a href="/t/via-quote/5/2" title="go to the quoted post" class="quote-other-topic"></a>"#
    ));
}

#[tokio::test]
async fn test_context_change_rerenders_links() {
    let store = Arc::new(ManualStore::new());
    let mut ctrl = QuoteController::new(
        Arc::clone(&store),
        Arc::new(RecordingReporter::new()),
        Arc::new(Config::default()),
        ViewContext {
            topic: None,
            post_topic_id: TopicId(1),
        },
    );
    let id = ctrl.replace_content(&excerpt_quote(2, "<p>x</p>"))[0];
    ctrl.attach(id).unwrap();
    assert!(!ctrl.block(id).unwrap().controls_html().contains("<a "));

    ctrl.set_context(ViewContext::in_topic(TopicRef::new(TopicId(1), "welcome")));
    assert!(
        ctrl.block(id)
            .unwrap()
            .controls_html()
            .contains(r#"href="/t/welcome/1/2""#)
    );
}

#[tokio::test]
async fn test_link_click_does_not_toggle() {
    let store = Arc::new(ManualStore::new());
    let mut ctrl = controller_in_welcome(Arc::clone(&store), Arc::new(RecordingReporter::new()));
    let id = ctrl.replace_content(&cross_topic_quote(5, 2, "<p>x</p>"))[0];
    ctrl.attach(id).unwrap();

    assert_eq!(
        ctrl.click_header(id, ClickTarget::Link).unwrap(),
        ClickOutcome::Navigate("/t/via-quote/5/2".to_string())
    );
    assert!(!ctrl.block(id).unwrap().expanded());
    tokio::task::yield_now().await;
    assert_eq!(store.fetch_count(), 0);
}
