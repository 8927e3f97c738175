//! Navigation links from a quote header back to the quoted post.

use post_view_config::Config;
use post_view_content::TopicId;

/// Placeholder slug for cross-topic links. The destination resolves the
/// canonical topic URL, so no real slug is needed here.
pub const VIA_QUOTE_SLUG: &str = "via-quote";

/// The topic a post is being viewed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRef {
    pub id: TopicId,
    pub slug: String,
}

impl TopicRef {
    pub fn new(id: TopicId, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
        }
    }

    /// `<base>/t/<slug>/<id>`
    pub fn url(&self, config: &Config) -> String {
        let slug = if self.slug.trim().is_empty() {
            "topic"
        } else {
            self.slug.as_str()
        };
        config.get_url(&format!("/t/{}/{}", slug, self.id))
    }

    /// Topic URL for a post; the first post has no number suffix.
    pub fn url_for_post_number(&self, config: &Config, post_number: u64) -> String {
        let url = self.url(config);
        if post_number > 1 {
            format!("{}/{}", url, post_number)
        } else {
            url
        }
    }
}

/// Where a quote header's link points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavLink {
    /// A post in the topic being viewed
    SameTopic { post_number: u64, href: String },
    /// A post in another topic, reached through the via-quote indirection
    CrossTopic {
        topic_id: TopicId,
        post_number: u64,
        href: String,
    },
}

impl NavLink {
    pub fn href(&self) -> &str {
        match self {
            NavLink::SameTopic { href, .. } | NavLink::CrossTopic { href, .. } => href,
        }
    }

    pub fn post_number(&self) -> u64 {
        match self {
            NavLink::SameTopic { post_number, .. } | NavLink::CrossTopic { post_number, .. } => {
                *post_number
            }
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            NavLink::SameTopic { .. } => "back",
            NavLink::CrossTopic { .. } => "quote-other-topic",
        }
    }

    /// Anchor markup for the quote header
    pub fn to_html(&self, title: &str) -> String {
        format!(
            "<a href=\"{}\" title=\"{}\" class=\"{}\"></a>",
            html_escape::encode_double_quoted_attribute(self.href()),
            html_escape::encode_double_quoted_attribute(title),
            self.css_class()
        )
    }
}

/// Resolve the header link for a quotation.
///
/// - no post number: no link
/// - quoted topic equals the viewed topic: same-topic link
/// - quoted topic differs (or nothing is being viewed): via-quote link
/// - no quoted topic while a topic is viewed: same-topic link
pub fn resolve_nav_link(
    post_number: Option<u64>,
    topic_id: Option<TopicId>,
    viewed: Option<&TopicRef>,
    config: &Config,
) -> Option<NavLink> {
    let post_number = post_number?;

    match (topic_id, viewed) {
        (Some(quoted), Some(topic)) if quoted == topic.id => Some(NavLink::SameTopic {
            post_number,
            href: topic.url_for_post_number(config, post_number),
        }),
        (Some(quoted), _) => Some(NavLink::CrossTopic {
            topic_id: quoted,
            post_number,
            href: config.get_url(&format!("/t/{}/{}/{}", VIA_QUOTE_SLUG, quoted, post_number)),
        }),
        (None, Some(topic)) => Some(NavLink::SameTopic {
            post_number,
            href: topic.url_for_post_number(config, post_number),
        }),
        (None, None) => None,
    }
}
