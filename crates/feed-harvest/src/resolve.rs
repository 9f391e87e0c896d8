//! Final action and authorship for a card.
//!
//! The baseline comes from the activity verb (or the presence of a shared
//! post). A link to any profile other than the target's own overrides it:
//! the record becomes a repost attributed to that profile, and the display
//! name is looked up by climbing a few containers from the link.

use scraper::ElementRef;

use crate::dom::{self, ContainerNode};
use crate::extract::links::PROFILE_LINK_SELECTOR;
use crate::types::{Action, Target};
use crate::urlnorm::normalize_url;

/// Default number of containers climbed from a foreign profile link.
pub const DEFAULT_AUTHOR_SEARCH_DEPTH: usize = 4;

/// Resolved action and authorship fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: Action,
    pub author: Option<String>,
    pub author_url: Option<String>,
}

/// Explicit verb first; otherwise a shared post means repost. A shared job
/// alone does not.
pub fn baseline_action(verb: Option<Action>, has_shared_post: bool) -> Action {
    match verb {
        Some(action) => action,
        None if has_shared_post => Action::Repost,
        None => Action::Post,
    }
}

/// First profile link in the card that does not belong to `target`, with
/// the link element it came from.
pub fn foreign_profile<'a>(card: ElementRef<'a>, target: &Target) -> Option<(String, ElementRef<'a>)> {
    let links = match dom::select_all(card, PROFILE_LINK_SELECTOR) {
        Ok(links) => links,
        Err(e) => {
            tracing::trace!("profile links unavailable: {e}");
            return None;
        }
    };
    links.into_iter().find_map(|link| {
        let url = normalize_url(&dom::attr(link, "href")?)?;
        (!target.owns_profile(&url)).then_some((url, link))
    })
}

/// Actor title of the closest of the first `max_depth` ancestors of `start`
/// that has one. `start` itself is not inspected.
pub fn nearest_actor_title<N: ContainerNode>(start: &N, max_depth: usize) -> Option<String> {
    let mut current = start.parent_container();
    for _ in 0..max_depth {
        let node = current?;
        if let Some(title) = node.actor_title() {
            return Some(title);
        }
        current = node.parent_container();
    }
    None
}

impl Resolution {
    pub fn baseline(
        verb: Option<Action>,
        has_shared_post: bool,
        author: Option<String>,
        author_url: Option<String>,
    ) -> Self {
        Self {
            action: baseline_action(verb, has_shared_post),
            author,
            author_url,
        }
    }

    /// Apply the foreign-profile override. It wins over any verb.
    pub fn resolve(mut self, card: ElementRef<'_>, target: &Target, max_depth: usize) -> Self {
        let Some((url, link)) = foreign_profile(card, target) else {
            return self;
        };
        tracing::trace!("foreign profile {url}, treating card as repost");
        self.action = Action::Repost;
        self.author_url = Some(url);
        if let Some(name) = nearest_actor_title(&link, max_depth) {
            self.author = Some(name);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    /// Index-based tree: `parents[i]` is the parent of node `i`.
    struct Tree {
        parents: Vec<Option<usize>>,
        titles: Vec<Option<&'static str>>,
    }

    struct Node<'t> {
        tree: &'t Tree,
        idx: usize,
    }

    impl<'t> ContainerNode for Node<'t> {
        fn parent_container(&self) -> Option<Self> {
            self.tree.parents[self.idx].map(|idx| Node { tree: self.tree, idx })
        }

        fn actor_title(&self) -> Option<String> {
            self.tree.titles[self.idx].map(str::to_string)
        }
    }

    /// A straight chain 0 <- 1 <- ... <- n-1 with a title at `titled`.
    fn chain(len: usize, titled: usize) -> Tree {
        Tree {
            parents: (0..len).map(|i| i.checked_sub(1)).collect(),
            titles: (0..len).map(|i| (i == titled).then_some("Sam Someone")).collect(),
        }
    }

    #[test]
    fn test_walk_finds_title_within_depth() {
        let tree = chain(6, 2);
        let leaf = Node { tree: &tree, idx: 5 };
        assert_eq!(nearest_actor_title(&leaf, 4).as_deref(), Some("Sam Someone"));
    }

    #[test]
    fn test_walk_stops_at_depth() {
        let tree = chain(6, 0);
        let leaf = Node { tree: &tree, idx: 5 };
        assert_eq!(nearest_actor_title(&leaf, 4), None);
        assert_eq!(nearest_actor_title(&leaf, 5).as_deref(), Some("Sam Someone"));
    }

    #[test]
    fn test_walk_ignores_start_and_stops_at_root() {
        let tree = chain(2, 1);
        let leaf = Node { tree: &tree, idx: 1 };
        assert_eq!(nearest_actor_title(&leaf, 4), None);
    }

    #[test]
    fn test_baseline_action() {
        assert_eq!(baseline_action(Some(Action::Liked), true), Action::Liked);
        assert_eq!(baseline_action(None, true), Action::Repost);
        assert_eq!(baseline_action(None, false), Action::Post);
    }

    const RESHARE: &str = r#"<div id="card">
        <div class="update-components-header"><a href="/in/jdoe/">Jane Doe</a> commented on this</div>
        <div class="update-components-actor">
            <a class="update-components-actor__meta-link" href="/in/sam-someone?miniProfileUrn=x">
                <span class="update-components-actor__title"><span dir="ltr">Sam Someone • 2nd</span></span>
            </a>
        </div>
    </div>"#;

    #[test]
    fn test_foreign_profile_forces_repost() {
        let doc = Html::parse_fragment(RESHARE);
        let card = dom::select_first(doc.root_element(), "#card").unwrap().unwrap();
        let target = Target::new("jdoe").unwrap();

        let resolved = Resolution::baseline(
            Some(Action::Commented),
            false,
            Some("Jane Doe".into()),
            Some("https://www.linkedin.com/in/jdoe/".into()),
        )
        .resolve(card, &target, DEFAULT_AUTHOR_SEARCH_DEPTH);

        assert_eq!(resolved.action, Action::Repost);
        assert_eq!(
            resolved.author_url.as_deref(),
            Some("https://www.linkedin.com/in/sam-someone")
        );
        assert_eq!(resolved.author.as_deref(), Some("Sam Someone"));
    }

    #[test]
    fn test_own_profile_only_keeps_baseline() {
        let doc = Html::parse_fragment(
            r#"<div id="card"><a href="https://www.linkedin.com/in/JDoe">Jane</a></div>"#,
        );
        let card = dom::select_first(doc.root_element(), "#card").unwrap().unwrap();
        let target = Target::new("jdoe").unwrap();
        let baseline = Resolution::baseline(None, false, Some("Jane".into()), None);
        assert_eq!(baseline.clone().resolve(card, &target, 4), baseline);
    }

    #[test]
    fn test_foreign_without_title_keeps_author() {
        let doc = Html::parse_fragment(
            r#"<div id="card"><p><a href="/in/other">Other</a></p></div>"#,
        );
        let card = dom::select_first(doc.root_element(), "#card").unwrap().unwrap();
        let target = Target::new("jdoe").unwrap();
        let resolved = Resolution::baseline(None, false, Some("Jane".into()), None)
            .resolve(card, &target, 4);
        assert_eq!(resolved.action, Action::Repost);
        assert_eq!(resolved.author.as_deref(), Some("Jane"));
        assert_eq!(
            resolved.author_url.as_deref(),
            Some("https://www.linkedin.com/in/other")
        );
    }
}
