//! The URL bar: the pending URL, split for display, plus its two buttons.

use picker_protocol::{Action, CanonicalState, Lane};
use url::{Position, Url};

use crate::Projection;

/// A URL broken into the pieces the bar styles differently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Scheme with its colon, e.g. `https:`.
    pub protocol: String,
    /// Whether `//` follows the protocol.
    pub slashes: bool,
    /// Host and port.
    pub host: String,
    /// Path, query and fragment.
    pub rest: String,
}

impl UrlParts {
    /// Split `raw`. Text that does not parse as a URL lands in `rest` whole.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let Ok(url) = Url::parse(raw) else {
            return Self {
                rest: raw.to_string(),
                ..Self::default()
            };
        };
        Self {
            protocol: format!("{}:", url.scheme()),
            slashes: url.has_authority(),
            host: url[Position::BeforeHost..Position::AfterPort].to_string(),
            rest: url[Position::BeforePath..].to_string(),
        }
    }
}

/// Mirror of the canonical URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlBarView {
    /// URL as broadcast.
    url: String,
    /// `url`, split.
    parts: UrlParts,
}

impl Projection for UrlBarView {
    const LANE: Lane = Lane::UrlBar;

    fn fold(&mut self, state: &CanonicalState) {
        if self.url != state.url {
            self.url = state.url.clone();
            self.parts = UrlParts::parse(&self.url);
        }
    }
}

impl UrlBarView {
    /// URL as broadcast.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Split URL.
    #[must_use]
    pub fn parts(&self) -> &UrlParts {
        &self.parts
    }

    /// No URL pending; both buttons are disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }

    /// Backspace intent.
    #[must_use]
    pub fn backspace(&self) -> Option<Action> {
        (!self.is_empty()).then_some(Action::ClickedUrlBackspaceButton)
    }

    /// Copy intent.
    #[must_use]
    pub fn copy(&self) -> Option<Action> {
        (!self.is_empty()).then_some(Action::ClickedCopyUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_of(url: &str) -> UrlBarView {
        let mut view = UrlBarView::default();
        view.fold(&CanonicalState {
            url: url.into(),
            ..CanonicalState::default()
        });
        view
    }

    #[test]
    fn splits_protocol_host_and_rest() {
        let view = view_of("https://example.com:8443/a/b?q=1#top");
        assert_eq!(
            view.parts(),
            &UrlParts {
                protocol: "https:".into(),
                slashes: true,
                host: "example.com:8443".into(),
                rest: "/a/b?q=1#top".into(),
            }
        );
    }

    #[test]
    fn opaque_and_unparseable_urls() {
        let mail = UrlParts::parse("mailto:someone@example.com");
        assert_eq!(mail.protocol, "mailto:");
        assert!(!mail.slashes);
        assert_eq!(mail.host, "");
        assert_eq!(mail.rest, "someone@example.com");

        let junk = UrlParts::parse("not a url");
        assert_eq!(junk.protocol, "");
        assert_eq!(junk.rest, "not a url");
    }

    #[test]
    fn buttons_disabled_when_empty() {
        let view = UrlBarView::default();
        assert!(view.is_empty());
        assert_eq!(view.backspace(), None);
        assert_eq!(view.copy(), None);

        let view = view_of("http://example.com/");
        assert!(!view.is_empty());
        assert_eq!(view.backspace(), Some(Action::ClickedUrlBackspaceButton));
        assert_eq!(view.copy(), Some(Action::ClickedCopyUrl));
    }

    #[test]
    fn clearing_the_url_resets_parts() {
        let mut view = view_of("http://example.com/x");
        view.fold(&CanonicalState::default());
        assert_eq!(view.parts(), &UrlParts::default());
    }
}
