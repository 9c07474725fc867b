use crate::probe::{HighlightTarget, ProbeConfig};

/// Generates the JavaScript the probe evaluates in the page.
///
/// Everything the probe knows about the document's shape (selectors,
/// control labels, attribute names) is encoded here and nowhere else.
pub struct ScriptBuilder {
    config: ProbeConfig,
}

impl ScriptBuilder {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// JS expression resolving the active comment selector: the first
    /// configured selector that matches anything on this page.
    fn comment_selector_js(&self) -> String {
        format!(
            r#"(() => {{
                const selectors = [{selectors}];
                for (const sel of selectors) {{
                    if (document.querySelector(sel)) return sel;
                }}
                return selectors[0] || 'shreddit-comment';
            }})()"#,
            selectors = js_string_array(&self.config.comment_selectors),
        )
    }

    /// JS statements binding `controls` to the current enumeration of
    /// disclosure controls. Shared by the listing and reveal scripts so
    /// both see the same ordering.
    fn enumerate_controls_js(&self) -> String {
        format!(
            r#"
                const commentSel = {comment_sel};
                const labels = [{labels}];
                const controls = [];
                const candidates = document.querySelectorAll('button, a, faceplate-partial');
                for (const el of candidates) {{
                    const text = (el.innerText || el.textContent || '').trim().toLowerCase();
                    if (!text) continue;
                    if (!labels.some(l => text.includes(l))) continue;
                    const host = el.closest(commentSel);
                    const depth = host ? (parseInt(host.getAttribute('depth')) || 0) + 1 : 0;
                    controls.push({{ el: el, ordinal: controls.length, effectiveDepth: depth }});
                }}
            "#,
            comment_sel = self.comment_selector_js(),
            labels = js_string_array(&self.config.control_labels),
        )
    }

    pub fn counts(&self) -> String {
        format!(
            r#"
            (() => {{
                const commentSel = {comment_sel};
                const nodes = document.querySelectorAll(commentSel);
                let topLevel = 0;
                for (const n of nodes) {{
                    if ((parseInt(n.getAttribute('depth')) || 0) === 0) topLevel++;
                }}
                return {{ total: nodes.length, topLevel: topLevel }};
            }})()
            "#,
            comment_sel = self.comment_selector_js(),
        )
    }

    pub fn list_controls(&self) -> String {
        format!(
            r#"
            (() => {{
                {enumerate}
                return controls.map(c => ({{ ordinal: c.ordinal, effectiveDepth: c.effectiveDepth }}));
            }})()
            "#,
            enumerate = self.enumerate_controls_js(),
        )
    }

    pub fn reveal(&self, ordinals: &[usize]) -> String {
        let wanted = ordinals
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"
            (() => {{
                {enumerate}
                const wanted = [{wanted}];
                let clicked = 0;
                for (const c of controls) {{
                    if (wanted.includes(c.ordinal)) {{
                        c.el.click();
                        clicked++;
                    }}
                }}
                return clicked;
            }})()
            "#,
            enumerate = self.enumerate_controls_js(),
            wanted = wanted,
        )
    }

    pub fn snapshot(&self) -> String {
        format!(
            r#"
            (() => {{
                const commentSel = {comment_sel};
                const pickText = (selectors) => {{
                    for (const sel of selectors) {{
                        const el = document.querySelector(sel);
                        if (el && el.innerText && el.innerText.trim()) {{
                            return el.innerText.trim();
                        }}
                    }}
                    return null;
                }};

                const comments = [];
                for (const n of document.querySelectorAll(commentSel)) {{
                    const contentEl =
                        n.querySelector(':scope > [slot="comment"]') ||
                        n.querySelector(':scope .md') ||
                        n;
                    comments.push({{
                        thingId: n.getAttribute('thingid') || n.getAttribute('data-fullname'),
                        author: n.getAttribute('author') || n.getAttribute('data-author'),
                        depth: parseInt(n.getAttribute('depth')) || 0,
                        permalink: n.getAttribute('permalink') || n.getAttribute('data-permalink'),
                        text: (contentEl.innerText || '').trim(),
                    }});
                }}

                return {{
                    title: pickText([{title_selectors}]),
                    body: pickText([{body_selectors}]),
                    comments: comments,
                }};
            }})()
            "#,
            comment_sel = self.comment_selector_js(),
            title_selectors = js_string_array(&self.config.title_selectors),
            body_selectors = js_string_array(&self.config.body_selectors),
        )
    }

    pub fn highlight(&self, target: &HighlightTarget) -> String {
        let lookup = match target {
            HighlightTarget::Post => {
                "document.querySelector('shreddit-post') || document.querySelector('h1')".to_string()
            }
            HighlightTarget::Comment(id) => format!(
                r#"(() => {{
                    const id = {id};
                    const byAttr = document.querySelector(commentSel + '[thingid="' + id + '"]')
                        || document.querySelector(commentSel + '[data-fullname="' + id + '"]');
                    if (byAttr) return byAttr;
                    // Synthetic ids are positional: comment-<n>.
                    const m = id.match(/^comment-(\d+)$/);
                    if (!m) return null;
                    return document.querySelectorAll(commentSel)[parseInt(m[1])] || null;
                }})()"#,
                id = js_quote(id),
            ),
        };

        format!(
            r#"
            (() => {{
                const commentSel = {comment_sel};
                {clear}
                const el = {lookup};
                if (!el) return false;
                el.setAttribute('data-murmur-active', '1');
                el.style.outline = {outline};
                el.scrollIntoView({{ block: 'center', behavior: 'smooth' }});
                return true;
            }})()
            "#,
            comment_sel = self.comment_selector_js(),
            clear = CLEAR_HIGHLIGHT_JS,
            lookup = lookup,
            outline = js_quote(&self.config.highlight_outline),
        )
    }

    pub fn clear_highlight(&self) -> String {
        format!("(() => {{ {} return true; }})()", CLEAR_HIGHLIGHT_JS)
    }
}

const CLEAR_HIGHLIGHT_JS: &str = r#"
                for (const el of document.querySelectorAll('[data-murmur-active]')) {
                    el.style.outline = '';
                    el.removeAttribute('data-murmur-active');
                }
"#;

fn js_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn js_string_array(items: &[String]) -> String {
    items
        .iter()
        .map(|s| js_quote(s))
        .collect::<Vec<_>>()
        .join(", ")
}
