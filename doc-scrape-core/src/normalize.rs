//! Rewrites the primary section into HTML that converts cleanly to markdown.
//!
//! The section is re-serialized node by node. Most elements pass through with
//! their presentation attributes only; the elements below are rewritten:
//!
//! - `<pre>` with a `<code>` inside becomes a single
//!   `<pre><code class="language-..">` block holding the flattened code text,
//!   so syntax-highlighting spans do not leak into the fence.
//! - `<code>` outside `<pre>` becomes inline code or a code block depending on
//!   [`NormalizeOptions::inline_code_marker`].
//! - `<img>` gets an absolute `src` and a non-empty `alt`.
//! - `<a>` gets an absolute `href`; anchors without one are unwrapped.

use scraper::{ElementRef, Html, Node};
use tracing::debug;
use url::Url;

use crate::config::NormalizeOptions;

/// Attributes that survive normalization on pass-through elements.
const KEPT_ATTRS: &[&str] = &["href", "src", "alt", "title", "start", "colspan", "rowspan"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const FALLBACK_ALT: &str = "Image";

pub fn normalize(primary_html: &str, page_url: &str, options: &NormalizeOptions) -> String {
    let base = Url::parse(page_url).ok();
    let fragment = Html::parse_fragment(primary_html);
    let normalizer = Normalizer {
        options,
        base: base.as_ref(),
    };

    let mut out = String::with_capacity(primary_html.len());
    normalizer.write_children(fragment.root_element(), &mut out);
    debug!(
        url = %page_url,
        input_bytes = primary_html.len(),
        output_bytes = out.len(),
        "Normalized primary section"
    );
    out
}

struct Normalizer<'a> {
    options: &'a NormalizeOptions,
    base: Option<&'a Url>,
}

impl Normalizer<'_> {
    fn write_children(&self, el: ElementRef<'_>, out: &mut String) {
        for child in el.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.write_element(child, out);
                    }
                }
                // comments, doctypes, processing instructions
                _ => {}
            }
        }
    }

    fn write_element(&self, el: ElementRef<'_>, out: &mut String) {
        let name = el.value().name();
        if self
            .options
            .strip_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(name))
        {
            return;
        }

        match name {
            "pre" => self.write_pre(el, out),
            "code" => self.write_code(el, out),
            "img" => self.write_img(el, out),
            "a" => self.write_anchor(el, out),
            _ => self.write_generic(el, out),
        }
    }

    fn write_pre(&self, pre: ElementRef<'_>, out: &mut String) {
        let code = pre
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "code");

        match code {
            Some(code) => {
                let language = language_of(code)
                    .or_else(|| language_of(pre))
                    .unwrap_or(self.options.default_language.as_str());
                write_code_block(language, &code_text(code), out);
            }
            None => {
                out.push_str("<pre>");
                out.push_str(&escape_text(&code_text(pre)));
                out.push_str("</pre>");
            }
        }
    }

    fn write_code(&self, code: ElementRef<'_>, out: &mut String) {
        let text = code_text(code);
        let inline = match &self.options.inline_code_marker {
            Some(marker) => code.value().attr("data-testid") == Some(marker.as_str()),
            None => true,
        };

        if inline {
            out.push_str("<code>");
            out.push_str(&escape_text(&text));
            out.push_str("</code>");
        } else {
            let language = language_of(code).unwrap_or(self.options.default_language.as_str());
            write_code_block(language, &text, out);
        }
    }

    fn write_img(&self, img: ElementRef<'_>, out: &mut String) {
        let Some(src) = non_empty_attr(img, "src") else {
            return;
        };
        let alt = non_empty_attr(img, "alt").unwrap_or(FALLBACK_ALT);
        out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_attr(&self.resolve(src)),
            escape_attr(alt)
        ));
    }

    fn write_anchor(&self, a: ElementRef<'_>, out: &mut String) {
        match non_empty_attr(a, "href") {
            Some(href) => {
                out.push_str(&format!("<a href=\"{}\">", escape_attr(&self.resolve(href))));
                self.write_children(a, out);
                out.push_str("</a>");
            }
            None => self.write_children(a, out),
        }
    }

    fn write_generic(&self, el: ElementRef<'_>, out: &mut String) {
        let name = el.value().name();
        out.push('<');
        out.push_str(name);
        for (attr, value) in el.value().attrs() {
            if KEPT_ATTRS.contains(&attr) {
                out.push_str(&format!(" {attr}=\"{}\"", escape_attr(value)));
            }
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.write_children(el, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    /// Resolves a link or image reference against the page URL.
    fn resolve(&self, reference: &str) -> String {
        if reference.starts_with('#') {
            return reference.to_string();
        }
        match self.base {
            Some(base) => base
                .join(reference)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| reference.to_string()),
            None => reference.to_string(),
        }
    }
}

/// Text content of a code element; `<br>` counts as a line break.
fn code_text(el: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

fn language_of<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.value()
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
}

fn non_empty_attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn write_code_block(language: &str, text: &str, out: &mut String) {
    let text = text.strip_suffix('\n').unwrap_or(text);
    out.push_str("<pre><code class=\"language-");
    out.push_str(&escape_attr(language));
    out.push_str("\">");
    out.push_str(&escape_text(text));
    out.push_str("</code></pre>");
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://fragment.dev/docs/ledgers";

    fn run(html: &str) -> String {
        normalize(html, URL, &NormalizeOptions::default())
    }

    #[test]
    fn highlighted_code_block_is_flattened() {
        let out = run(
            r#"<section><pre class="shiki"><code class="language-graphql"><span class="k">query</span> <span>Ledger</span> {}
</code></pre></section>"#,
        );
        assert_eq!(
            out,
            r#"<section><pre><code class="language-graphql">query Ledger {}</code></pre></section>"#
        );
    }

    #[test]
    fn code_block_without_language_uses_default() {
        let out = run("<pre><code>npm install</code></pre>");
        assert_eq!(out, r#"<pre><code class="language-bash">npm install</code></pre>"#);
    }

    #[test]
    fn language_on_pre_is_used_when_code_has_none() {
        let out = run(r#"<pre class="language-json"><code>{}</code></pre>"#);
        assert_eq!(out, r#"<pre><code class="language-json">{}</code></pre>"#);
    }

    #[test]
    fn marked_code_is_inline_and_unmarked_code_is_a_block() {
        let out = run(
            r#"<p>Set <code data-testid="inline-code">ledger_id</code></p><code class="language-ts">run()</code>"#,
        );
        assert_eq!(
            out,
            r#"<p>Set <code>ledger_id</code></p><pre><code class="language-ts">run()</code></pre>"#
        );
    }

    #[test]
    fn without_marker_all_bare_code_is_inline() {
        let options = NormalizeOptions {
            inline_code_marker: None,
            ..NormalizeOptions::default()
        };
        let out = normalize("<p><code>x</code></p>", URL, &options);
        assert_eq!(out, "<p><code>x</code></p>");
    }

    #[test]
    fn images_get_absolute_src_and_alt() {
        let out = run(r#"<p><img class="w-full" src="/img/flow.png"><img src="a.svg" alt="Flow"><img alt="none"></p>"#);
        assert_eq!(
            out,
            r#"<p><img src="https://fragment.dev/img/flow.png" alt="Image"><img src="https://fragment.dev/docs/a.svg" alt="Flow"></p>"#
        );
    }

    #[test]
    fn links_are_resolved_and_bare_anchors_unwrapped() {
        let out = run(
            r##"<p><a class="link" href="/docs/accounts">Accounts</a> <a href="#schema">Schema</a> <a name="x">plain</a></p>"##,
        );
        assert_eq!(
            out,
            r##"<p><a href="https://fragment.dev/docs/accounts">Accounts</a> <a href="#schema">Schema</a> plain</p>"##
        );
    }

    #[test]
    fn stripped_tags_and_comments_are_removed() {
        let out = run("<div><script>alert(1)</script><!-- c --><button>Copy</button><p>Body</p></div>");
        assert_eq!(out, "<div><p>Body</p></div>");
    }

    #[test]
    fn line_breaks_in_highlighted_code_become_newlines() {
        let out = run(
            r#"<pre><code class="language-sh"><span>cd app</span><br><span>npm test</span><br></code></pre>"#,
        );
        assert_eq!(
            out,
            "<pre><code class=\"language-sh\">cd app\nnpm test</code></pre>"
        );
    }

    #[test]
    fn text_is_re_escaped() {
        let out = run("<pre><code>a &lt; b &amp;&amp; c</code></pre>");
        assert_eq!(
            out,
            r#"<pre><code class="language-bash">a &lt; b &amp;&amp; c</code></pre>"#
        );
    }

    #[test]
    fn presentation_attributes_are_kept() {
        let out = run(r#"<ol start="3" class="list"><li>x</li></ol><br class="y">"#);
        assert_eq!(out, r#"<ol start="3"><li>x</li></ol><br>"#);
    }
}
