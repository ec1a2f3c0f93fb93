use docs_kit_core::{AttrValue, HeadInjection, RedirectRule, StylesheetRef};
use url::Url;

/// HTML-escape a string for text and attribute positions
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Render one head element.
///
/// Boolean attributes render bare when true and are dropped when false.
/// Script and style bodies are emitted verbatim, other content is escaped.
pub fn render_head_element(element: &HeadInjection) -> String {
    let mut html = format!("<{}", element.tag);
    for (name, value) in &element.attrs {
        match value {
            AttrValue::Flag(true) => {
                html.push(' ');
                html.push_str(name);
            }
            AttrValue::Flag(false) => {}
            AttrValue::Text(text) => {
                html.push_str(&format!(" {}=\"{}\"", name, html_escape(text)));
            }
        }
    }
    html.push('>');

    if element.self_closing {
        return html;
    }

    if let Some(content) = &element.content {
        if matches!(element.tag.as_str(), "script" | "style") {
            html.push_str(content);
        } else {
            html.push_str(&html_escape(content));
        }
    }
    html.push_str(&format!("</{}>", element.tag));
    html
}

/// Stylesheet link for a custom CSS entry.
pub fn render_stylesheet_link(stylesheet: &StylesheetRef) -> String {
    format!(
        "<link rel=\"stylesheet\" href=\"{}\">",
        html_escape(&stylesheet.href())
    )
}

/// Render every head element, then the stylesheet links, one per line.
pub fn render_head(elements: &[HeadInjection], stylesheets: &[StylesheetRef]) -> String {
    elements
        .iter()
        .map(render_head_element)
        .chain(stylesheets.iter().map(render_stylesheet_link))
        .map(|line| line + "\n")
        .collect()
}

/// Static stub page that sends visitors of `rule.from` on to `rule.to`.
pub fn render_redirect_page(rule: &RedirectRule, site: &Url) -> String {
    let target = html_escape(&rule.to);
    let canonical = site
        .join(&rule.to)
        .map(|u| format!("\n<link rel=\"canonical\" href=\"{}\">", html_escape(u.as_str())))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<title>Redirecting to: {target}</title>
<meta http-equiv="refresh" content="0;url={target}">
<meta name="robots" content="noindex">{canonical}
<body>
  <a href="{target}">Redirecting from <code>{from}</code> to <code>{target}</code></a>
</body>
"#,
        target = target,
        canonical = canonical,
        from = html_escape(&rule.from),
    )
}
