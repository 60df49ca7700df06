//! Inline HTML templates for the wiki pages

use wiki_store::Page;

/// Rendered view of a stored page.
///
/// The body was sanitized at save time and is emitted as-is; everything
/// else is escaped.
pub fn view_page(page: &Page) -> String {
    let title = html_escape(&page.title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - paperwiki</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <div class="page-body">{body}</div>
        <p class="actions">
            <a href="/stash/{title}">unlock</a>
            <a href="/edit/{title}">edit</a>
            <a href="/home">home</a>
        </p>
    </div>
</body>
</html>"#,
        title = title,
        body = page.body,
        css = CSS_STYLES
    )
}

/// Edit form for a page; the current body is escaped into the textarea.
pub fn edit_page(page: &Page) -> String {
    let title = html_escape(&page.title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Editing {title} - paperwiki</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>Editing {title}</h1>
        <form action="/save/{title}" method="POST">
            <textarea name="body" rows="20">{body}</textarea>
            <button type="submit">Save</button>
        </form>
        <p class="actions">
            <a href="/view/{title}">cancel</a>
        </p>
    </div>
</body>
</html>"#,
        title = title,
        body = html_escape(&page.body),
        css = CSS_STYLES
    )
}

/// Home page listing every stored page.
pub fn home_page(titles: &[String]) -> String {
    let listing = if titles.is_empty() {
        "<p>No pages yet. Open <code>/view/SomeTitle</code> to start one.</p>".to_string()
    } else {
        let links: String = titles
            .iter()
            .map(|title| {
                let title = html_escape(title);
                format!(r#"<li><a href="/view/{title}">{title}</a></li>"#)
            })
            .collect();
        format!("<ul>{links}</ul>")
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>paperwiki</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>paperwiki</h1>
        {listing}
    </div>
</body>
</html>"#,
        listing = listing,
        css = CSS_STYLES
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const CSS_STYLES: &str = r#"
* {
    box-sizing: border-box;
}
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: #fdfdf8;
    color: #222;
    margin: 0;
    padding: 2rem 1rem;
}
.container {
    max-width: 720px;
    margin: 0 auto;
}
h1 {
    border-bottom: 2px solid #d4d0c0;
    padding-bottom: 0.3rem;
}
.page-body {
    line-height: 1.6;
    margin: 1.5rem 0;
}
textarea {
    width: 100%;
    font-family: monospace;
    font-size: 0.9rem;
    padding: 0.5rem;
    border: 1px solid #bbb;
    border-radius: 4px;
}
button {
    margin-top: 0.75rem;
    padding: 0.5rem 1.5rem;
    background: #3a5f3a;
    color: #fff;
    border: none;
    border-radius: 4px;
    cursor: pointer;
}
.actions {
    margin-top: 2rem;
    font-size: 0.9rem;
}
.actions a {
    margin-right: 1rem;
    color: #3a5f3a;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_emits_body_unescaped() {
        let page = Page::new("Foo", "<p>hello</p>");
        let rendered = view_page(&page);
        assert!(rendered.contains("<p>hello</p>"));
        assert!(rendered.contains("<h1>Foo</h1>"));
    }

    #[test]
    fn edit_escapes_body_into_textarea() {
        let page = Page::new("Foo", "<p>hello</p>");
        let rendered = edit_page(&page);
        assert!(rendered.contains("&lt;p&gt;hello&lt;/p&gt;"));
        assert!(rendered.contains(r#"action="/save/Foo""#));
        assert!(!rendered.contains("<p>hello</p>"));
    }

    #[test]
    fn home_links_every_title() {
        let rendered = home_page(&["Alpha".to_string(), "Beta".to_string()]);
        assert!(rendered.contains(r#"<a href="/view/Alpha">Alpha</a>"#));
        assert!(rendered.contains(r#"<a href="/view/Beta">Beta</a>"#));
    }

    #[test]
    fn home_without_pages_shows_hint() {
        let rendered = home_page(&[]);
        assert!(rendered.contains("No pages yet"));
    }
}
