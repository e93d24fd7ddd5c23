//! Login page rendering

const LOGIN_TEMPLATE: &str = include_str!("../templates/login.html");

const LOGIN_FAILED: &str = r#"<p class="error">Invalid username or password.</p>"#;

/// Render the login form carrying `redirect_uri` through the POST
pub fn login_page(redirect_uri: &str, failed: bool) -> String {
    LOGIN_TEMPLATE
        .replace("{{error}}", if failed { LOGIN_FAILED } else { "" })
        .replace("{{redirect_uri}}", &escape_html(redirect_uri))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
