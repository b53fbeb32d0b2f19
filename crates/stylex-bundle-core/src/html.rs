/// Public URL of an emitted asset under the configured base path.
pub fn public_path(base: &str, file_name: &str) -> String {
    if base.is_empty() || base == "./" {
        return file_name.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), file_name.trim_start_matches('/'))
}

/// Add a stylesheet `<link>` for `href` to an HTML document.
///
/// The tag goes right before `</head>`; documents without a head get it
/// prepended. A document that already links `href` is returned unchanged.
pub fn inject_stylesheet_link(html: &str, href: &str) -> String {
    let tag = format!(r#"<link rel="stylesheet" href="{href}">"#);
    if html.contains(&tag) {
        return html.to_string();
    }

    match find_ascii_case_insensitive(html, "</head>") {
        Some(index) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..index]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[index..]);
            out
        }
        None => format!("{tag}\n{html}"),
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
