use std::path::Path;

use crate::config::Config;
use crate::server_ident;

/// Renders the HTML directory listing for `dir`, addressed by the
/// request path.
///
/// Entries are sorted directories first, then files, each group
/// alphabetical by name. A parent link comes first.
pub async fn directory_listing(
    dir: &Path,
    request_path: &str,
    config: &Config,
) -> anyhow::Result<String> {
    let mut entries: Vec<(String, bool)> = Vec::new();

    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await?.is_dir();
        entries.push((name, is_dir));
    }

    entries.sort_by(|(a_name, a_dir), (b_name, b_dir)| {
        b_dir.cmp(a_dir).then_with(|| a_name.cmp(b_name))
    });

    let parent = parent_href(request_path);

    let mut body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<title>Index of {path}</title>\n</head>\n<body>\n<h1>Index of {path}</h1>\n<ul>\n<li><a href=\"{parent}\">..</a></li>\n",
        path = request_path,
        parent = parent,
    );

    for (name, is_dir) in &entries {
        let display = if *is_dir {
            format!("{}/", name)
        } else {
            name.clone()
        };
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            join_href(request_path, name),
            display
        ));
    }

    body.push_str(&format!(
        "</ul>\n<address>{} Port {}</address>\n</body></html>\n",
        server_ident(),
        config.port
    ));

    Ok(body)
}

fn join_href(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

fn parent_href(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_nested_path() {
        assert_eq!(parent_href("/a/b"), "/a");
        assert_eq!(parent_href("/a/b/"), "/a");
        assert_eq!(parent_href("/a"), "/");
        assert_eq!(parent_href("/"), "/");
    }
}
