use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tera::{to_value, Tera, Value};

use crate::steam::{self, SteamClient};

/// List the immediate files of `<assets>/<path>` as root-relative hrefs:
/// each file becomes `/<last segment of path>/<stem>`, where the stem is
/// everything before the first `.` in the file name. Sorted ascending so
/// generated navigation is stable. Nested directories are not descended
/// into; link a subdirectory by calling this with its own path.
pub fn make_hrefs(assets_dir: &Path, path: &str) -> io::Result<Vec<String>> {
    let root = path.rsplit('/').next().unwrap_or(path);

    let mut stems = Vec::new();
    for entry in fs::read_dir(assets_dir.join(path))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let stem = name.split('.').next().unwrap_or(&name).to_string();
        stems.push(stem);
    }
    stems.sort();

    Ok(stems
        .into_iter()
        .map(|stem| format!("/{}/{}", root, stem))
        .collect())
}

/// Turn an href into display text: take the final `/` segment, split it
/// on `_`, and title-case each word. `posts/page_0` becomes `Page 0`.
pub fn nav_title(href: &str) -> String {
    let last = href.rsplit('/').next().unwrap_or(href);
    last.split('_')
        .map(title_case_word)
        .collect::<Vec<String>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Helper set for component and base-layout passes.
pub fn register_layout(tera: &mut Tera, assets_dir: &Path, steam: &SteamClient) {
    tera.register_function("make_hrefs", hrefs_fn(assets_dir.to_path_buf()));
    tera.register_function("nav_title", nav_title_fn());
    tera.register_function("steam_deck_top_50", steam::top_50_fn(steam.clone()));
}

/// Helper set for page-content passes; content never builds nav links.
pub fn register_content(tera: &mut Tera, steam: &SteamClient) {
    tera.register_function("steam_deck_top_50", steam::top_50_fn(steam.clone()));
}

fn hrefs_fn(assets_dir: PathBuf) -> impl tera::Function {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("make_hrefs requires a `path` argument"))?;
        let hrefs = make_hrefs(&assets_dir, path)
            .map_err(|err| tera::Error::msg(format!("make_hrefs failed for {}: {}", path, err)))?;
        Ok(to_value(hrefs)?)
    }
}

fn nav_title_fn() -> impl tera::Function {
    |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let href = args
            .get("href")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("nav_title requires an `href` argument"))?;
        Ok(to_value(nav_title(href))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    #[test]
    fn hrefs_list_immediate_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        fs::create_dir_all(pages.join("nested")).unwrap();
        fs::write(pages.join("post_2.md"), "").unwrap();
        fs::write(pages.join("post_0.md"), "").unwrap();
        fs::write(pages.join("post_1.md"), "").unwrap();
        fs::write(pages.join("nested/post_3.md"), "").unwrap();

        let hrefs = make_hrefs(dir.path(), "pages").unwrap();
        assert_eq!(hrefs, ["/pages/post_0", "/pages/post_1", "/pages/post_2"]);
    }

    #[test]
    fn href_stem_stops_at_first_dot() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("notes.tar.gz"), "").unwrap();

        let hrefs = make_hrefs(dir.path(), "docs").unwrap();
        assert_eq!(hrefs, ["/docs/notes"]);
    }

    #[test]
    fn href_root_is_last_path_segment() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("assets/pages");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("about.md"), "").unwrap();

        let hrefs = make_hrefs(dir.path(), "assets/pages").unwrap();
        assert_eq!(hrefs, ["/pages/about"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(make_hrefs(dir.path(), "absent").is_err());
    }

    #[test]
    fn nav_titles_from_slugs() {
        assert_eq!(nav_title("posts/page_0"), "Page 0");
        assert_eq!(nav_title("index_page_zero"), "Index Page Zero");
        assert_eq!(nav_title("/pages/about_me"), "About Me");
        assert_eq!(nav_title("UPPER_case"), "Upper Case");
        assert_eq!(nav_title("plain"), "Plain");
    }

    #[test]
    fn layout_helpers_render_through_tera() {
        let dir = tempfile::tempdir().unwrap();
        let pages = dir.path().join("pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("about_me.md"), "").unwrap();

        let mut tera = Tera::default();
        register_layout(&mut tera, dir.path(), &SteamClient::default());

        let out = tera
            .render_str(
                "{% for href in make_hrefs(path=\"pages\") %}{{ nav_title(href=href) }}{% endfor %}",
                &Context::new(),
            )
            .unwrap();
        assert_eq!(out, "About Me");
    }

    #[test]
    fn content_helpers_exclude_nav_functions() {
        let mut tera = Tera::default();
        register_content(&mut tera, &SteamClient::default());

        let result = tera.render_str("{{ nav_title(href=\"x\") }}", &Context::new());
        assert!(result.is_err());
    }
}
