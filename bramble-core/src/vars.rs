use std::collections::BTreeMap;
use std::fs;

use chrono::{Datelike, Local, Utc};
use chrono_tz::America::New_York;
use tera::Context;

use crate::config::{ConfigError, SiteConfig, SitePaths};

/// A template variable. `Text` is escaped once when it enters an HTML
/// template context; `Html` is a fragment that is always injected
/// verbatim (inlined icons, rendered markdown, operator-authored params).
/// The delimiter-scan engine substitutes both verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Html(String),
}

impl Value {
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    pub fn html<S: Into<String>>(s: S) -> Self {
        Value::Html(s.into())
    }

    /// The underlying string with no escaping applied.
    pub fn raw(&self) -> &str {
        match self {
            Value::Text(s) | Value::Html(s) => s,
        }
    }
}

/// The build-wide variable mapping. Assembled once per run, then read-only;
/// per-page keys (`main_content`, `title`) only ever go into page-local
/// copies made by the composer.
#[derive(Debug, Clone, Default)]
pub struct VarStore {
    vars: BTreeMap<String, Value>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) {
        self.vars.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Unescaped lookup for the scan engine; `None` when the key is absent.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(Value::raw)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// Build a tera context from the store. Autoescape is off in the
    /// composer, so `Text` values are escaped here instead; `Html` values
    /// pass through untouched. One escape, one place.
    pub fn to_context(&self) -> Context {
        let mut ctx = Context::new();
        for (key, value) in &self.vars {
            match value {
                Value::Text(s) => ctx.insert(key, &html_escape::encode_safe(s).into_owned()),
                Value::Html(s) => ctx.insert(key, s),
            }
        }
        ctx
    }

    /// Assemble the store for one build: `template.params` and the
    /// computed keys (`sheetsURL`, `currentYear`, `currentEasternTime`)
    /// as trusted fragments, `env.params` as escapable text, and each
    /// configured icon inlined under `<name>Icon`.
    pub fn assemble(config: &SiteConfig, paths: &SitePaths) -> Result<Self, ConfigError> {
        let mut store = VarStore::new();
        for (key, value) in &config.template.params {
            store.insert(key.clone(), Value::html(value.clone()));
        }
        for (key, value) in &config.env.params {
            store.insert(key.clone(), Value::text(value.clone()));
        }
        store.insert("sheetsURL", Value::html(config.template.styles.sheet_url.clone()));
        store.insert("currentYear", Value::html(current_year()));
        store.insert("currentEasternTime", Value::html(current_eastern_time()));

        let icons_dir = paths.icons_dir();
        for (name, file) in &config.template.icons {
            let path = icons_dir.join(file);
            let body = fs::read_to_string(&path)
                .map_err(|source| ConfigError::Icon { path: path.clone(), source })?;
            store.insert(format!("{}Icon", name), Value::html(body));
        }

        Ok(store)
    }
}

/// The current year, e.g. `"2026"`.
pub fn current_year() -> String {
    Local::now().year().to_string()
}

/// The current time on the US east coast in RFC 822 form,
/// e.g. `"23 Aug 26 14:05 EDT"`.
pub fn current_eastern_time() -> String {
    Utc::now()
        .with_timezone(&New_York)
        .format("%d %b %y %H:%M %Z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tera::Tera;

    fn paths_in(dir: &std::path::Path) -> SitePaths {
        SitePaths::new(
            &dir.join("assets"),
            &dir.join("assets/layout"),
            &dir.join("configs/config.yml"),
            &dir.join("build"),
        )
    }

    #[test]
    fn assembles_params_and_computed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::parse(
            "template:\n  params:\n    projectName: \"Hello\"\n  styles:\n    sheetURL: \"styles.url\"\n",
        )
        .unwrap();

        let store = VarStore::assemble(&config, &paths_in(dir.path())).unwrap();
        assert_eq!(store.raw("projectName"), Some("Hello"));
        assert_eq!(store.raw("sheetsURL"), Some("styles.url"));
        assert_eq!(store.raw("currentYear"), Some(current_year().as_str()));

        // RFC 822: day month year time zone.
        let stamp = store.raw("currentEasternTime").unwrap();
        assert_eq!(stamp.split_whitespace().count(), 5);
        let zone = stamp.split_whitespace().last().unwrap();
        assert!(zone == "EST" || zone == "EDT");
    }

    #[test]
    fn inlines_icons_under_suffixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let icons = dir.path().join("assets/icons");
        std::fs::create_dir_all(&icons).unwrap();
        std::fs::write(icons.join("github.svg"), "<svg>gh</svg>").unwrap();

        let config =
            SiteConfig::parse("template:\n  icons:\n    github: github.svg\n").unwrap();
        let store = VarStore::assemble(&config, &paths_in(dir.path())).unwrap();
        assert_eq!(store.raw("githubIcon"), Some("<svg>gh</svg>"));
    }

    #[test]
    fn missing_icon_is_fatal_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            SiteConfig::parse("template:\n  icons:\n    github: github.svg\n").unwrap();
        let err = VarStore::assemble(&config, &paths_in(dir.path())).unwrap_err();
        assert!(err.to_string().contains("github.svg"));
    }

    #[test]
    fn context_escapes_text_but_not_html() {
        let mut store = VarStore::new();
        store.insert("note", Value::text("a < b & c"));
        store.insert("icon", Value::html("<svg>x</svg>"));
        let ctx = store.to_context();

        let out = Tera::one_off("{{ note }}|{{ icon }}", &ctx, false).unwrap();
        assert_eq!(out, "a &lt; b &amp; c|<svg>x</svg>");
    }
}
