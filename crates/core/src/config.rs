use crate::error::{Error, Result, ValidationErrors};
use crate::redirects::{DEFAULT_REDIRECT_STATUS, REDIRECT_STATUSES, RedirectRule, RedirectTable};
use crate::types::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Conventional name of the configuration file at the project root
pub const CONFIG_FILE_NAME: &str = "site.toml";

/// HTML elements rendered without a closing tag
const VOID_ELEMENTS: &[&str] = &["base", "link", "meta"];

/// Raw TOML configuration structure
/// Every field is optional here so that missing values surface as
/// validation problems instead of aborting the parse.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    title: Option<String>,
    site: Option<String>,
    default_locale: Option<String>,
    locales: Option<BTreeMap<String, RawLocale>>,
    last_updated: bool,
    pagination: Option<bool>,
    edit_link: Option<RawEditLink>,
    social: BTreeMap<String, String>,
    components: BTreeMap<String, String>,
    logo: Option<RawLogo>,
    custom_css: Vec<String>,
    redirects: Option<RawRedirects>,
    sidebar: Vec<RawNavNode>,
    head: Vec<RawHeadInjection>,
    plugins: Vec<PluginRegistration>,
    build: RawBuild,
}

#[derive(Debug, Deserialize)]
struct RawLocale {
    lang: Option<String>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEditLink {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawLogo {
    src: Option<String>,
    light: Option<String>,
    dark: Option<String>,
    #[serde(default)]
    replaces_title: bool,
}

/// Either `"/from" = "/to"` pairs or `[[redirects]]` records
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRedirects {
    Table(BTreeMap<String, RawRedirectTarget>),
    List(Vec<RawRedirectRule>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRedirectTarget {
    Simple(String),
    Detailed {
        destination: String,
        status: Option<u16>,
    },
}

#[derive(Debug, Deserialize)]
struct RawRedirectRule {
    from: String,
    to: String,
    status: Option<u16>,
}

/// Sidebar node as written; its kind is inferred from which keys are present
#[derive(Debug, Deserialize)]
struct RawNavNode {
    label: Option<String>,
    link: Option<String>,
    autogenerate: Option<RawAutogenerate>,
    items: Option<Vec<RawNavNode>>,
    collapsed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawAutogenerate {
    directory: Option<String>,
    collapsed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawHeadInjection {
    tag: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, AttrValue>,
    content: Option<String>,
    self_closing: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBuild {
    content_dir: Option<String>,
    empty_autogen: EmptyAutogenPolicy,
}

/// Load and validate a site configuration file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
    tracing::debug!(path = %path.display(), "loading site configuration");
    load_str(&content)
}

/// Load and validate a site configuration from a string (useful for testing)
///
/// Every problem in the document is collected before failing, so the
/// returned [`Error::Validation`] lists all of them at once.
pub fn load_str(content: &str) -> Result<Configuration> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut errors = ValidationErrors::default();

    let identity = convert_identity(&raw, &mut errors);
    let redirects = convert_redirects(raw.redirects, &mut errors);
    let sidebar = convert_nav_nodes(raw.sidebar, "sidebar", &mut errors);
    let head = convert_head(raw.head, &mut errors);
    let theme = convert_theme(raw.logo, raw.custom_css, &mut errors);
    let plugins = convert_plugins(raw.plugins, &mut errors);
    let options = SiteOptions {
        edit_link_base: raw
            .edit_link
            .and_then(|e| check_url(&e.base_url, "edit_link.base_url", &mut errors)),
        last_updated: raw.last_updated,
        pagination: raw.pagination.unwrap_or(true),
        social: raw
            .social
            .into_iter()
            .filter_map(|(name, url)| {
                let field = format!("social.{}", name);
                check_url(&url, &field, &mut errors).map(|u| (name, u))
            })
            .collect(),
        components: raw
            .components
            .into_iter()
            .filter_map(|(name, path)| {
                let field = format!("components.{}", name);
                check_path(&path, &field, &mut errors).map(|p| (name, p))
            })
            .collect(),
    };
    let build = BuildOptions {
        content_dir: match raw.build.content_dir {
            Some(dir) => check_path(&dir, "build.content_dir", &mut errors)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR)),
            None => PathBuf::from(DEFAULT_CONTENT_DIR),
        },
        empty_autogen: raw.build.empty_autogen,
    };

    if !errors.is_empty() {
        tracing::debug!(problems = errors.len(), "site configuration rejected");
        return Err(Error::Validation(errors));
    }

    // Every None above recorded a problem, so these are present here
    let (Some(identity), Some(redirects)) = (identity, redirects) else {
        return Err(Error::Validation(errors));
    };

    tracing::debug!(
        title = %identity.title,
        redirects = redirects.len(),
        sidebar_entries = sidebar.len(),
        "site configuration loaded"
    );

    Ok(Configuration {
        identity,
        redirects,
        sidebar,
        head,
        theme,
        plugins,
        options,
        build,
    })
}

fn convert_identity(raw: &RawConfig, errors: &mut ValidationErrors) -> Option<SiteIdentity> {
    let title = match raw.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ => {
            errors.invalid("title", "site title is required");
            None
        }
    };

    let canonical_url = match raw.site.as_deref() {
        Some(site) => check_url(site, "site", errors),
        None => {
            errors.invalid("site", "canonical site URL is required");
            None
        }
    };

    let locales: BTreeMap<String, Locale> = match &raw.locales {
        None => BTreeMap::from([(
            "root".to_string(),
            Locale {
                lang: "en".to_string(),
                label: "English".to_string(),
            },
        )]),
        Some(locales) if locales.is_empty() => {
            errors.invalid("locales", "at least one locale is required");
            BTreeMap::new()
        }
        Some(locales) => locales
            .iter()
            .filter_map(|(code, locale)| match locale.lang.as_deref() {
                Some(lang) if !lang.trim().is_empty() => Some((
                    code.clone(),
                    Locale {
                        lang: lang.to_string(),
                        label: locale.label.clone().unwrap_or_else(|| lang.to_string()),
                    },
                )),
                _ => {
                    errors.invalid(format!("locales.{}.lang", code), "language tag is required");
                    None
                }
            })
            .collect(),
    };

    let default_locale = raw
        .default_locale
        .clone()
        .unwrap_or_else(|| "root".to_string());
    let locale_declared = raw
        .locales
        .as_ref()
        .map_or(locales.contains_key(&default_locale), |l| {
            l.contains_key(&default_locale)
        });
    if !locale_declared {
        errors.invalid(
            "default_locale",
            format!("`{}` is not a key of `locales`", default_locale),
        );
    }

    Some(SiteIdentity {
        title: title?,
        canonical_url: canonical_url?,
        default_locale,
        locales,
    })
}

fn convert_redirects(
    raw: Option<RawRedirects>,
    errors: &mut ValidationErrors,
) -> Option<RedirectTable> {
    let rules: Vec<RedirectRule> = match raw {
        None => Vec::new(),
        Some(RawRedirects::Table(table)) => table
            .into_iter()
            .map(|(from, target)| match target {
                RawRedirectTarget::Simple(to) => RedirectRule::new(from, to),
                RawRedirectTarget::Detailed {
                    destination,
                    status,
                } => RedirectRule {
                    from,
                    to: destination,
                    status: status.unwrap_or(DEFAULT_REDIRECT_STATUS),
                },
            })
            .collect(),
        Some(RawRedirects::List(list)) => list
            .into_iter()
            .map(|r| RedirectRule {
                from: r.from,
                to: r.to,
                status: r.status.unwrap_or(DEFAULT_REDIRECT_STATUS),
            })
            .collect(),
    };

    let mut valid = true;
    for (i, rule) in rules.iter().enumerate() {
        if !rule.from.starts_with('/') {
            errors.invalid(
                format!("redirects[{}].from", i),
                format!("`{}` must start with `/`", rule.from),
            );
            valid = false;
        }
        if rule.to.trim().is_empty() {
            errors.invalid(format!("redirects[{}].to", i), "redirect target is empty");
            valid = false;
        }
        if !REDIRECT_STATUSES.contains(&rule.status) {
            errors.invalid(
                format!("redirects[{}].status", i),
                format!("{} is not a redirect status", rule.status),
            );
            valid = false;
        }
    }

    match RedirectTable::new(rules) {
        Ok(table) if valid => Some(table),
        Ok(_) => None,
        Err(collisions) => {
            for collision in collisions {
                errors.collision(collision);
            }
            None
        }
    }
}

fn convert_nav_nodes(raw: Vec<RawNavNode>, prefix: &str, errors: &mut ValidationErrors) -> Vec<NavNode> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, node)| convert_nav_node(node, &format!("{}[{}]", prefix, i), errors))
        .collect()
}

fn convert_nav_node(raw: RawNavNode, field: &str, errors: &mut ValidationErrors) -> Option<NavNode> {
    let label = match raw.label.as_deref().map(str::trim) {
        Some(l) if !l.is_empty() => Some(l.to_string()),
        _ => {
            errors.invalid(format!("{}.label", field), "sidebar entry needs a label");
            None
        }
    };

    match (raw.link, raw.autogenerate, raw.items) {
        (Some(link), None, None) => {
            if raw.collapsed.is_some() {
                errors.invalid(
                    format!("{}.collapsed", field),
                    "`collapsed` only applies to groups",
                );
            }
            if link.trim().is_empty() {
                errors.invalid(format!("{}.link", field), "link target is empty");
                return None;
            }
            Some(NavNode::Link(LinkNode {
                label: label?,
                target: link,
            }))
        }
        (None, Some(auto), None) => {
            let dir_field = format!("{}.autogenerate.directory", field);
            let directory = match auto.directory {
                Some(dir) => check_path(&dir, &dir_field, errors).map(|_| dir),
                None => {
                    errors.invalid(dir_field, "directory is required");
                    None
                }
            };
            Some(NavNode::Autogen(AutogenNode {
                label: label?,
                directory: directory?,
                collapsed: raw.collapsed.or(auto.collapsed).unwrap_or(false),
            }))
        }
        (None, None, Some(items)) => {
            let items = convert_nav_nodes(items, &format!("{}.items", field), errors);
            Some(NavNode::Group(GroupNode {
                label: label?,
                collapsed: raw.collapsed.unwrap_or(false),
                items,
            }))
        }
        (link, auto, items) => {
            let present: Vec<&str> = [
                link.is_some().then_some("link"),
                auto.is_some().then_some("autogenerate"),
                items.is_some().then_some("items"),
            ]
            .into_iter()
            .flatten()
            .collect();
            let reason = if present.is_empty() {
                "expected one of `link`, `autogenerate` or `items`".to_string()
            } else {
                format!("ambiguous entry: `{}` are mutually exclusive", present.join("`, `"))
            };
            errors.invalid(field.to_string(), reason);
            None
        }
    }
}

fn convert_head(raw: Vec<RawHeadInjection>, errors: &mut ValidationErrors) -> Vec<HeadInjection> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let field = format!("head[{}]", i);
            let tag = match entry.tag.as_deref().map(str::trim) {
                Some(t) if !t.is_empty() => t.to_ascii_lowercase(),
                _ => {
                    errors.invalid(format!("{}.tag", field), "tag name is required");
                    return None;
                }
            };
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                errors.invalid(format!("{}.tag", field), format!("`{}` is not a tag name", tag));
                return None;
            }
            for name in entry.attrs.keys() {
                if name.is_empty() || name.chars().any(|c| c.is_whitespace() || "\"'<>/=".contains(c)) {
                    errors.invalid(
                        format!("{}.attrs", field),
                        format!("`{}` is not an attribute name", name),
                    );
                }
            }
            let self_closing = entry
                .self_closing
                .unwrap_or_else(|| VOID_ELEMENTS.contains(&tag.as_str()));
            if self_closing && entry.content.is_some() {
                errors.invalid(
                    format!("{}.content", field),
                    format!("self-closing `<{}>` cannot have content", tag),
                );
            }
            Some(HeadInjection {
                tag,
                attrs: entry.attrs,
                content: entry.content,
                self_closing,
            })
        })
        .collect()
}

fn convert_theme(
    logo: Option<RawLogo>,
    custom_css: Vec<String>,
    errors: &mut ValidationErrors,
) -> ThemeAssets {
    let logo = logo.and_then(|raw| {
        let (light, dark) = match (raw.src, raw.light, raw.dark) {
            (Some(src), None, None) => (src.clone(), src),
            (None, Some(light), Some(dark)) => (light, dark),
            _ => {
                errors.invalid("logo", "set either `src` or both `light` and `dark`");
                return None;
            }
        };
        let light = check_path(&light, "logo.light", errors);
        let dark = check_path(&dark, "logo.dark", errors);
        Some(Logo {
            light: light?,
            dark: dark?,
            replaces_title: raw.replaces_title,
        })
    });

    let custom_css = custom_css
        .into_iter()
        .enumerate()
        .filter_map(|(i, css)| {
            let field = format!("custom_css[{}]", i);
            match StylesheetRef::classify(&css) {
                StylesheetRef::Local(_) => {
                    check_path(&css, &field, errors).map(StylesheetRef::Local)
                }
                StylesheetRef::Package(name) if name.trim().is_empty() => {
                    errors.invalid(field, "stylesheet reference is empty");
                    None
                }
                package => Some(package),
            }
        })
        .collect();

    ThemeAssets { logo, custom_css }
}

fn convert_plugins(
    raw: Vec<PluginRegistration>,
    errors: &mut ValidationErrors,
) -> Vec<PluginRegistration> {
    for (i, plugin) in raw.iter().enumerate() {
        if plugin.id.trim().is_empty() {
            errors.invalid(format!("plugins[{}].id", i), "plugin id is empty");
        }
    }
    raw
}

/// Parse an absolute URL, recording a problem on failure.
fn check_url(raw: &str, field: &str, errors: &mut ValidationErrors) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) if !url.cannot_be_a_base() => Some(url),
        Ok(_) => {
            errors.invalid(field, format!("`{}` is not a hierarchical URL", raw));
            None
        }
        Err(e) => {
            errors.invalid(field, format!("`{}` is not an absolute URL: {}", raw, e));
            None
        }
    }
}

fn check_path(raw: &str, field: &str, errors: &mut ValidationErrors) -> Option<PathBuf> {
    match validate_path(raw, field) {
        Ok(path) => Some(path),
        Err(reason) => {
            errors.invalid(field, reason);
            None
        }
    }
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects empty paths, absolute paths and parent directory references so
/// configured files always resolve inside the project directory.
///
/// ```text
/// validate_path("./src/assets/logo.svg", "logo.light")  → Ok(PathBuf)
/// validate_path("types/http", "autogenerate.directory")  → Ok(PathBuf)
/// validate_path("/etc/passwd", "logo.light")  → Err("Absolute paths not allowed...")
/// validate_path("../secret", "components.Footer")  → Err("Parent directory references...")
/// ```
pub fn validate_path(path_str: &str, field_name: &str) -> std::result::Result<PathBuf, String> {
    if path_str.trim().is_empty() {
        return Err(format!("Empty path in '{}' field", field_name));
    }

    let path = Path::new(path_str);

    // Rooted paths count as absolute on every platform here
    if path.is_absolute() || path_str.starts_with('/') || path_str.starts_with('\\') {
        return Err(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        ));
    }

    if path
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        return Err(format!(
            "Parent directory references (..) not allowed in '{}': '{}'",
            field_name, path_str
        ));
    }

    Ok(path.to_path_buf())
}
