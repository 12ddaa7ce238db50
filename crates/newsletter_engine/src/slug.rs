use std::sync::LazyLock;

use regex::Regex;

static NOT_ALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}.\s]").expect("static regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(a-|the-)").expect("static regex"));

/// Turns a post title into a lowercase, hyphen-separated folder name.
///
/// `%` and `#` become words so that "50%" and "#50" stay distinct, and a
/// leading English article is dropped. Titles without any letter or digit
/// produce an empty slug; see [`fallback_slug`].
pub fn slugify(title: &str) -> String {
    if !title.chars().any(char::is_alphanumeric) {
        return String::new();
    }

    let spelled = title.replace('%', " percent").replace('#', " sharp");
    let ascii = unidecode::unidecode(&spelled);
    let kept = NOT_ALLOWED.replace_all(&ascii, "");
    let hyphenated = SPACES.replace_all(kept.trim(), "-");
    let mut slug = hyphenated.to_lowercase();

    while let Some(found) = LEADING_ARTICLE.find(&slug) {
        slug = slug[found.end()..].to_string();
    }
    if slug.chars().all(|c| c == '.') {
        return String::new();
    }
    slug
}

/// Folder name used when a title yields no slug: `noname_<date>` with the
/// time separators made filesystem-safe.
pub fn fallback_slug(date: &str) -> String {
    format!("noname_{}", date.replace(':', "-"))
}
