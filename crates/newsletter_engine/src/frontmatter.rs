use crate::types::Post;

/// Renders the front matter block followed by the Markdown body.
///
/// Title and author are written inside double quotes as-is; the extractor
/// has already removed any quote characters from them.
pub fn build_markdown_document(post: &Post) -> String {
    format!(
        "---\ntitle: \"{title}\"\nauthor: \"{author}\"\ndate: {date}\nlastmod: {lastmod}\ndraft: {draft}\n\n---\n\n{body}\n",
        title = post.title,
        author = post.author,
        date = post.date,
        lastmod = post.lastmod,
        draft = post.draft,
        body = post.body,
    )
}
