use crate::ipynb;
use crate::language_tag::{self, LanguageTag};

/// Separator placed between the blocks of a batch.
pub const BATCH_SEPARATOR: &str = "\n\n";

/// Frame one file as `# name`, then a fenced body tagged by language.
/// Notebooks are rendered to fenced cells first; everything else is passed through.
pub fn format_file(filename: &str, content: &str) -> String {
    let tag = language_tag::classify(filename);
    let rendered;
    let body = if tag.is_notebook() {
        rendered = ipynb::render_notebook(content);
        rendered.as_str()
    } else {
        content
    };
    frame(filename, tag, body)
}

fn frame(filename: &str, tag: LanguageTag, body: &str) -> String {
    format!("# {filename}\n```{tag}\n{body}\n```\n")
}

/// Format every file in input order and join the blocks.
/// The result is what gets persisted as a record's `content`.
pub fn format_batch<N, C>(files: impl IntoIterator<Item = (N, C)>) -> String
where
    N: AsRef<str>,
    C: AsRef<str>,
{
    files
        .into_iter()
        .map(|(filename, content)| format_file(filename.as_ref(), content.as_ref()))
        .collect::<Vec<String>>()
        .join(BATCH_SEPARATOR)
}
