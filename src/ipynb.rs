use crate::MultiLineString;

/// Body used in place of a notebook that isn't parseable.
pub const INVALID_NOTEBOOK: &str = "Error: Invalid Jupyter Notebook format";

struct Notebook {
    cells: Vec<Cell>,
}

struct Cell {
    // kept as a plain string: unknown cell types are skipped, not rejected
    cell_type: Option<String>,
    source: Option<MultiLineString>,
}

// Only the keys read here are decoded; any other value is consumed as a
// `merde::Value`, since derived impls don't skip unknown fields.
impl<'de> merde::Deserialize<'de> for Notebook {
    async fn deserialize(
        de: &mut dyn merde::DynDeserializer<'de>,
    ) -> Result<Self, merde::MerdeError<'de>> {
        use merde::DynDeserializerExt;
        let mut cells = Vec::new();
        de.next().await?.into_map_start()?;
        loop {
            match de.next().await? {
                merde::Event::Str(key) => {
                    if key == "cells" {
                        cells = de.t().await?;
                    } else {
                        let _: merde::Value<'de> = de.t().await?;
                    }
                }
                merde::Event::MapEnd => return Ok(Notebook { cells }),
                e => {
                    return Err(merde::MerdeError::UnexpectedEvent {
                        got: merde::EventType::from(&e),
                        expected: &[merde::EventType::Str],
                        help: None,
                    })
                }
            }
        }
    }
}

impl<'de> merde::Deserialize<'de> for Cell {
    async fn deserialize(
        de: &mut dyn merde::DynDeserializer<'de>,
    ) -> Result<Self, merde::MerdeError<'de>> {
        use merde::DynDeserializerExt;
        let mut cell = Cell {
            cell_type: None,
            source: None,
        };
        de.next().await?.into_map_start()?;
        loop {
            match de.next().await? {
                merde::Event::Str(key) => {
                    if key == "cell_type" {
                        cell.cell_type = de.t().await?;
                    } else if key == "source" {
                        cell.source = de.t().await?;
                    } else {
                        let _: merde::Value<'de> = de.t().await?;
                    }
                }
                merde::Event::MapEnd => return Ok(cell),
                e => {
                    return Err(merde::MerdeError::UnexpectedEvent {
                        got: merde::EventType::from(&e),
                        expected: &[merde::EventType::Str],
                        help: None,
                    })
                }
            }
        }
    }
}

enum CellKind {
    Code,
    Prose,
}

impl CellKind {
    fn of(cell_type: &str) -> Option<Self> {
        match cell_type {
            "code" => Some(Self::Code),
            "markdown" | "raw" => Some(Self::Prose),
            _ => None,
        }
    }

    fn fence_tag(&self) -> &'static str {
        match self {
            Self::Code => "python",
            Self::Prose => "markdown",
        }
    }
}

/// Flatten a notebook into fenced blocks, one per code/markdown/raw cell,
/// separated by a blank line. Unparseable input yields [`INVALID_NOTEBOOK`].
pub fn render_notebook(content: &str) -> String {
    let notebook: Notebook = match merde::json::from_str(content) {
        Ok(notebook) => notebook,
        Err(e) => {
            log::warn!("invalid notebook: {}", e);
            return INVALID_NOTEBOOK.to_string();
        }
    };
    notebook
        .cells
        .into_iter()
        .filter_map(|cell| {
            let kind = CellKind::of(cell.cell_type.as_deref().unwrap_or_default())?;
            let source = cell.source.unwrap_or_default();
            Some(format!("```{}\n{}\n```", kind.fence_tag(), source.as_ref()))
        })
        .collect::<Vec<String>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_code_cell() {
        let rendered = render_notebook(r#"{"cells":[{"cell_type":"code","source":["x=1"]}]}"#);
        assert_eq!(rendered, "```python\nx=1\n```");
    }

    #[test]
    fn fragments_are_concatenated_and_cells_joined() {
        let rendered = render_notebook(
            r##"{
                "cells": [
                    {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "intro"]},
                    {
                        "cell_type": "code",
                        "execution_count": 3,
                        "id": "abc",
                        "metadata": {"tags": ["x"], "nested": {"deep": [1, {"a": 2}]}},
                        "outputs": [{"output_type": "stream", "name": "stdout", "text": ["1\n"]}],
                        "source": "print(1)\nprint(2)"
                    },
                    {"cell_type": "raw", "source": []},
                    {"cell_type": "heading", "source": "skipped"}
                ],
                "metadata": {"kernelspec": {"name": "python3"}},
                "nbformat": 4,
                "nbformat_minor": 5
            }"##,
        );
        assert_eq!(
            rendered,
            "```markdown\n# Title\nintro\n```\n\n```python\nprint(1)\nprint(2)\n```\n\n```markdown\n\n```"
        );
    }

    #[test]
    fn missing_cells_render_empty() {
        assert_eq!(render_notebook("{}"), "");
        assert_eq!(render_notebook(r#"{"cells": []}"#), "");
    }

    #[test]
    fn execution_count_may_be_null() {
        let rendered = render_notebook(
            r#"{"cells":[{"cell_type":"code","execution_count":null,"outputs":[],"source":"a"}]}"#,
        );
        assert_eq!(rendered, "```python\na\n```");
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let rendered = render_notebook(
            r#"{"cells":[{"cell_type":"code","source":["x=1"]}],"worksheets":[]}"#,
        );
        assert_eq!(rendered, "```python\nx=1\n```");
        let rendered = render_notebook(
            r#"{
                "worksheets": [{"cells": []}],
                "cells": [
                    {"collapsed": false, "cell_type": "code", "source": ["x=1"]},
                    {"extra": {"deep": [1, {"a": [null, true]}]}, "cell_type": "raw", "source": "r"}
                ]
            }"#,
        );
        assert_eq!(rendered, "```python\nx=1\n```\n\n```markdown\nr\n```");
    }

    #[test]
    fn garbage_gives_marker() {
        assert_eq!(render_notebook("not json"), INVALID_NOTEBOOK);
        assert_eq!(render_notebook(""), INVALID_NOTEBOOK);
    }
}
