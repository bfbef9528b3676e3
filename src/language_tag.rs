/// Language token written after the opening fence of a block.
///
/// Tags only ever come from the static tables below, so they are never empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LanguageTag(&'static str);

impl LanguageTag {
    pub const TEXT: Self = Self("text");
    pub const JUPYTER: Self = Self("jupyter");

    pub fn as_str(&self) -> &'static str {
        let Self(inner) = self;
        inner
    }

    pub fn is_notebook(&self) -> bool {
        *self == Self::JUPYTER
    }
}

impl AsRef<str> for LanguageTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole (lowercased) filenames that win over any extension rule.
pub static SPECIAL_FILENAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "dockerfile" => "dockerfile",
    "dockerfile.dev" => "dockerfile",
    "dockerfile.prod" => "dockerfile",
    "makefile" => "makefile",
    "readme" => "markdown",
    "readme.md" => "markdown",
    "package.json" => "json",
    "tsconfig.json" => "json",
    "composer.json" => "json",
    ".gitignore" => "gitignore",
    ".env" => "env",
    "requirements.txt" => "text",
    "license" => "text",
};

/// Extension (with its leading dot) to tag.
pub static EXTENSIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    // web
    ".js" => "javascript",
    ".jsx" => "jsx",
    ".ts" => "typescript",
    ".tsx" => "tsx",
    ".html" => "html",
    ".htm" => "html",
    ".css" => "css",
    ".scss" => "scss",
    ".sass" => "sass",
    ".less" => "less",
    ".vue" => "vue",
    ".svelte" => "svelte",

    // programming languages
    ".py" => "python",
    ".ipynb" => "jupyter",
    ".java" => "java",
    ".c" => "c",
    ".h" => "c",
    ".cpp" => "cpp",
    ".cc" => "cpp",
    ".hpp" => "cpp",
    ".cs" => "csharp",
    ".go" => "go",
    ".rs" => "rust",
    ".rb" => "ruby",
    ".php" => "php",
    ".kt" => "kotlin",
    ".kts" => "kotlin",
    ".swift" => "swift",
    ".scala" => "scala",
    ".r" => "r",
    ".dart" => "dart",
    ".lua" => "lua",
    ".pl" => "perl",
    ".sh" => "shell",
    ".bash" => "bash",
    ".zsh" => "shell",
    ".fish" => "shell",

    // markup and data
    ".xml" => "xml",
    ".svg" => "svg",
    ".yaml" => "yaml",
    ".yml" => "yaml",
    ".json" => "json",
    ".md" => "markdown",
    ".tex" => "latex",
    ".sql" => "sql",
    ".graphql" => "graphql",
    ".gql" => "graphql",

    // other text
    ".txt" => "text",
    ".log" => "text",
    ".csv" => "csv",
    ".ini" => "ini",
    ".conf" => "conf",
    ".toml" => "toml",
    ".properties" => "properties",
    ".gradle" => "gradle",
};

/// One step of classification. Rules are tried in order and the first hit wins.
#[derive(Clone, Copy, Debug)]
enum Rule {
    ExactName(&'static phf::Map<&'static str, &'static str>),
    Extension(&'static phf::Map<&'static str, &'static str>),
}

static RULES: [Rule; 2] = [Rule::ExactName(&SPECIAL_FILENAMES), Rule::Extension(&EXTENSIONS)];

impl Rule {
    fn apply(&self, lowercase_name: &str) -> Option<LanguageTag> {
        match self {
            Self::ExactName(table) => table.get(lowercase_name).copied().map(LanguageTag),
            Self::Extension(table) => extension_of(lowercase_name)
                .and_then(|ext| table.get(ext))
                .copied()
                .map(LanguageTag),
        }
    }
}

/// Pick the language tag for an uploaded file by name alone. Never fails.
pub fn classify(filename: impl AsRef<str>) -> LanguageTag {
    let lowercase_name = filename.as_ref().to_lowercase();
    RULES
        .iter()
        .find_map(|rule| rule.apply(&lowercase_name))
        .unwrap_or(LanguageTag::TEXT)
}

/// Extension including the dot, taken from the last path component.
/// Leading dots belong to the stem, so ".bashrc" has no extension.
fn extension_of(filename: &str) -> Option<&str> {
    let base = match filename.rfind('/') {
        Some(idx) => &filename[idx + 1..],
        None => filename,
    };
    let stem_start = base.len() - base.trim_start_matches('.').len();
    base[stem_start..]
        .rfind('.')
        .map(|idx| &base[stem_start + idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_names_ignore_case() {
        for (name, tag) in SPECIAL_FILENAMES.entries() {
            assert_eq!(classify(name).as_str(), *tag, "{name}");
            assert_eq!(classify(name.to_uppercase()).as_str(), *tag, "{name}");
        }
        assert_eq!(classify("DOCKERFILE").as_str(), "dockerfile");
        assert_eq!(classify("Dockerfile.dev").as_str(), "dockerfile");
    }

    #[test]
    fn every_extension_maps() {
        for (ext, tag) in EXTENSIONS.entries() {
            assert_eq!(classify(format!("x{ext}")).as_str(), *tag, "{ext}");
        }
    }

    #[test]
    fn unknown_falls_back_to_text() {
        assert_eq!(classify("unknown.xyz"), LanguageTag::TEXT);
        assert_eq!(classify("noextension"), LanguageTag::TEXT);
        assert_eq!(classify("trailing."), LanguageTag::TEXT);
        assert_eq!(classify(""), LanguageTag::TEXT);
        assert_eq!(classify(".bashrc"), LanguageTag::TEXT);
    }

    #[test]
    fn extension_comes_from_last_component() {
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("src.d/main"), None);
        assert_eq!(extension_of("src/main.rs"), Some(".rs"));
        assert_eq!(extension_of("..hidden.py"), Some(".py"));
        assert_eq!(classify("Nested/Path/Script.PY").as_str(), "python");
        assert!(classify("analysis.IPYNB").is_notebook());
    }
}
