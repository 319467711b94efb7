//! Comment syntax lookup by destination file type

use std::collections::BTreeMap;
use std::path::Path;

/// Line comment syntax used to embed markers in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentStyle {
    /// `# comment`
    Hash,
    /// `// comment`
    Slash,
    /// `-- comment`
    Dash,
    /// `/* comment */`
    Css,
    /// `<!-- comment -->`
    Html,
    /// Configured prefix and optional suffix
    Custom { prefix: String, suffix: String },
}

impl CommentStyle {
    pub fn prefix(&self) -> &str {
        match self {
            Self::Hash => "#",
            Self::Slash => "//",
            Self::Dash => "--",
            Self::Css => "/*",
            Self::Html => "<!--",
            Self::Custom { prefix, .. } => prefix,
        }
    }

    pub fn suffix(&self) -> &str {
        match self {
            Self::Css => "*/",
            Self::Html => "-->",
            Self::Custom { suffix, .. } => suffix,
            Self::Hash | Self::Slash | Self::Dash => "",
        }
    }

    /// Render `text` as a single comment line.
    pub fn line(&self, text: &str) -> String {
        let suffix = self.suffix();
        if suffix.is_empty() {
            format!("{} {}", self.prefix(), text)
        } else {
            format!("{} {} {}", self.prefix(), text, suffix)
        }
    }

    /// Built-in style for a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" | "sh" | "bash" | "zsh" | "yaml" | "yml" | "toml" | "rb" | "r"
            | "pl" | "cfg" | "conf" | "ini" | "txt" | "just" | "tf" | "mk" | "dockerfile" => {
                Some(Self::Hash)
            }
            "go" | "rs" | "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "java" | "kt" | "kts"
            | "swift" | "c" | "h" | "cpp" | "hpp" | "cc" | "cs" | "scala" | "dart" | "proto"
            | "groovy" | "gradle" | "scss" => Some(Self::Slash),
            "sql" | "lua" | "hs" => Some(Self::Dash),
            "css" => Some(Self::Css),
            "md" | "markdown" | "html" | "htm" | "xml" | "svg" | "vue" => Some(Self::Html),
            _ => None,
        }
    }

    /// Built-in style for well-known extensionless file names.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "justfile" | "Justfile" | "Makefile" | "makefile" | "Dockerfile" | ".gitignore"
            | ".dockerignore" | ".gitattributes" | ".env" | "CODEOWNERS" => Some(Self::Hash),
            _ => None,
        }
    }
}

/// Resolves the comment style for a path, with per-extension overrides
/// taking precedence over the built-in table.
#[derive(Debug, Clone, Default)]
pub struct CommentTable {
    overrides: BTreeMap<String, CommentStyle>,
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom prefix/suffix for an extension (leading dot optional).
    pub fn with_override(
        mut self,
        extension: &str,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.overrides.insert(
            extension.trim_start_matches('.').to_lowercase(),
            CommentStyle::Custom {
                prefix: prefix.into(),
                suffix: suffix.into(),
            },
        );
        self
    }

    pub fn style_for(&self, path: &Path) -> Option<CommentStyle> {
        let name = path.file_name()?.to_str()?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        if let Some(ext) = &extension
            && let Some(style) = self.overrides.get(ext)
        {
            return Some(style.clone());
        }

        CommentStyle::from_file_name(name)
            .or_else(|| extension.as_deref().and_then(CommentStyle::from_extension))
    }
}
