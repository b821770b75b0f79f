use std::path::Path;

/// File kinds the pipeline knows how to transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Json,
    Css,
    Markdown,
    Yaml,
}

impl FileKind {
    /// Infer the kind from a path's extension. `None` means no transform
    /// applies and the file is skipped.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "json" => Some(Self::Json),
            "css" | "scss" => Some(Self::Css),
            "md" => Some(Self::Markdown),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Code kinds go through the lint fixer.
    pub fn lintable(&self) -> bool {
        matches!(
            self,
            Self::JavaScript | Self::Jsx | Self::TypeScript | Self::Tsx
        )
    }

    /// Every known kind goes through the formatter.
    pub fn formattable(&self) -> bool {
        true
    }

    /// Stable name passed to fixer processes as a file-type hint.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Json => "json",
            Self::Css => "css",
            Self::Markdown => "markdown",
            Self::Yaml => "yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn code_extensions_are_lintable() {
        for ext in ["js", "jsx", "ts", "tsx", "mjs", "cts"] {
            let path = PathBuf::from(format!("src/app.{ext}"));
            let kind = FileKind::from_path(&path).unwrap();
            assert!(kind.lintable(), "{ext} should be lintable");
            assert!(kind.formattable());
        }
    }

    #[test]
    fn data_extensions_format_only() {
        for ext in ["json", "css", "md", "yaml"] {
            let path = PathBuf::from(format!("config.{ext}"));
            let kind = FileKind::from_path(&path).unwrap();
            assert!(!kind.lintable(), "{ext} should not be lintable");
            assert!(kind.formattable());
        }
    }

    #[test]
    fn unknown_extensions_have_no_kind() {
        assert_eq!(FileKind::from_path(Path::new("binary.png")), None);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), None);
        assert_eq!(FileKind::from_path(Path::new("script.rs")), None);
    }

    #[test]
    fn hint_is_stable() {
        assert_eq!(FileKind::TypeScript.hint(), "typescript");
        assert_eq!(FileKind::Markdown.hint(), "markdown");
    }
}
