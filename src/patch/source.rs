//! Parsing entry point for component source files.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::PatchError;

/// Pick the parser dialect from the file extension.
///
/// Plain `.ts` keeps JSX off so generic arrows (`<T>(x) => x`) still parse;
/// every other known extension gets JSX enabled. Unknown extensions fall
/// back to TSX, the most permissive dialect.
pub fn source_type_for(path: &Path) -> SourceType {
    match SourceType::from_path(path) {
        Ok(source_type) if source_type.is_typescript() => source_type,
        Ok(source_type) => source_type.with_jsx(true),
        Err(_) => SourceType::tsx(),
    }
}

/// Parse `source` into a program, rejecting files with syntax errors.
pub fn parse<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    path: &Path,
) -> Result<Program<'a>, PatchError> {
    let ret = Parser::new(allocator, source, source_type_for(path)).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(PatchError::Parse {
            path: path.display().to_string(),
            message,
        });
    }

    Ok(ret.program)
}

/// File stem used to match an anonymous default export (`App.tsx` -> `App`).
pub fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
