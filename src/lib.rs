pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod visit;
pub mod syntax;
pub mod semantic;
pub mod cancel;
pub mod config;
pub mod document;
pub mod refactor;

pub use cancel::CancellationToken;
pub use config::EngineConfig;
pub use diagnostics::{ApplyError, Cancelled, ConfigError, SyntaxError};
pub use document::Document;
pub use refactor::{CodeAction, Outcome, ProviderRegistry, RefactoringContext};
pub use semantic::{SemanticModel, SourceModel};
pub use span::Span;

/// Index `document` with a `SourceModel` and run every default provider at `span`.
///
/// Convenience entry for hosts that do not keep their own semantic model.
pub fn refactorings_at(
    document: &Document,
    span: Span,
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<Vec<CodeAction>, Cancelled> {
    let model = SourceModel::new(&document.root);
    let ctx = RefactoringContext::new(document, &model, span, cancel, config);
    ProviderRegistry::with_defaults().compute_actions(&ctx)
}
