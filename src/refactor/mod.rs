//! Span-triggered refactoring providers and their registry.

pub mod action;
pub mod build;
pub mod contract_requires;
pub mod equivalence;
pub mod naming;
pub mod trigger;
pub mod use_as_null_check;

pub use action::{ensure_using, ActionInfo, CodeAction, Fragment, Severity};

use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::diagnostics::Cancelled;
use crate::document::Document;
use crate::semantic::SemanticModel;
use crate::span::Span;
use crate::syntax::{find_innermost, SyntaxKind};
use tracing::{debug, trace};

/// Everything a provider may look at for one invocation.
#[derive(Clone, Copy)]
pub struct RefactoringContext<'a> {
    pub document: &'a Document,
    pub model: &'a dyn SemanticModel,
    /// Cursor position (empty span) or selection.
    pub span: Span,
    pub cancel: &'a CancellationToken,
    pub config: &'a EngineConfig,
}

impl<'a> RefactoringContext<'a> {
    pub fn new(
        document: &'a Document,
        model: &'a dyn SemanticModel,
        span: Span,
        cancel: &'a CancellationToken,
        config: &'a EngineConfig,
    ) -> Self {
        Self { document, model, span, cancel, config }
    }
}

/// Result of running one provider that was not cancelled.
#[derive(Debug)]
pub enum Outcome {
    NoMatch,
    Actions(Vec<CodeAction>),
}

impl Outcome {
    pub fn into_actions(self) -> Vec<CodeAction> {
        match self {
            Outcome::NoMatch => Vec::new(),
            Outcome::Actions(actions) => actions,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Actions(actions) if !actions.is_empty())
    }
}

pub type ComputeFn = fn(&RefactoringContext<'_>) -> Result<Outcome, Cancelled>;

/// A registered provider: id, the node kind that triggers it, and its matcher.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub id: &'static str,
    pub trigger: SyntaxKind,
    pub compute: ComputeFn,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in provider, in a fixed order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(use_as_null_check::provider());
        registry.register(contract_requires::provider());
        registry
    }

    /// Add a provider; a provider with the same id is replaced in place.
    pub fn register(&mut self, provider: Provider) {
        match self.providers.iter_mut().find(|p| p.id == provider.id) {
            Some(existing) => *existing = provider,
            None => self.providers.push(provider),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.iter().map(|p| p.id)
    }

    /// Run one provider by id, honouring its trigger kind.
    pub fn run(&self, id: &str, ctx: &RefactoringContext<'_>) -> Result<Outcome, Cancelled> {
        match self.get(id) {
            Some(provider) => run_provider(provider, ctx),
            None => Ok(Outcome::NoMatch),
        }
    }

    /// Run every enabled provider in registration order and concatenate
    /// their actions. A cancelled run never returns a partial list.
    pub fn compute_actions(&self, ctx: &RefactoringContext<'_>) -> Result<Vec<CodeAction>, Cancelled> {
        let mut actions = Vec::new();
        for provider in &self.providers {
            if !ctx.config.is_enabled(provider.id) {
                trace!(provider = provider.id, "provider disabled");
                continue;
            }
            ctx.cancel.check()?;
            actions.extend(run_provider(provider, ctx)?.into_actions());
        }
        ctx.cancel.check()?;
        debug!(document = %ctx.document.name, count = actions.len(), "computed refactorings");
        Ok(actions)
    }
}

fn run_provider(provider: &Provider, ctx: &RefactoringContext<'_>) -> Result<Outcome, Cancelled> {
    if find_innermost(&ctx.document.root, ctx.span, provider.trigger).is_none() {
        trace!(provider = provider.id, kind = %provider.trigger, "no trigger node under cursor");
        return Ok(Outcome::NoMatch);
    }
    let outcome = (provider.compute)(ctx)?;
    match &outcome {
        Outcome::NoMatch => trace!(provider = provider.id, start = ctx.span.start, "no match"),
        Outcome::Actions(actions) => {
            debug!(provider = provider.id, start = ctx.span.start, count = actions.len(), "offering actions")
        }
    }
    Ok(outcome)
}
