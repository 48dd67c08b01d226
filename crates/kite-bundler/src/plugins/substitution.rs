//! Resolution-time module substitution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use kite_config::KiteConfig;
use regex::Regex;

use super::{Phase, PipelineContext, Plugin, Resolution};
use crate::module::module_key;
use crate::{Error, Result};

/// Swaps requests matching `pattern` for `replacement`.
///
/// With an `issuer` pattern, only requests made by files whose root-relative
/// path matches it are swapped, so the rule covers one dependency subtree.
#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    pattern: Regex,
    replacement: PathBuf,
    issuer: Option<Regex>,
}

impl SubstitutionRule {
    pub fn new(pattern: &str, replacement: impl Into<PathBuf>, issuer: Option<&str>) -> Result<Self> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| {
                Error::InvalidConfig(format!("invalid substitution pattern '{p}': {e}"))
            })
        };
        Ok(Self {
            pattern: compile(pattern)?,
            replacement: replacement.into(),
            issuer: issuer.map(compile).transpose()?,
        })
    }

    /// `shouldSubstitute(request)`: the replacement when the rule applies.
    pub fn should_substitute(&self, request: &str, issuer_key: &str) -> Option<&Path> {
        if !self.pattern.is_match(request) {
            return None;
        }
        if let Some(issuer) = &self.issuer {
            if !issuer.is_match(issuer_key) {
                return None;
            }
        }
        Some(&self.replacement)
    }
}

/// Applies [`SubstitutionRule`]s before a request is looked up.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionPlugin {
    rules: Vec<SubstitutionRule>,
}

impl SubstitutionPlugin {
    pub fn new(rules: Vec<SubstitutionRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &KiteConfig) -> Result<Self> {
        config
            .substitutions
            .iter()
            .map(|s| {
                SubstitutionRule::new(&s.pattern, config.root_path(&s.replacement), s.issuer.as_deref())
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Plugin for SubstitutionPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("kite:substitution")
    }

    fn phase(&self) -> Phase {
        Phase::Resolve
    }

    fn resolve_id(
        &self,
        request: &str,
        importer: &Path,
        ctx: &PipelineContext,
    ) -> Result<Option<Resolution>> {
        let issuer_key = module_key(&ctx.root, importer);
        // first matching rule; no further rules are consulted
        let Some(replacement) = self
            .rules
            .iter()
            .find_map(|rule| rule.should_substitute(request, &issuer_key))
        else {
            return Ok(None);
        };
        // never substitute the stand-in for itself
        if importer == replacement {
            return Ok(None);
        }
        tracing::debug!(request, replacement = %replacement.display(), "substituted");
        Ok(Some(Resolution::Substituted(replacement.to_path_buf())))
    }
}
