//! Rule dispatch: which transform chain handles a module.
//!
//! Rules are tried in declared order and the first match wins. A rule
//! matches when its pattern matches the module's absolute path (written
//! with `/` separators), the path lies under one of its `include`
//! directories (if any), and under none of its `exclude` directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kite_config::{KiteConfig, RuleConfig};
use path_clean::PathClean;
use regex::Regex;
use serde_json::Value;

use crate::transforms::{Transform, TransformContext, TransformRegistry};
use crate::{Error, Result};

struct ChainStep {
    transform: Arc<dyn Transform>,
    options: Value,
}

/// Transforms of one rule, stored in declared order.
#[derive(Default)]
pub struct TransformChain {
    steps: Vec<ChainStep>,
}

impl TransformChain {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Transform names in declared order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.transform.name()).collect()
    }

    /// Runs the chain last-to-first, feeding each output into the next.
    ///
    /// `ctx.options` is replaced per step with that step's options.
    pub fn run(&self, input: String, ctx: TransformContext<'_>) -> Result<String> {
        let mut content = input;
        for step in self.steps.iter().rev() {
            let step_ctx = TransformContext {
                options: &step.options,
                ..ctx
            };
            content = step
                .transform
                .transform(&content, &step_ctx)
                .map_err(|failure| Error::Transform {
                    path: ctx.path.to_path_buf(),
                    transform: step.transform.name().to_string(),
                    diagnostic: failure.diagnostic,
                })?;
        }
        Ok(content)
    }
}

impl std::fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A compiled loader rule.
#[derive(Debug)]
pub struct Rule {
    test: Regex,
    include: Vec<PathBuf>,
    exclude: Vec<PathBuf>,
    chain: TransformChain,
}

impl Rule {
    pub fn matches(&self, path: &Path) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        if self.exclude.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }
        self.test.is_match(&slash_path(path))
    }

    pub fn chain(&self) -> &TransformChain {
        &self.chain
    }
}

/// Ordered rule list.
#[derive(Debug, Default)]
pub struct DispatchTable {
    rules: Vec<Rule>,
}

impl DispatchTable {
    /// Compile `config.rules`, anchoring include/exclude directories at the root.
    ///
    /// A relative root works as long as module paths come from
    /// [`KiteConfig::root_path`].
    pub fn from_config(config: &KiteConfig, registry: &TransformRegistry) -> Result<Self> {
        Self::from_rules(&config.rules, &config.root, registry)
    }

    pub fn from_rules(rules: &[RuleConfig], root: &Path, registry: &TransformRegistry) -> Result<Self> {
        // Module paths are normalized, so `./` and `..` segments must go here too.
        let anchor = |dir: &PathBuf| root.join(dir).clean();

        let mut compiled = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            let test = Regex::new(&rule.test).map_err(|e| {
                Error::InvalidConfig(format!("rule #{index} has an invalid test pattern: {e}"))
            })?;

            let mut steps = Vec::with_capacity(rule.uses.len());
            for use_config in &rule.uses {
                let transform =
                    registry
                        .get(&use_config.transform)
                        .ok_or_else(|| Error::UnknownTransform {
                            name: use_config.transform.clone(),
                            rule: index,
                        })?;
                steps.push(ChainStep {
                    transform,
                    options: use_config.options.clone().unwrap_or(Value::Null),
                });
            }

            compiled.push(Rule {
                test,
                include: rule.include.iter().map(anchor).collect(),
                exclude: rule.exclude.iter().map(anchor).collect(),
                chain: TransformChain { steps },
            });
        }

        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Index of the first matching rule.
    pub fn rule_index(&self, path: &Path) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matches(path))
    }

    /// The chain for `path`, or [`Error::NoMatchingRule`].
    pub fn dispatch(&self, path: &Path) -> Result<&TransformChain> {
        self.rule_index(path)
            .map(|index| &self.rules[index].chain)
            .ok_or_else(|| Error::NoMatchingRule {
                path: path.to_path_buf(),
            })
    }
}

fn slash_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
