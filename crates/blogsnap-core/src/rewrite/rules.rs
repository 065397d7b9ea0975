//! Ordered regex substitutions from config, applied after URL mapping.
//!
//! Used for site-specific fixups such as collapsing a wrongly nested
//! `/assets/<host>/assets/` prefix. `$1`-style group references are expanded.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// One `pattern` -> `replacement` rule as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
}

/// Compiled rules, applied in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(Regex, String)>,
}

impl RuleSet {
    /// Fails on the first pattern that does not compile, naming its index.
    pub fn compile(rules: &[RewriteRule]) -> Result<Self> {
        let compiled = rules
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let re = Regex::new(&r.pattern)
                    .with_context(|| format!("rewrite rule {}: invalid pattern {:?}", i, r.pattern))?;
                Ok((re, r.replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule in order. Returns the new text and total substitutions.
    pub fn apply(&self, html: &str) -> (String, usize) {
        let mut current = html.to_string();
        let mut count = 0;
        for (re, replacement) in &self.rules {
            let replaced = re
                .replace_all(&current, |caps: &Captures| {
                    count += 1;
                    let mut dst = String::new();
                    caps.expand(replacement, &mut dst);
                    dst
                })
                .into_owned();
            current = replaced;
        }
        (current, count)
    }
}
