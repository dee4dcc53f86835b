//! True-head resolution through artificial nodes
//!
//! Artificial nodes model ellipsis: a word's annotated governor may be a
//! placeholder rather than another word. The *true head* of a word is its
//! nearest ancestor that is a real word, or the root marker `"0"`, found by
//! climbing head pointers through consecutive artificial nodes.
//!
//! Climbing is an explicit loop with a visited set, so cyclic or dangling
//! chains come back as a [`ResolveError`] instead of running away.

use crate::token::{ROOT_HEAD, Token};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Error for a malformed artificial chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("head cycle among artificial nodes for token {id}: {}", chain.join(" -> "))]
    Cycle { id: String, chain: Vec<String> },

    #[error("artificial chain of token {id} ends at unknown head {head}")]
    DanglingHead { id: String, head: String },
}

/// Resolves true heads for the tokens of one sentence
///
/// Ids are indexed once; when an id is duplicated, the first token carrying
/// it wins.
#[derive(Debug)]
pub struct HeadResolver<'a> {
    artificial: FxHashMap<&'a str, &'a Token>,
    ids: FxHashSet<&'a str>,
}

impl<'a> HeadResolver<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut artificial = FxHashMap::default();
        let mut ids = FxHashSet::default();

        for token in tokens {
            ids.insert(token.id.as_str());
            if token.is_artificial() {
                artificial.entry(token.id.as_str()).or_insert(token);
            }
        }

        Self { artificial, ids }
    }

    /// Whether `id` names an artificial node of this sentence
    pub fn is_artificial(&self, id: &str) -> bool {
        self.artificial.contains_key(id)
    }

    /// Nearest real-word ancestor of `token`, or `"0"`
    ///
    /// A head that is not artificial is returned as is, without lookup.
    pub fn resolve<'t>(&'t self, token: &'t Token) -> Result<&'t str, ResolveError> {
        let head = token.head.as_str();
        if !self.is_artificial(head) {
            return Ok(head);
        }

        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut chain: Vec<&str> = Vec::new();
        let mut current = head;

        while let Some(node) = self.artificial.get(current) {
            if !visited.insert(current) {
                chain.push(current);
                return Err(ResolveError::Cycle {
                    id: token.id.clone(),
                    chain: chain.into_iter().map(str::to_string).collect(),
                });
            }
            chain.push(current);

            log::debug!("token {}: climbing through artificial node {}", token.id, current);
            current = node.head.as_str();
        }

        if current != ROOT_HEAD && !self.ids.contains(current) {
            return Err(ResolveError::DanglingHead {
                id: token.id.clone(),
                head: current.to_string(),
            });
        }

        Ok(current)
    }
}

/// Resolve the true head of `token` within `tokens`
///
/// Convenience for single lookups; build a [`HeadResolver`] once per sentence
/// when resolving many tokens.
pub fn true_head(token: &Token, tokens: &[Token]) -> Result<String, ResolveError> {
    HeadResolver::new(tokens).resolve(token).map(str::to_string)
}

/// Whether the immediate head of `token` is an artificial node
pub fn is_governed_by_artificial(token: &Token, tokens: &[Token]) -> bool {
    tokens
        .iter()
        .find(|t| t.id == token.head)
        .is_some_and(Token::is_artificial)
}
