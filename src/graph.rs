//! Dependency graph view of a sentence
//!
//! Builds a `petgraph` tree with a virtual `TOP` node (address 0) above the
//! tokens attached to the root. Edges run from head to dependent and carry
//! the relation label. Triples `((head_form, head_tag), relation,
//! (dep_form, dep_tag))` are read off depth-first from `TOP`, whose form is
//! empty and whose tag is `TOP`.

use crate::export::{ExportOptions, mediated_relation};
use crate::resolve::HeadResolver;
use crate::sentence::Sentence;
use crate::token::{RELATION_ERROR, ROOT_HEAD, Token};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Relation used for the root attachment when the root token has none
pub const DEFAULT_ROOT_RELATION: &str = "PRED";

/// Tag of the virtual top node
pub const TOP_TAG: &str = "TOP";

/// Error building a dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("sentence {sentence} has no token attached to the root")]
    NoRoot { sentence: String },

    #[error("token {id} in sentence {sentence} has unknown head {head}")]
    UnknownHead {
        sentence: String,
        id: String,
        head: String,
    },
}

/// Settings for graph construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    pub root_relation: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            root_relation: DEFAULT_ROOT_RELATION.to_string(),
        }
    }
}

/// A node of the graph; position 0 is the virtual top node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub form: String,
    pub postag: String,
    pub artificial: bool,
    pub position: usize,
}

impl GraphNode {
    fn top() -> Self {
        Self {
            id: ROOT_HEAD.to_string(),
            form: String::new(),
            postag: TOP_TAG.to_string(),
            artificial: false,
            position: 0,
        }
    }

    fn from_token(token: &Token, position: usize) -> Self {
        Self {
            id: token.id.clone(),
            form: token.form.clone(),
            postag: token.postag.clone(),
            artificial: token.is_artificial(),
            position,
        }
    }

    pub fn is_top(&self) -> bool {
        self.position == 0
    }

    fn label(&self) -> (String, String) {
        (self.form.clone(), self.postag.clone())
    }
}

/// A `(head, relation, dependent)` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub head: (String, String),
    pub relation: String,
    pub dependent: (String, String),
}

/// One token with the head and relation it is attached by
struct Attachment<'a> {
    token: &'a Token,
    head: Option<&'a str>,
    relation: &'a str,
}

pub type DependencyPetgraph = Graph<GraphNode, String, Directed>;

/// Labelled dependency tree over one sentence
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DependencyPetgraph,
    top: NodeIndex,
    index: FxHashMap<String, NodeIndex>,
    root_relation: String,
}

impl DependencyGraph {
    /// Graph of the annotated tree, artificial nodes included
    pub fn from_sentence(sentence: &Sentence, config: &GraphConfig) -> Result<Self, GraphError> {
        let attachments = sentence
            .tokens
            .iter()
            .map(|token| Attachment {
                token,
                head: Some(token.head.as_str()),
                relation: token.relation.as_str(),
            })
            .collect();

        Self::build(sentence, attachments, config)
    }

    /// Graph over real words only, attached to their true heads
    ///
    /// Relations follow the export policy in `options`: words attached
    /// through ellipsis get the mediated relation. Words whose head cannot be
    /// resolved are logged and left unattached.
    pub fn resolved(sentence: &Sentence, config: &GraphConfig, options: &ExportOptions) -> Result<Self, GraphError> {
        let resolver = HeadResolver::new(&sentence.tokens);

        let attachments = sentence
            .words()
            .map(|token| match resolver.resolve(token) {
                Ok(head) => Attachment {
                    token,
                    head: Some(head),
                    relation: mediated_relation(token, head, options),
                },
                Err(e) => {
                    log::warn!(
                        "Leaving token {} of sentence {} unattached: {}",
                        token.id,
                        sentence.meta.label(),
                        e
                    );
                    Attachment {
                        token,
                        head: None,
                        relation: token.relation.as_str(),
                    }
                }
            })
            .collect();

        Self::build(sentence, attachments, config)
    }

    fn build(sentence: &Sentence, attachments: Vec<Attachment<'_>>, config: &GraphConfig) -> Result<Self, GraphError> {
        let mut graph = DependencyPetgraph::new();
        let top = graph.add_node(GraphNode::top());
        let mut index: FxHashMap<String, NodeIndex> = FxHashMap::default();

        let nodes: Vec<NodeIndex> = attachments
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let idx = graph.add_node(GraphNode::from_token(a.token, i + 1));
                index.entry(a.token.id.clone()).or_insert(idx);
                idx
            })
            .collect();

        let mut root_relation = None;

        for (a, &node) in attachments.iter().zip(&nodes) {
            let Some(head) = a.head else { continue };

            if head == ROOT_HEAD {
                let relation = if a.relation == RELATION_ERROR {
                    config.root_relation.as_str()
                } else {
                    a.relation
                };
                root_relation.get_or_insert_with(|| relation.to_string());
                graph.add_edge(top, node, relation.to_string());
            } else {
                let head_idx = index.get(head).copied().ok_or_else(|| GraphError::UnknownHead {
                    sentence: sentence.meta.label().to_string(),
                    id: a.token.id.clone(),
                    head: head.to_string(),
                })?;
                graph.add_edge(head_idx, node, a.relation.to_string());
            }
        }

        let root_relation = root_relation.ok_or_else(|| GraphError::NoRoot {
            sentence: sentence.meta.label().to_string(),
        })?;

        Ok(Self {
            graph,
            top,
            index,
            root_relation,
        })
    }

    /// Underlying petgraph structure
    pub fn petgraph(&self) -> &DependencyPetgraph {
        &self.graph
    }

    /// Relation of the root attachment
    pub fn root_relation(&self) -> &str {
        &self.root_relation
    }

    pub fn top(&self) -> &GraphNode {
        &self.graph[self.top]
    }

    /// First token, in sentence order, attached to the root
    pub fn root(&self) -> &GraphNode {
        // build() guarantees at least one root attachment
        let idx = self.sorted_dependents(self.top)[0].1;
        &self.graph[idx]
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Dependents of `id` with their relations, in sentence order
    pub fn dependents(&self, id: &str) -> Vec<(&str, &GraphNode)> {
        let idx = match id {
            ROOT_HEAD => self.top,
            _ => match self.index.get(id) {
                Some(&idx) => idx,
                None => return Vec::new(),
            },
        };

        self.sorted_dependents(idx)
            .into_iter()
            .map(|(relation, child)| (relation, &self.graph[child]))
            .collect()
    }

    /// Head of `id`; the top node for root attachments
    pub fn head_of(&self, id: &str) -> Option<&GraphNode> {
        let idx = *self.index.get(id)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|edge| &self.graph[edge.source()])
    }

    fn sorted_dependents(&self, idx: NodeIndex) -> Vec<(&str, NodeIndex)> {
        let mut children: Vec<(&str, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.weight().as_str(), edge.target()))
            .collect();
        children.sort_by_key(|&(_, child)| self.graph[child].position);
        children
    }

    fn child_edges(&self, head: NodeIndex) -> Vec<(NodeIndex, &str, NodeIndex)> {
        self.sorted_dependents(head)
            .into_iter()
            .rev()
            .map(|(relation, child)| (head, relation, child))
            .collect()
    }

    /// Depth-first triples from the top node, dependents in sentence order
    ///
    /// Every root attachment comes out as a `TOP` triple followed by its
    /// subtree, so sentences with several roots keep all their triples.
    pub fn triples(&self) -> Vec<Triple> {
        let mut triples = Vec::new();
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        visited.insert(self.top);

        let mut stack = self.child_edges(self.top);

        while let Some((head, relation, dependent)) = stack.pop() {
            triples.push(Triple {
                head: self.graph[head].label(),
                relation: relation.to_string(),
                dependent: self.graph[dependent].label(),
            });

            if visited.insert(dependent) {
                stack.extend(self.child_edges(dependent));
            }
        }

        triples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::{RawWord, SentenceMeta};

    fn sentence(records: &[&[(&str, &str)]]) -> Sentence {
        let raw: Vec<RawWord> = records
            .iter()
            .map(|pairs| RawWord::from_pairs(pairs.iter().copied()))
            .collect();
        let meta = SentenceMeta {
            id: Some("7".to_string()),
            ..Default::default()
        };
        Sentence::assemble(meta, &raw)
    }

    /// μῆνιν ἄειδε θεὰ Πηληϊάδεω Ἀχιλῆος
    fn iliad() -> Sentence {
        sentence(&[
            &[("id", "1"), ("form", "μῆνιν"), ("postag", "n-s---fa-"), ("head", "2"), ("relation", "OBJ")],
            &[("id", "2"), ("form", "ἄειδε"), ("postag", "v2spma---"), ("head", "0"), ("relation", "PRED")],
            &[("id", "3"), ("form", "θεὰ"), ("postag", "n-s---fv-"), ("head", "2"), ("relation", "ExD")],
            &[("id", "4"), ("form", "Πηληϊάδεω"), ("postag", "n-s---mg-"), ("head", "5"), ("relation", "ATR")],
            &[("id", "5"), ("form", "Ἀχιλῆος"), ("postag", "n-s---mg-"), ("head", "1"), ("relation", "ATR")],
        ])
    }

    #[test]
    fn test_graph_structure() {
        let graph = DependencyGraph::from_sentence(&iliad(), &GraphConfig::default()).unwrap();

        assert_eq!(graph.root().form, "ἄειδε");
        assert_eq!(graph.root_relation(), "PRED");
        assert!(graph.head_of("2").unwrap().is_top());
        assert_eq!(graph.head_of("4").unwrap().id, "5");

        let dependents = graph.dependents("2");
        let deps: Vec<_> = dependents.iter().map(|(rel, n)| (*rel, n.id.as_str())).collect();
        assert_eq!(deps, vec![("OBJ", "1"), ("ExD", "3")]);

        assert_eq!(graph.dependents("0").len(), 1);
        assert!(graph.dependents("42").is_empty());
        assert_eq!(graph.petgraph().node_count(), 6);
        assert_eq!(graph.petgraph().edge_count(), 5);
    }

    #[test]
    fn test_triples_depth_first() {
        let graph = DependencyGraph::from_sentence(&iliad(), &GraphConfig::default()).unwrap();
        let triples: Vec<_> = graph
            .triples()
            .into_iter()
            .map(|t| (t.head.0, t.relation, t.dependent.0))
            .collect();

        let expected = vec![
            ("", "PRED", "ἄειδε"),
            ("ἄειδε", "OBJ", "μῆνιν"),
            ("μῆνιν", "ATR", "Ἀχιλῆος"),
            ("Ἀχιλῆος", "ATR", "Πηληϊάδεω"),
            ("ἄειδε", "ExD", "θεὰ"),
        ];
        let expected: Vec<_> = expected
            .into_iter()
            .map(|(h, r, d)| (h.to_string(), r.to_string(), d.to_string()))
            .collect();
        assert_eq!(triples, expected);
    }

    #[test]
    fn test_triples_carry_tags() {
        let graph = DependencyGraph::from_sentence(&iliad(), &GraphConfig::default()).unwrap();
        let triples = graph.triples();

        assert_eq!(triples[0].head, (String::new(), "TOP".to_string()));
        assert_eq!(triples[1].head, ("ἄειδε".to_string(), "v2spma---".to_string()));
        assert_eq!(triples[1].dependent, ("μῆνιν".to_string(), "n-s---fa-".to_string()));
    }

    #[test]
    fn test_no_root_is_an_error() {
        let s = sentence(&[
            &[("id", "1"), ("head", "2"), ("relation", "OBJ")],
            &[("id", "2"), ("head", "1"), ("relation", "OBJ")],
        ]);

        assert_eq!(
            DependencyGraph::from_sentence(&s, &GraphConfig::default()).unwrap_err(),
            GraphError::NoRoot {
                sentence: "7".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_head_is_an_error() {
        let s = sentence(&[
            &[("id", "1"), ("head", "0"), ("relation", "PRED")],
            &[("id", "2"), ("head", "9"), ("relation", "OBJ")],
        ]);

        assert!(matches!(
            DependencyGraph::from_sentence(&s, &GraphConfig::default()),
            Err(GraphError::UnknownHead { head, .. }) if head == "9"
        ));
    }

    #[test]
    fn test_missing_root_relation_uses_config() {
        let s = sentence(&[&[("id", "1"), ("form", "ναί")]]);
        let config = GraphConfig {
            root_relation: "ExD".to_string(),
        };

        let graph = DependencyGraph::from_sentence(&s, &config).unwrap();
        assert_eq!(graph.root_relation(), "ExD");
        assert_eq!(
            graph.triples(),
            vec![Triple {
                head: (String::new(), "TOP".to_string()),
                relation: "ExD".to_string(),
                dependent: ("ναί".to_string(), "_".to_string()),
            }]
        );
    }

    #[test]
    fn test_first_root_wins_with_multiple_roots() {
        let s = sentence(&[
            &[("id", "1"), ("form", "a"), ("head", "0"), ("relation", "PRED")],
            &[("id", "2"), ("form", "b"), ("head", "0"), ("relation", "AuxK")],
        ]);

        let graph = DependencyGraph::from_sentence(&s, &GraphConfig::default()).unwrap();
        assert_eq!(graph.root().id, "1");
        assert_eq!(graph.root_relation(), "PRED");
        assert_eq!(graph.dependents("0").len(), 2);
    }

    #[test]
    fn test_triples_cover_every_root() {
        // « ἔφη ἀνήρ .  with the quote and the full stop hanging from the root
        let s = sentence(&[
            &[("id", "1"), ("form", "«"), ("postag", "u--------"), ("head", "0"), ("relation", "AuxG")],
            &[("id", "2"), ("form", "ἔφη"), ("postag", "v3siia---"), ("head", "0"), ("relation", "PRED")],
            &[("id", "3"), ("form", "ἀνήρ"), ("postag", "n-s---mn-"), ("head", "2"), ("relation", "SBJ")],
            &[("id", "4"), ("form", "."), ("postag", "u--------"), ("head", "0"), ("relation", "AuxK")],
        ]);

        let graph = DependencyGraph::from_sentence(&s, &GraphConfig::default()).unwrap();
        let triples: Vec<_> = graph
            .triples()
            .into_iter()
            .map(|t| (t.head.1, t.relation, t.dependent.0))
            .collect();

        let expected: Vec<_> = [
            ("TOP", "AuxG", "«"),
            ("TOP", "PRED", "ἔφη"),
            ("v3siia---", "SBJ", "ἀνήρ"),
            ("TOP", "AuxK", "."),
        ]
        .into_iter()
        .map(|(h, r, d)| (h.to_string(), r.to_string(), d.to_string()))
        .collect();
        assert_eq!(triples, expected);
        assert_eq!(graph.root().form, "«");
    }

    #[test]
    fn test_resolved_graph_skips_artificial_nodes() {
        let s = sentence(&[
            &[("id", "1"), ("form", "ἔφη"), ("head", "0"), ("relation", "PRED")],
            &[("id", "2"), ("form", "[0]"), ("head", "1"), ("relation", "OBJ"), ("artificial", "elliptic")],
            &[("id", "3"), ("form", "ἀνήρ"), ("head", "2"), ("relation", "SBJ")],
        ]);

        let annotated = DependencyGraph::from_sentence(&s, &GraphConfig::default()).unwrap();
        assert!(annotated.node("2").unwrap().artificial);
        assert_eq!(annotated.head_of("3").unwrap().id, "2");

        let resolved = DependencyGraph::resolved(&s, &GraphConfig::default(), &ExportOptions::default()).unwrap();
        assert!(resolved.node("2").is_none());
        assert_eq!(resolved.head_of("3").unwrap().id, "1");
        assert_eq!(resolved.dependents("1")[0].0, "ExD");
    }

    #[test]
    fn test_resolved_graph_uses_given_mediated_relation() {
        let s = sentence(&[
            &[("id", "1"), ("form", "ἔφη"), ("head", "0"), ("relation", "PRED")],
            &[("id", "2"), ("form", "[0]"), ("head", "1"), ("relation", "OBJ"), ("artificial", "elliptic")],
            &[("id", "3"), ("form", "ἀνήρ"), ("head", "2"), ("relation", "SBJ")],
        ]);
        let options = ExportOptions {
            mediated_relation: "ELL".to_string(),
            ..Default::default()
        };

        let resolved = DependencyGraph::resolved(&s, &GraphConfig::default(), &options).unwrap();
        assert_eq!(resolved.dependents("1"), vec![("ELL", resolved.node("3").unwrap())]);
    }
}
