use petgraph::graph::NodeIndex;

use super::MappingGraph;
use crate::{
    error::ExtraFieldsError,
    properties::{make_label, FieldType, LabelNode, MappingEdge, MappingNode, NodeKey, VariableNode},
};

impl MappingGraph {
    /// Create the variable on first sight, validate its type on every later sight, and record
    /// that `client` attests it.
    pub fn upsert_variable(
        &mut self,
        domain: &str,
        name: &str,
        kind: FieldType,
        client: &str,
    ) -> Result<NodeIndex, ExtraFieldsError> {
        self.check_domain(domain)?;
        let key = NodeKey::variable(domain, name);
        let idx = match self.find(&key) {
            Some(idx) => idx,
            None => self.insert_node(MappingNode::Variable(VariableNode::new(domain, name, kind))),
        };

        match self.as_graph_mut().node_weight_mut(idx) {
            Some(MappingNode::Variable(var)) => {
                if var.kind != kind {
                    return Err(ExtraFieldsError::TypeMismatch {
                        node: key.to_string(),
                        existing: var.kind,
                        requested: kind,
                    });
                }
                var.attestations.insert(client.to_string());
                Ok(idx)
            }
            _ => Err(ExtraFieldsError::NotFound(format!(
                "variable node {key} is missing from the graph"
            ))),
        }
    }

    /// Add `from -> to` and, when `reverse` is set, `to -> from`. Both variables must already
    /// exist. Re-declaring an existing mapping is a no-op.
    pub fn add_mapping(
        &mut self,
        from: &NodeKey,
        to: &NodeKey,
        reverse: bool,
    ) -> Result<(), ExtraFieldsError> {
        let from_idx = self.require(from)?;
        let to_idx = self.require(to)?;
        let mut pairs = vec![(from_idx, to_idx)];
        if reverse {
            pairs.push((to_idx, from_idx));
        }
        for (source, sink) in pairs {
            if self.as_graph().find_edge(source, sink).is_none() {
                self.as_graph_mut()
                    .add_edge(source, sink, MappingEdge::declared());
            }
        }
        Ok(())
    }

    /// Point a label at the variable `domain:name`. Both the literal spelling and its normalized
    /// label form are added, so an alias like `publicationTitle` yields the shadow label
    /// `publicationTitle` and the plain label `publication title`.
    pub fn add_label(
        &mut self,
        domain: &str,
        name: &str,
        spelling: &str,
    ) -> Result<(), ExtraFieldsError> {
        self.check_domain(domain)?;
        let var_idx = self.require(&NodeKey::variable(domain, name))?;

        let normalized = make_label(spelling);
        let mut texts = vec![spelling.to_string()];
        if normalized != spelling {
            texts.push(normalized);
        }

        for text in texts {
            let key = NodeKey::label(&text);
            let label_idx = match self.find(&key) {
                Some(idx) => idx,
                None => self.insert_node(MappingNode::Label(LabelNode::new(&text))),
            };
            if self.as_graph().find_edge(label_idx, var_idx).is_none() {
                self.as_graph_mut()
                    .add_edge(label_idx, var_idx, MappingEdge::declared());
            }
        }
        Ok(())
    }

    /// Give every variable a label derived from its own name.
    pub fn derive_labels(&mut self) -> Result<(), ExtraFieldsError> {
        let variables = self
            .variables()
            .into_iter()
            .map(|(_, var)| (var.domain.clone(), var.name.clone()))
            .collect::<Vec<_>>();
        for (domain, name) in variables {
            self.add_label(&domain, &name, &name)?;
        }
        Ok(())
    }

    fn require(&self, key: &NodeKey) -> Result<NodeIndex, ExtraFieldsError> {
        self.find(key)
            .ok_or_else(|| ExtraFieldsError::NotFound(format!("node {key} has not been declared")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn graph() -> MappingGraph {
        MappingGraph::new(["zotero", "csl"])
    }

    #[test]
    fn upsert_is_idempotent_and_tracks_attestation() {
        let mut g = graph();
        let first = g
            .upsert_variable("zotero", "title", FieldType::Text, "zotero")
            .unwrap();
        let second = g
            .upsert_variable("zotero", "title", FieldType::Text, "jurism")
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(g.node_count(), 1);

        let var = g.variable("zotero", "title").unwrap();
        assert!(var.is_attested_by("zotero"));
        assert!(var.is_attested_by("jurism"));
    }

    #[test]
    fn retyping_a_variable_is_fatal() {
        let mut g = graph();
        g.upsert_variable("zotero", "date", FieldType::Date, "zotero")
            .unwrap();
        let err = g
            .upsert_variable("zotero", "date", FieldType::Text, "jurism")
            .unwrap_err();
        assert!(err.is_invariant_violation());
        match err {
            ExtraFieldsError::TypeMismatch {
                node,
                existing,
                requested,
            } => {
                assert_eq!(node, "zotero:date");
                assert_eq!(existing, FieldType::Date);
                assert_eq!(requested, FieldType::Text);
            }
            other => panic!("unexpected error: {other}"),
        }
        // the failed upsert must not have attested the variable
        assert!(!g.variable("zotero", "date").unwrap().is_attested_by("jurism"));
    }

    #[test]
    fn mappings_are_bidirectional_unless_requested_otherwise() {
        let mut g = graph();
        g.upsert_variable("csl", "title", FieldType::Text, "zotero")
            .unwrap();
        g.upsert_variable("zotero", "title", FieldType::Text, "zotero")
            .unwrap();
        g.upsert_variable("zotero", "shortTitle", FieldType::Text, "zotero")
            .unwrap();

        let csl = NodeKey::variable("csl", "title");
        let zot = NodeKey::variable("zotero", "title");
        let short = NodeKey::variable("zotero", "shortTitle");

        g.add_mapping(&csl, &zot, true).unwrap();
        g.add_mapping(&csl, &zot, true).unwrap();
        g.add_mapping(&short, &csl, false).unwrap();

        assert!(g.edge_between(&csl, &zot).is_some());
        assert!(g.edge_between(&zot, &csl).is_some());
        assert!(g.edge_between(&short, &csl).is_some());
        assert!(g.edge_between(&csl, &short).is_none());
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn mapping_to_an_undeclared_variable_fails() {
        let mut g = graph();
        g.upsert_variable("csl", "title", FieldType::Text, "zotero")
            .unwrap();
        let err = g
            .add_mapping(
                &NodeKey::variable("csl", "title"),
                &NodeKey::variable("zotero", "title"),
                true,
            )
            .unwrap_err();
        assert!(matches!(err, ExtraFieldsError::NotFound(_)));
    }

    #[test]
    fn labels_point_at_variables_in_both_spellings() {
        let mut g = graph();
        g.upsert_variable("zotero", "publicationTitle", FieldType::Text, "zotero")
            .unwrap();
        g.add_label("zotero", "publicationTitle", "publicationTitle")
            .unwrap();

        let var = NodeKey::variable("zotero", "publicationTitle");
        let shadow = NodeKey::label("publicationTitle");
        let plain = NodeKey::label("publication title");

        assert!(g.label("publicationTitle").unwrap().is_shadow());
        assert!(!g.label("publication title").unwrap().is_shadow());
        assert_eq!(g.edge_between(&shadow, &var), Some(&MappingEdge::declared()));
        assert_eq!(g.edge_between(&plain, &var), Some(&MappingEdge::declared()));
        // labels never receive edges
        assert!(g.edge_between(&var, &plain).is_none());
    }

    #[test]
    fn derived_labels_cover_every_variable_once() {
        let mut g = graph();
        g.upsert_variable("zotero", "title", FieldType::Text, "zotero")
            .unwrap();
        g.upsert_variable("csl", "title", FieldType::Text, "zotero")
            .unwrap();
        g.derive_labels().unwrap();
        g.derive_labels().unwrap();

        let label = g.find(&NodeKey::label("title")).unwrap();
        assert_eq!(g.targets(label).len(), 2);
        assert_eq!(g.labels().len(), 1);
    }
}
