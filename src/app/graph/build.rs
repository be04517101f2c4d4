use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::Stakeholder;

use super::super::{ViewModel, materialize};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// The page-level filter pipeline: company filter, sentiment filter,
    /// fuzzy name search. The materializer applies its own exclusions on
    /// top of this list.
    pub(in crate::app) fn filtered_stakeholders(&self) -> Vec<Stakeholder> {
        let query = self.search.trim();
        let matcher = (!query.is_empty()).then(SkimMatcherV2::default);

        self.dataset
            .stakeholders
            .iter()
            .filter(|stakeholder| {
                if let Some(filter) = &self.company_filter
                    && &stakeholder.company_id != filter
                {
                    return false;
                }
                if let Some(filter) = self.sentiment_filter
                    && stakeholder.sentiment != filter
                {
                    return false;
                }
                match &matcher {
                    Some(matcher) => {
                        fuzzy_match_score(matcher, &stakeholder.name, query).is_some()
                            || fuzzy_match_score(matcher, &stakeholder.company_name, query)
                                .is_some()
                    }
                    None => true,
                }
            })
            .cloned()
            .collect()
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        let filtered = self.filtered_stakeholders();
        let graph = materialize::build_render_graph(
            &filtered,
            &self.dataset.relationships,
            &self.layout,
            &self.options,
        );

        self.visible_node_count = graph.nodes.len();
        self.visible_edge_count = graph.edges.len();
        self.graph_cache = Some(graph);
        self.graph_dirty = false;
    }
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use std::sync::Arc;
    use std::sync::mpsc;

    use crate::model::{MapId, Sentiment};
    use crate::store::{MapStore, MemoryStore};

    use super::super::super::{JobRunner, ViewModel};

    pub(in crate::app) fn demo_model() -> ViewModel {
        let store: Arc<dyn MapStore> = Arc::new(MemoryStore::with_demo_data());
        let dataset = store.load_dataset(&MapId::new("default")).unwrap();
        let (tx, _rx) = mpsc::channel();
        let jobs = JobRunner { store, tx };
        ViewModel::new(dataset, jobs)
    }

    #[test]
    fn filters_narrow_the_materialized_set() {
        let mut model = demo_model();
        model.rebuild_render_graph();
        let all = model.visible_node_count;
        assert_eq!(all, 7);

        model.sentiment_filter = Some(Sentiment::Ally);
        model.rebuild_render_graph();
        assert_eq!(model.visible_node_count, 2);

        model.sentiment_filter = None;
        model.search = "imogen".to_owned();
        model.rebuild_render_graph();
        assert_eq!(model.visible_node_count, 1);
    }

    #[test]
    fn filtering_an_endpoint_away_drops_its_edges() {
        let mut model = demo_model();
        model.rebuild_render_graph();
        let edges_before = model.visible_edge_count;
        assert!(edges_before > 0);

        // Only Northwind stakeholders stay; every cross-company edge and
        // every edge touching a filtered-out node must disappear.
        model.company_filter = Some(crate::model::CompanyId::new("c-northwind"));
        model.rebuild_render_graph();
        let cache = model.graph_cache.as_ref().unwrap();
        assert!(model.visible_edge_count < edges_before);
        for edge in &cache.edges {
            assert!(edge.from < cache.nodes.len());
            assert!(edge.to < cache.nodes.len());
        }
    }
}
