use std::collections::HashMap;

use eframe::egui::{Color32, Vec2};

use crate::geometry::influence_radius;
use crate::model::{
    CompanyId, RelationKind, Relationship, RelationshipId, Seniority, Sentiment, Stakeholder,
    StakeholderId,
};

use super::layout_store::LayoutStore;
use super::style::{
    NodeShape, company_border, relation_style, seniority_shape, sentiment_fill, strength_width,
};

#[derive(Clone, Copy, Debug)]
pub struct MaterializeOptions {
    /// Drops stakeholder rows whose name case-insensitively equals their
    /// company's name. Works around company-as-person placeholder rows in
    /// imported data; toggleable because it is a data heuristic, not a
    /// business rule.
    pub suppress_company_rows: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            suppress_company_rows: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
    pub id: StakeholderId,
    pub label: String,
    pub company_id: CompanyId,
    pub company_name: String,
    pub sentiment: Sentiment,
    pub seniority: Option<Seniority>,
    pub influence: Option<u8>,
    pub world_pos: Vec2,
    pub radius: f32,
    pub fill: Color32,
    pub border: Color32,
    pub shape: NodeShape,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
    pub id: RelationshipId,
    pub from: usize,
    pub to: usize,
    pub kind: RelationKind,
    pub strength: u8,
    pub width: f32,
    pub color: Color32,
    pub dashed: bool,
    pub bidirectional: bool,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub index_by_id: HashMap<StakeholderId, usize>,
    /// Undirected 1-hop adjacency, for focus-mode neighborhoods.
    pub neighbors: Vec<Vec<usize>>,
}

impl RenderGraph {
    /// The focus neighborhood of a node: itself plus direct neighbors.
    pub fn neighborhood(&self, index: usize) -> Vec<bool> {
        let mut member = vec![false; self.nodes.len()];
        if let Some(slot) = member.get_mut(index) {
            *slot = true;
        }
        if let Some(adjacent) = self.neighbors.get(index) {
            for &neighbor in adjacent {
                member[neighbor] = true;
            }
        }
        member
    }
}

/// Deterministic materialization: identical inputs produce identical styled
/// output. Fallback positions are computed over the filtered list's index
/// and count, so they shift when the filter changes; that is accepted.
pub fn build_render_graph(
    stakeholders: &[Stakeholder],
    relationships: &[Relationship],
    layout: &LayoutStore,
    options: &MaterializeOptions,
) -> RenderGraph {
    let filtered = stakeholders
        .iter()
        .filter(|stakeholder| {
            !(options.suppress_company_rows
                && stakeholder.name.eq_ignore_ascii_case(&stakeholder.company_name))
        })
        .collect::<Vec<_>>();

    let total = filtered.len();
    let mut company_order: HashMap<CompanyId, usize> = HashMap::new();
    let mut index_by_id = HashMap::with_capacity(total);
    let mut nodes = Vec::with_capacity(total);

    for (index, stakeholder) in filtered.iter().enumerate() {
        let next_company = company_order.len();
        let company_index = *company_order
            .entry(stakeholder.company_id.clone())
            .or_insert(next_company);

        nodes.push(RenderNode {
            id: stakeholder.id.clone(),
            label: stakeholder.name.clone(),
            company_id: stakeholder.company_id.clone(),
            company_name: stakeholder.company_name.clone(),
            sentiment: stakeholder.sentiment,
            seniority: stakeholder.seniority,
            influence: stakeholder.influence,
            world_pos: layout.resolve(&stakeholder.id, index, total),
            radius: influence_radius(stakeholder.influence),
            fill: sentiment_fill(stakeholder.sentiment),
            border: company_border(company_index),
            shape: seniority_shape(stakeholder.seniority),
        });
        index_by_id.insert(stakeholder.id.clone(), index);
    }

    let mut edges = Vec::new();
    let mut neighbors = vec![Vec::new(); nodes.len()];
    for relationship in relationships {
        // Dangling-reference guard: both endpoints must have survived
        // filtering.
        let (Some(&from), Some(&to)) = (
            index_by_id.get(&relationship.from),
            index_by_id.get(&relationship.to),
        ) else {
            continue;
        };
        if from == to {
            continue;
        }

        let style = relation_style(relationship.kind);
        edges.push(RenderEdge {
            id: relationship.id.clone(),
            from,
            to,
            kind: relationship.kind,
            strength: relationship.strength,
            width: strength_width(relationship.strength),
            color: style.color,
            dashed: style.dashed,
            bidirectional: relationship.directionality
                == crate::model::Directionality::Bidirectional,
            notes: relationship.notes.clone(),
        });
        neighbors[from].push(to);
        neighbors[to].push(from);
    }

    RenderGraph {
        nodes,
        edges,
        index_by_id,
        neighbors,
    }
}
