use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::Local;
use eframe::egui::{Context, Event, UserData, ViewportCommand};

use crate::util::csv_row;

use super::materialize::RenderGraph;

/// Delimited export of the visible stakeholder set, one row per node.
pub(super) fn stakeholders_csv(graph: &RenderGraph) -> String {
    let mut out = csv_row(&[
        "id",
        "name",
        "company",
        "seniority",
        "sentiment",
        "influence",
        "x",
        "y",
    ]);
    for node in &graph.nodes {
        let seniority = node.seniority.map(|s| s.label()).unwrap_or_default();
        let influence = node
            .influence
            .map(|score| score.to_string())
            .unwrap_or_default();
        let x = format!("{:.2}", node.world_pos.x);
        let y = format!("{:.2}", node.world_pos.y);
        out.push_str(&csv_row(&[
            node.id.as_str(),
            &node.label,
            &node.company_name,
            seniority,
            node.sentiment.label(),
            &influence,
            &x,
            &y,
        ]));
    }
    out
}

/// Delimited export of the visible relationship set; dangling rows never
/// appear because the materializer already dropped them.
pub(super) fn relationships_csv(graph: &RenderGraph) -> String {
    let mut out = csv_row(&[
        "id",
        "from_id",
        "from_name",
        "to_id",
        "to_name",
        "type",
        "strength",
        "directionality",
        "notes",
    ]);
    for edge in &graph.edges {
        let from = &graph.nodes[edge.from];
        let to = &graph.nodes[edge.to];
        let strength = edge.strength.to_string();
        let directionality = if edge.bidirectional {
            crate::model::Directionality::Bidirectional
        } else {
            crate::model::Directionality::Directional
        }
        .label();
        out.push_str(&csv_row(&[
            edge.id.as_str(),
            from.id.as_str(),
            &from.label,
            to.id.as_str(),
            &to.label,
            edge.kind.label(),
            &strength,
            directionality,
            edge.notes.as_deref().unwrap_or_default(),
        ]));
    }
    out
}

pub(super) fn write_csv_exports(dir: &Path, graph: &RenderGraph) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S");

    let stakeholders_path = dir.join(format!("stakeholders-{stamp}.csv"));
    std::fs::write(&stakeholders_path, stakeholders_csv(graph))
        .with_context(|| format!("failed to write {}", stakeholders_path.display()))?;

    let relationships_path = dir.join(format!("relationships-{stamp}.csv"));
    std::fs::write(&relationships_path, relationships_csv(graph))
        .with_context(|| format!("failed to write {}", relationships_path.display()))?;

    Ok((stakeholders_path, relationships_path))
}

pub(super) fn request_snapshot(ctx: &Context) {
    ctx.send_viewport_cmd(ViewportCommand::Screenshot(UserData::default()));
}

/// Picks up the screenshot event a prior `request_snapshot` produced, if it
/// arrived this frame, and writes it out as a PNG.
pub(super) fn poll_snapshot(ctx: &Context, dir: &Path) -> Option<Result<PathBuf>> {
    let image = ctx.input(|input| {
        input.events.iter().find_map(|event| match event {
            Event::Screenshot { image, .. } => Some(image.clone()),
            _ => None,
        })
    })?;

    Some((|| {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create export directory {}", dir.display()))?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("map-{stamp}.png"));
        image::save_buffer(
            &path,
            image.as_raw(),
            image.size[0] as u32,
            image.size[1] as u32,
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("failed to encode snapshot {}", path.display()))?;
        Ok(path)
    })())
}

#[cfg(test)]
mod tests {
    use crate::model::{
        CompanyId, MapId, RelationKind, Relationship, RelationshipId, Sentiment, Stakeholder,
        StakeholderId, StakeholderStatus,
    };

    use super::super::layout_store::LayoutStore;
    use super::super::materialize::{MaterializeOptions, build_render_graph};
    use super::*;

    fn fixture_graph() -> RenderGraph {
        let stakeholders = vec![
            Stakeholder {
                id: StakeholderId::new("s-1"),
                name: "Voss, Dana".to_owned(),
                company_id: CompanyId::new("c-1"),
                company_name: "Acme \"West\"".to_owned(),
                seniority: Some(crate::model::Seniority::Vp),
                sentiment: Sentiment::Ally,
                influence: Some(4),
                status: StakeholderStatus::Active,
            },
            Stakeholder {
                id: StakeholderId::new("s-2"),
                name: "Bo Lindgren".to_owned(),
                company_id: CompanyId::new("c-1"),
                company_name: "Acme \"West\"".to_owned(),
                seniority: None,
                sentiment: Sentiment::Unknown,
                influence: None,
                status: StakeholderStatus::Active,
            },
        ];
        let relationships = vec![Relationship {
            id: RelationshipId::new("r-1"),
            from: StakeholderId::new("s-1"),
            to: StakeholderId::new("s-2"),
            kind: RelationKind::Advises,
            strength: 2,
            directionality: Default::default(),
            notes: Some("met at\noffsite".to_owned()),
        }];
        let layout = LayoutStore::from_entries(MapId::new("default"), &[]);
        build_render_graph(
            &stakeholders,
            &relationships,
            &layout,
            &MaterializeOptions::default(),
        )
    }

    #[test]
    fn stakeholder_rows_quote_awkward_fields() {
        let csv = stakeholders_csv(&fixture_graph());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,name,company,seniority,sentiment,influence,x,y"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("s-1,\"Voss, Dana\",\"Acme \"\"West\"\"\",VP,ALLY,4,"));
        let second = lines.next().unwrap();
        assert!(second.starts_with("s-2,Bo Lindgren,\"Acme \"\"West\"\"\",,UNKNOWN,,"));
    }

    #[test]
    fn relationship_rows_carry_type_and_quoted_notes() {
        let csv = relationships_csv(&fixture_graph());
        assert!(csv.contains("ADVISES,2,directional,\"met at\noffsite\""));
    }

    #[test]
    fn exports_land_in_the_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (stakeholders_path, relationships_path) =
            write_csv_exports(dir.path(), &fixture_graph()).unwrap();
        assert!(stakeholders_path.exists());
        assert!(relationships_path.exists());
        let raw = std::fs::read_to_string(&relationships_path).unwrap();
        assert!(raw.starts_with("id,from_id,from_name,to_id,to_name,type,"));
    }
}
