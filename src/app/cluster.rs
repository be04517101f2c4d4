use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::model::{CompanyId, Stakeholder, StakeholderId};

/// Radius of the ring company centroids sit on.
pub const COMPANY_RING_RADIUS: f32 = 420.0;
/// Sub-ring radius ceiling; keeps large companies from overlapping
/// neighboring clusters.
pub const SUB_RING_CAP: f32 = 150.0;
/// Sub-ring growth per member; keeps small companies visually tight.
pub const SUB_RING_PER_MEMBER: f32 = 26.0;

pub fn company_centroid(company_index: usize, company_count: usize) -> Vec2 {
    let angle = (company_index as f32 / company_count.max(1) as f32) * TAU;
    vec2(angle.cos(), angle.sin()) * COMPANY_RING_RADIUS
}

pub fn sub_ring_radius(member_count: usize) -> f32 {
    SUB_RING_CAP.min(SUB_RING_PER_MEMBER * member_count as f32)
}

/// Deterministic full relayout: companies on a fixed ring in first-seen
/// order, members on a capped sub-ring around their company's centroid.
/// The caller batch-upserts the result atomically and reloads on success.
pub fn cluster_by_company(stakeholders: &[Stakeholder]) -> Vec<(StakeholderId, Vec2)> {
    let mut order: Vec<CompanyId> = Vec::new();
    let mut members: HashMap<CompanyId, Vec<&Stakeholder>> = HashMap::new();
    for stakeholder in stakeholders {
        if !members.contains_key(&stakeholder.company_id) {
            order.push(stakeholder.company_id.clone());
        }
        members
            .entry(stakeholder.company_id.clone())
            .or_default()
            .push(stakeholder);
    }

    let company_count = order.len();
    let mut placements = Vec::with_capacity(stakeholders.len());

    for (company_index, company_id) in order.iter().enumerate() {
        let Some(group) = members.get(company_id) else {
            continue;
        };
        let centroid = company_centroid(company_index, company_count);
        let radius = sub_ring_radius(group.len());

        for (member_index, stakeholder) in group.iter().enumerate() {
            let angle = (member_index as f32 / group.len() as f32) * TAU;
            let offset = vec2(angle.cos(), angle.sin()) * radius;
            placements.push((stakeholder.id.clone(), centroid + offset));
        }
    }

    placements
}

#[cfg(test)]
mod tests {
    use crate::model::{Sentiment, StakeholderStatus};

    use super::*;

    fn stakeholder(id: &str, company: &str) -> Stakeholder {
        Stakeholder {
            id: StakeholderId::new(id),
            name: id.to_owned(),
            company_id: CompanyId::new(company),
            company_name: String::new(),
            seniority: None,
            sentiment: Sentiment::Unknown,
            influence: None,
            status: StakeholderStatus::Active,
        }
    }

    #[test]
    fn members_stay_within_the_sub_ring_cap_of_their_centroid() {
        let mut stakeholders = Vec::new();
        for i in 0..3 {
            stakeholders.push(stakeholder(&format!("s-a{i}"), "alpha"));
        }
        for i in 0..12 {
            stakeholders.push(stakeholder(&format!("s-b{i}"), "beta"));
        }
        stakeholders.push(stakeholder("s-c0", "gamma"));

        let placements = cluster_by_company(&stakeholders);
        assert_eq!(placements.len(), stakeholders.len());

        let centroids = [
            company_centroid(0, 3),
            company_centroid(1, 3),
            company_centroid(2, 3),
        ];
        for (id, position) in &placements {
            let company_index = match id.as_str().as_bytes()[2] {
                b'a' => 0,
                b'b' => 1,
                _ => 2,
            };
            let distance = (*position - centroids[company_index]).length();
            assert!(distance <= SUB_RING_CAP + 0.01, "{id} strayed {distance}");
        }
    }

    #[test]
    fn sub_ring_radius_grows_then_saturates() {
        assert_eq!(sub_ring_radius(1), SUB_RING_PER_MEMBER);
        assert!(sub_ring_radius(3) > sub_ring_radius(2));
        assert_eq!(sub_ring_radius(40), SUB_RING_CAP);
    }

    #[test]
    fn company_centroids_are_distinct_for_two_or_more_companies() {
        for count in 2..8 {
            for i in 0..count {
                for j in (i + 1)..count {
                    let a = company_centroid(i, count);
                    let b = company_centroid(j, count);
                    assert!((a - b).length() > 1.0);
                }
            }
        }
    }

    #[test]
    fn relayout_is_deterministic() {
        let stakeholders = vec![
            stakeholder("s-1", "alpha"),
            stakeholder("s-2", "beta"),
            stakeholder("s-3", "alpha"),
        ];
        let first = cluster_by_company(&stakeholders);
        let second = cluster_by_company(&stakeholders);
        assert_eq!(first, second);
    }
}
