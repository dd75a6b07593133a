use indexmap::{IndexMap, IndexSet};

use crate::config::LayoutConfig;
use crate::model::{ClusterGroup, Position};

/// Groups positions by category and assigns `cluster_id` in first-seen order.
///
/// Each position's `cluster_id` is overwritten. The returned groups are ordered by id, carry
/// the mean member position as centroid, and take their color from the palette
/// (`id mod palette.len()`).
pub fn aggregate_clusters(positions: &mut [Position], config: &LayoutConfig) -> Vec<ClusterGroup> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (idx, p) in positions.iter().enumerate() {
        groups.entry(p.category.clone()).or_default().push(idx);
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(cluster_id, (category, members))| {
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            let mut member_ids: IndexSet<String> = IndexSet::with_capacity(members.len());
            for &idx in &members {
                let p = &mut positions[idx];
                p.cluster_id = cluster_id;
                sum_x += p.x;
                sum_y += p.y;
                member_ids.insert(p.id.clone());
            }
            let count = members.len() as f64;
            ClusterGroup {
                id: cluster_id,
                category,
                centroid_x: sum_x / count,
                centroid_y: sum_y / count,
                color: config.color_for(cluster_id),
                member_ids,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(id: &str, category: &str, x: f64, y: f64) -> Position {
        Position {
            id: id.to_string(),
            name: id.to_uppercase(),
            category: category.to_string(),
            x,
            y,
            uniqueness_score: 0.0,
            cluster_id: usize::MAX,
        }
    }

    #[test]
    fn ids_follow_first_seen_order_not_lexical() {
        let mut positions = vec![
            pos("a", "Retail", 0.0, 0.0),
            pos("b", "Finance", 10.0, 0.0),
            pos("c", "Retail", 4.0, 8.0),
            pos("d", "Automotive", -5.0, -5.0),
        ];
        let clusters = aggregate_clusters(&mut positions, &LayoutConfig::default());

        let categories: Vec<&str> = clusters.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, vec!["Retail", "Finance", "Automotive"]);
        let ids: Vec<usize> = positions.iter().map(|p| p.cluster_id).collect();
        assert_eq!(ids, vec![0, 1, 0, 2]);

        let retail = &clusters[0];
        assert_eq!(retail.centroid_x, 2.0);
        assert_eq!(retail.centroid_y, 4.0);
        assert_eq!(
            retail.member_ids.iter().collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn colors_wrap_past_palette_end() {
        let mut config = LayoutConfig::default();
        config.palette = vec!["#111".into(), "#222".into()];
        let mut positions: Vec<Position> = (0..5)
            .map(|i| pos(&format!("e{i}"), &format!("cat{i}"), 0.0, 0.0))
            .collect();
        let clusters = aggregate_clusters(&mut positions, &config);
        let colors: Vec<&str> = clusters.iter().map(|c| c.color.as_str()).collect();
        assert_eq!(colors, vec!["#111", "#222", "#111", "#222", "#111"]);
    }

    #[test]
    fn no_positions_no_clusters() {
        let mut positions: Vec<Position> = Vec::new();
        assert!(aggregate_clusters(&mut positions, &LayoutConfig::default()).is_empty());
    }
}
