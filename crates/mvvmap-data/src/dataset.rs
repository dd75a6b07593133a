use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profile::{CompanyProfile, NumberedRecord};

/// How many categories [`DatasetStats::top_categories`] keeps.
pub const TOP_CATEGORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Basic completeness statistics over the raw rows. A section counts as filled when its cell is
/// present and non-empty, whitespace included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total: usize,
    pub completed: usize,
    pub category_count: usize,
    /// Largest categories first; ties keep first-seen order.
    pub top_categories: Vec<CategoryCount>,
    pub mission_filled: usize,
    pub vision_filled: usize,
    pub values_filled: usize,
}

impl DatasetStats {
    pub fn from_records(records: &[NumberedRecord]) -> Self {
        let filled = |f: fn(&NumberedRecord) -> Option<&String>| {
            records
                .iter()
                .filter(|r| f(r).is_some_and(|v| !v.is_empty()))
                .count()
        };

        let mut categories: IndexMap<&str, usize> = IndexMap::new();
        for r in records {
            if let Some(c) = r.record.category.as_deref().map(str::trim) {
                if !c.is_empty() {
                    *categories.entry(c).or_default() += 1;
                }
            }
        }
        let category_count = categories.len();
        // Stable sort keeps first-seen order among equal counts.
        let mut ranked: Vec<(&str, usize)> = categories.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let top_categories = ranked
            .into_iter()
            .take(TOP_CATEGORY_LIMIT)
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();

        Self {
            total: records.len(),
            completed: records
                .iter()
                .filter(|r| r.record.status.as_deref().map(str::trim) == Some("completed"))
                .count(),
            category_count,
            top_categories,
            mission_filled: filled(|r| r.record.mission.as_ref()),
            vision_filled: filled(|r| r.record.vision.as_ref()),
            values_filled: filled(|r| r.record.values.as_ref()),
        }
    }

    /// Share of rows with the section filled, in percent (0 for an empty dataset).
    pub fn fill_rate(&self, filled: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (filled as f64) * 100.0 / (self.total as f64)
    }
}

/// Profiles with a complete mission/vision/values triple, grouped for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisData {
    pub total_companies: usize,
    pub complete_mvv_companies: usize,
    pub companies: Vec<CompanyProfile>,
    /// First-seen category order.
    pub by_category: IndexMap<String, Vec<CompanyProfile>>,
    pub categories: Vec<String>,
    pub processed_at: String,
}

impl AnalysisData {
    pub fn build(profiles: &[CompanyProfile]) -> Self {
        Self::build_at(profiles, chrono::Local::now().to_rfc3339())
    }

    pub fn build_at(profiles: &[CompanyProfile], processed_at: String) -> Self {
        let companies: Vec<CompanyProfile> = profiles
            .iter()
            .filter(|p| p.has_complete_mvv)
            .cloned()
            .collect();
        let mut by_category: IndexMap<String, Vec<CompanyProfile>> = IndexMap::new();
        for c in &companies {
            by_category
                .entry(c.category.clone())
                .or_default()
                .push(c.clone());
        }
        let categories = by_category.keys().cloned().collect();
        tracing::info!(
            complete = companies.len(),
            total = profiles.len(),
            categories = by_category.len(),
            "analysis data prepared"
        );

        Self {
            total_companies: profiles.len(),
            complete_mvv_companies: companies.len(),
            companies,
            by_category,
            categories,
            processed_at,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        tracing::info!(path = %path.display(), "analysis data saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CompanyRecord, preprocess};

    fn record(row: usize, category: &str, status: &str, mvv: [&str; 3]) -> NumberedRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        NumberedRecord {
            row,
            record: CompanyRecord {
                company_name: Some(format!("Company {row}")),
                category: opt(category),
                status: opt(status),
                mission: opt(mvv[0]),
                vision: opt(mvv[1]),
                values: opt(mvv[2]),
                ..Default::default()
            },
        }
    }

    fn records() -> Vec<NumberedRecord> {
        vec![
            record(1, "Retail", "completed", ["m", "v", "x"]),
            record(2, "Finance", "completed", ["m", "", "x"]),
            record(3, "Finance", "pending", ["m", "v", "x"]),
            record(4, "", "completed", ["", " ", ""]),
            record(5, "Energy", "completed", ["m", "v", "x"]),
            record(6, "Retail", "failed", ["m", "v", "x"]),
        ]
    }

    #[test]
    fn stats_count_completion_and_categories() {
        let stats = DatasetStats::from_records(&records());
        assert_eq!(stats.total, 6);
        assert_eq!(stats.completed, 4);
        assert_eq!(stats.category_count, 3);
        let top: Vec<(&str, usize)> = stats
            .top_categories
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(top, vec![("Retail", 2), ("Finance", 2), ("Energy", 1)]);
        assert_eq!(stats.mission_filled, 5);
        // Row 4's whitespace-only vision cell is present, so it counts.
        assert_eq!(stats.vision_filled, 5);
        assert_eq!(stats.values_filled, 5);
        assert!((stats.fill_rate(stats.vision_filled) - 83.333).abs() < 0.01);
    }

    #[test]
    fn analysis_keeps_complete_profiles_grouped_in_first_seen_order() {
        let profiles = preprocess(&records());
        let data = AnalysisData::build_at(&profiles, "2024-01-01T00:00:00+00:00".into());
        assert_eq!(data.total_companies, 6);
        assert_eq!(data.complete_mvv_companies, 4);
        assert_eq!(data.categories, vec!["Retail", "Finance", "Energy"]);
        assert_eq!(data.by_category["Retail"].len(), 2);
        assert_eq!(data.by_category["Finance"][0].id, "company_3");
    }

    #[test]
    fn analysis_round_trips_through_disk() {
        let profiles = preprocess(&records());
        let data = AnalysisData::build_at(&profiles, "2024-01-01T00:00:00+00:00".into());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analysis.json");
        data.save(&path).unwrap();
        assert_eq!(AnalysisData::load(&path).unwrap(), data);
    }
}
