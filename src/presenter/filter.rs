//! 班级列表的搜索、筛选、排序与分页（纯函数）

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, Result};
use crate::models::PaginationInfo;
use crate::models::classes::entities::{ClassEntity, ClassState};

/// 筛选条件，所有启用的条件之间取交集
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassFilter {
    pub search: Option<String>,
    pub status: Option<ClassState>,
    pub etablissement_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ClassFilter {
    pub fn matches(&self, class: &ClassEntity) -> bool {
        self.matches_search(class)
            && self.status.is_none_or(|status| class.etat == status)
            && self
                .etablissement_id
                .as_deref()
                .is_none_or(|id| class.etablissement_id() == Some(id))
            && self.date_from.is_none_or(|from| class.date_creation >= from)
            && self.date_to.is_none_or(|to| class.date_creation <= to)
    }

    // 名称、年级或机构名称的不区分大小写子串匹配
    fn matches_search(&self, class: &ClassEntity) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };
        class.nom.to_lowercase().contains(&term)
            || class.niveau.to_lowercase().contains(&term)
            || class
                .etablissement_nom()
                .is_some_and(|nom| nom.to_lowercase().contains(&term))
    }

    pub fn apply<'a>(&self, classes: &'a [ClassEntity]) -> Vec<&'a ClassEntity> {
        classes.iter().filter(|class| self.matches(class)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DateCreation,
    Nom,
    Eleves,
}

impl std::str::FromStr for SortKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date_creation" | "dateCreation" | "date" => Ok(SortKey::DateCreation),
            "nom" | "name" => Ok(SortKey::Nom),
            "eleves" | "students" => Ok(SortKey::Eleves),
            _ => Err(DashboardError::validation(format!("Unknown sort key: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(DashboardError::validation(format!("Unknown sort order: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    fn compare(&self, a: &ClassEntity, b: &ClassEntity) -> Ordering {
        let ordering = match self.key {
            SortKey::DateCreation => a.date_creation.cmp(&b.date_creation),
            SortKey::Nom => a.nom.cmp(&b.nom),
            SortKey::Eleves => a.eleves.len().cmp(&b.eleves.len()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// 稳定排序：相等元素保持插入顺序
    pub fn sort(&self, classes: &mut [&ClassEntity]) {
        classes.sort_by(|a, b| self.compare(a, b));
    }
}

/// 简单切片分页，页码从 1 开始；越界页返回空切片
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], PaginationInfo) {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let info = PaginationInfo::new(page, page_size, items.len());
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    (&items[start..end], info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::entities::{EntityRef, PublicationRight};
    use chrono::TimeZone;

    fn class(id: &str, nom: &str, etat: ClassState, day: u32, eleves: usize) -> ClassEntity {
        let etablissement_nom = if day % 2 == 0 {
            "Lycée Joss"
        } else {
            "Collège Bilingue"
        };
        ClassEntity {
            id: id.to_string(),
            nom: nom.to_string(),
            niveau: "Terminale".to_string(),
            date_creation: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            code_activation: None,
            etat,
            etablissement: Some(EntityRef {
                id: format!("e{}", day % 2),
                nom: Some(etablissement_nom.to_string()),
                prenom: None,
            }),
            moderator: None,
            droit_publication: PublicationRight::Tous,
            eleves: (0..eleves).map(|i| EntityRef::from_id(i.to_string())).collect(),
            parents: vec![],
        }
    }

    fn sample() -> Vec<ClassEntity> {
        vec![
            class("1", "Mathematics", ClassState::Actif, 1, 30),
            class("2", "Physics", ClassState::EnAttenteApprobation, 2, 12),
            class("3", "Chimie", ClassState::Inactif, 3, 25),
            class("4", "Anglais", ClassState::Actif, 4, 12),
            class("5", "Biologie", ClassState::Actif, 5, 18),
        ]
    }

    fn ids(classes: &[&ClassEntity]) -> Vec<String> {
        classes.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let classes = vec![
            class("1", "Mathematics", ClassState::Actif, 1, 0),
            class("2", "Physics", ClassState::Actif, 2, 0),
        ];
        let filter = ClassFilter {
            search: Some("math".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&classes)), vec!["1"]);
    }

    #[test]
    fn test_search_covers_level_and_establishment() {
        let classes = sample();
        let filter = ClassFilter {
            search: Some("JOSS".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&classes)), vec!["2", "4"]);

        let filter = ClassFilter {
            search: Some("terminale".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&classes).len(), 5);
    }

    #[test]
    fn test_filters_are_a_conjunction() {
        let classes = sample();
        let from = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let filter = ClassFilter {
            search: None,
            status: Some(ClassState::Actif),
            etablissement_id: Some("e1".to_string()),
            date_from: Some(from),
            date_to: Some(to),
        };
        let result = filter.apply(&classes);
        // 手工逐个检查谓词
        let expected: Vec<&ClassEntity> = classes
            .iter()
            .filter(|c| c.etat == ClassState::Actif)
            .filter(|c| c.etablissement_id() == Some("e1"))
            .filter(|c| c.date_creation >= from && c.date_creation <= to)
            .collect();
        assert_eq!(ids(&result), ids(&expected));
        assert_eq!(ids(&result), vec!["5"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let classes = sample();
        let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let filter = ClassFilter {
            date_from: Some(day(2)),
            date_to: Some(day(4)),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&classes)), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_same_day_range_includes_midday_creation() {
        use crate::models::classes::requests::{DateBound, parse_date_bound};

        let mut midday = class("1", "Mathematics", ClassState::Actif, 1, 0);
        midday.date_creation = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let filter = ClassFilter {
            date_from: parse_date_bound(Some("2024-03-01"), "from", DateBound::From).unwrap(),
            date_to: parse_date_bound(Some("2024-03-01"), "to", DateBound::To).unwrap(),
            ..Default::default()
        };
        assert!(filter.matches(&midday));

        midday.date_creation = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        assert!(!filter.matches(&midday));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let classes = sample();
        let filter = ClassFilter {
            status: Some(ClassState::Actif),
            search: Some("o".to_string()),
            ..Default::default()
        };
        let once: Vec<ClassEntity> = filter.apply(&classes).into_iter().cloned().collect();
        let twice = filter.apply(&once);
        assert_eq!(ids(&twice), once.iter().map(|c| c.id.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn test_sort_by_name_reverses() {
        let classes = sample();
        let mut asc: Vec<&ClassEntity> = classes.iter().collect();
        SortSpec::new(SortKey::Nom, SortOrder::Asc).sort(&mut asc);
        let mut desc: Vec<&ClassEntity> = classes.iter().collect();
        SortSpec::new(SortKey::Nom, SortOrder::Desc).sort(&mut desc);

        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
        assert_eq!(ids(&asc), vec!["4", "5", "3", "1", "2"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let classes = sample();
        let mut sorted: Vec<&ClassEntity> = classes.iter().collect();
        SortSpec::new(SortKey::Eleves, SortOrder::Asc).sort(&mut sorted);
        // 2 和 4 都有 12 名学生，保持插入顺序
        assert_eq!(ids(&sorted), vec!["2", "4", "5", "3", "1"]);

        SortSpec::new(SortKey::Eleves, SortOrder::Desc).sort(&mut sorted);
        assert_eq!(ids(&sorted), vec!["1", "3", "5", "2", "4"]);
    }

    #[test]
    fn test_pagination_reconstructs_list() {
        let items: Vec<usize> = (0..23).collect();
        for page_size in [9, 10, 12, 18, 24] {
            let (_, info) = paginate(&items, 1, page_size);
            assert_eq!(info.total_pages, items.len().div_ceil(page_size));

            let mut rebuilt = Vec::new();
            for page in 1..=info.total_pages {
                let (slice, _) = paginate(&items, page, page_size);
                assert!(!slice.is_empty());
                rebuilt.extend_from_slice(slice);
            }
            assert_eq!(rebuilt, items);
        }
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items = [1, 2, 3];
        let (slice, info) = paginate(&items, 5, 10);
        assert!(slice.is_empty());
        assert_eq!(info.total, 3);
        assert_eq!(info.total_pages, 1);

        let empty: [u8; 0] = [];
        let (slice, info) = paginate(&empty, 1, 10);
        assert!(slice.is_empty());
        assert_eq!(info.total_pages, 0);
    }

    #[test]
    fn test_parse_sort_params() {
        assert_eq!("nom".parse::<SortKey>().unwrap(), SortKey::Nom);
        assert_eq!("dateCreation".parse::<SortKey>().unwrap(), SortKey::DateCreation);
        assert!("size".parse::<SortKey>().is_err());
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
