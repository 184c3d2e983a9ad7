use crate::error::{StoryError, StoryResult};
use crate::models::{Gender, StoryTemplate};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const MAX_CHILD_AGE: u8 = 12;

const EMBEDDED_CATALOG: &str = include_str!("../../data/stories.json");

/// Age range used as a catalog key. `min` is inclusive and `max` exclusive,
/// except for the last bracket which also holds `MAX_CHILD_AGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeBracket {
    pub min: u8,
    pub max: u8,
}

/// Ascending and contiguous; lookup takes the first match.
pub const AGE_BRACKETS: [AgeBracket; 6] = [
    AgeBracket { min: 0, max: 2 },
    AgeBracket { min: 2, max: 4 },
    AgeBracket { min: 4, max: 6 },
    AgeBracket { min: 6, max: 8 },
    AgeBracket { min: 8, max: 10 },
    AgeBracket { min: 10, max: 12 },
];

impl AgeBracket {
    pub fn contains(&self, age: u8) -> bool {
        age >= self.min && (age < self.max || (self.max == MAX_CHILD_AGE && age == self.max))
    }

    pub fn for_age(age: u8) -> Option<AgeBracket> {
        AGE_BRACKETS.iter().copied().find(|b| b.contains(age))
    }

    pub fn from_key(key: &str) -> Option<AgeBracket> {
        let (min, max) = key.trim().split_once('-')?;
        let bracket = AgeBracket {
            min: min.trim().parse().ok()?,
            max: max.trim().parse().ok()?,
        };
        AGE_BRACKETS.contains(&bracket).then_some(bracket)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Universal,
    Boy,
    Girl,
}

impl From<Gender> for Variant {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Boy => Variant::Boy,
            Gender::Girl => Variant::Girl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub bracket: AgeBracket,
    pub variant: Variant,
}

impl CatalogKey {
    /// Keys to try for a request, most specific first.
    pub fn lookup_order(bracket: AgeBracket, gender: Option<Gender>) -> Vec<CatalogKey> {
        let universal = CatalogKey {
            bracket,
            variant: Variant::Universal,
        };
        match gender {
            Some(gender) => vec![
                CatalogKey {
                    bracket,
                    variant: gender.into(),
                },
                universal,
            ],
            None => vec![universal],
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    stories: HashMap<String, AgeBucket>,
}

#[derive(Deserialize)]
struct AgeBucket {
    #[serde(default)]
    universal: Vec<StoryTemplate>,
    #[serde(default)]
    boy: Vec<StoryTemplate>,
    #[serde(default)]
    girl: Vec<StoryTemplate>,
}

/// Read-only story templates, loaded once at startup.
#[derive(Debug, Default)]
pub struct StoryCatalog {
    templates: HashMap<CatalogKey, Vec<StoryTemplate>>,
}

impl StoryCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> StoryResult<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    pub fn load(path: &Path) -> StoryResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoryError::Catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> StoryResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| StoryError::Catalog(e.to_string()))?;

        let mut templates = HashMap::new();
        for (key, bucket) in file.stories {
            let bracket = AgeBracket::from_key(&key)
                .ok_or_else(|| StoryError::Catalog(format!("unknown age bracket '{}'", key)))?;

            for (variant, list) in [
                (Variant::Universal, bucket.universal),
                (Variant::Boy, bucket.boy),
                (Variant::Girl, bucket.girl),
            ] {
                if let Some(bad) = list.iter().find(|t| t.page_count == 0) {
                    return Err(StoryError::Catalog(format!(
                        "template '{}' in bracket {} has no pages",
                        bad.title, bracket
                    )));
                }
                templates.insert(CatalogKey { bracket, variant }, list);
            }
        }

        Ok(Self { templates })
    }

    pub fn template_count(&self) -> usize {
        self.templates.values().map(Vec::len).sum()
    }

    pub fn templates(&self, key: CatalogKey) -> &[StoryTemplate] {
        self.templates.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Picks the first template of the most specific non-empty list for the
    /// child's bracket.
    pub fn select(&self, age: u8, gender: Option<Gender>) -> StoryResult<&StoryTemplate> {
        let bracket = AgeBracket::for_age(age).ok_or_else(|| StoryError::NoTemplateAvailable {
            bracket: format!("age {}", age),
        })?;

        CatalogKey::lookup_order(bracket, gender)
            .into_iter()
            .find_map(|key| self.templates(key).first())
            .ok_or_else(|| StoryError::NoTemplateAvailable {
                bracket: bracket.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StoryCatalog {
        StoryCatalog::from_json(
            r#"{
                "stories": {
                    "4-6": {
                        "universal": [{"title": "Universal {name}", "content": "u", "pageCount": 2}],
                        "boy": [
                            {"title": "Boy One", "content": "b1", "pageCount": 3},
                            {"title": "Boy Two", "content": "b2", "pageCount": 3}
                        ],
                        "girl": []
                    },
                    "6-8": {
                        "universal": []
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn brackets_partition_every_age() {
        for age in 0..=MAX_CHILD_AGE {
            let matching = AGE_BRACKETS.iter().filter(|b| b.contains(age)).count();
            assert_eq!(matching, 1, "age {} falls in {} brackets", age, matching);
        }
        assert_eq!(AgeBracket::for_age(MAX_CHILD_AGE + 1), None);
    }

    #[test]
    fn brackets_are_contiguous_from_zero() {
        assert_eq!(AGE_BRACKETS[0].min, 0);
        for pair in AGE_BRACKETS.windows(2) {
            assert_eq!(pair[0].max, pair[1].min);
        }
        assert_eq!(AGE_BRACKETS[AGE_BRACKETS.len() - 1].max, MAX_CHILD_AGE);
    }

    #[test]
    fn bracket_boundaries_belong_to_the_upper_bracket() {
        assert_eq!(AgeBracket::for_age(2).unwrap().to_string(), "2-4");
        assert_eq!(AgeBracket::for_age(5).unwrap().to_string(), "4-6");
        assert_eq!(AgeBracket::for_age(12).unwrap().to_string(), "10-12");
    }

    #[test]
    fn boy_gets_first_boy_specific_template() {
        let catalog = catalog();
        let template = catalog.select(5, Some(Gender::Boy)).unwrap();
        assert_eq!(template.title, "Boy One");
    }

    #[test]
    fn girl_with_empty_list_falls_back_to_universal() {
        let catalog = catalog();
        let template = catalog.select(4, Some(Gender::Girl)).unwrap();
        assert_eq!(template.title, "Universal {name}");
    }

    #[test]
    fn no_gender_uses_universal() {
        let catalog = catalog();
        let template = catalog.select(5, None).unwrap();
        assert_eq!(template.title, "Universal {name}");
    }

    #[test]
    fn empty_bucket_is_no_template_available() {
        let catalog = catalog();
        let err = catalog.select(7, Some(Gender::Girl)).unwrap_err();
        assert!(matches!(err, StoryError::NoTemplateAvailable { ref bracket } if bracket == "6-8"));

        let err = catalog.select(0, None).unwrap_err();
        assert!(matches!(err, StoryError::NoTemplateAvailable { .. }));
    }

    #[test]
    fn lookup_order_tries_variant_before_universal() {
        let bracket = AGE_BRACKETS[1];
        let order = CatalogKey::lookup_order(bracket, Some(Gender::Girl));
        let variants: Vec<Variant> = order.iter().map(|k| k.variant).collect();
        assert_eq!(variants, vec![Variant::Girl, Variant::Universal]);
    }

    #[test]
    fn unknown_bracket_key_is_rejected() {
        let err = StoryCatalog::from_json(r#"{"stories": {"3-5": {"universal": []}}}"#)
            .unwrap_err();
        assert!(matches!(err, StoryError::Catalog(_)));
    }

    #[test]
    fn zero_page_template_is_rejected() {
        let err = StoryCatalog::from_json(
            r#"{"stories": {"0-2": {"universal": [{"title": "T", "content": "c", "pageCount": 0}]}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::Catalog(_)));
    }

    #[test]
    fn embedded_catalog_serves_every_age() {
        let catalog = StoryCatalog::embedded().unwrap();
        for age in 0..=MAX_CHILD_AGE {
            for gender in [None, Some(Gender::Boy), Some(Gender::Girl)] {
                assert!(catalog.select(age, gender).is_ok(), "age {} {:?}", age, gender);
            }
        }
    }
}
