//! Fixed class registries for the auxiliary prediction heads
//!
//! Each label field (answer type, category, gender) has a hardcoded class
//! enumeration ending in the `"missing"` catch-all. Values outside the
//! enumeration are normalized to `"missing"`; normalization returns a new
//! record list and leaves the caller's records untouched.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// The catch-all class, always last in every registry
pub const MISSING: &str = "missing";

/// Metadata attached to one training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleProperties {
    pub ans_type: String,
    pub category: String,
    pub gender: String,
}

/// The auxiliary label fields a registry can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelField {
    AnswerType,
    Category,
    Gender,
}

impl LabelField {
    /// The fixed class enumeration for this field (index = class id)
    pub fn classes(self) -> &'static [&'static str] {
        match self {
            LabelField::AnswerType => &[
                "abs", "anim", "char", "event", "org", "people", "place", "work", MISSING,
            ],
            LabelField::Category => &[
                "Fine_Arts",
                "History",
                "Literature",
                "Other",
                "Science",
                "Social_Science",
                MISSING,
            ],
            LabelField::Gender => &["male", "female", "non_person", MISSING],
        }
    }

    fn value_of<'r>(self, record: &'r ExampleProperties) -> &'r str {
        match self {
            LabelField::AnswerType => &record.ans_type,
            LabelField::Category => &record.category,
            LabelField::Gender => &record.gender,
        }
    }

    fn set(self, record: &mut ExampleProperties, value: &str) {
        match self {
            LabelField::AnswerType => record.ans_type = value.to_string(),
            LabelField::Category => record.category = value.to_string(),
            LabelField::Gender => record.gender = value.to_string(),
        }
    }
}

/// Fixed ordered class list plus its name→id inverse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRegistry {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassRegistry {
    /// Build the registry for one label field
    pub fn for_field(field: LabelField) -> Self {
        let classes: Vec<String> = field.classes().iter().map(|c| c.to_string()).collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { classes, index }
    }

    /// Class id for a name, if enumerated
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Class name for an id
    pub fn class_of(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }

    /// Id of the `"missing"` catch-all (always the last class)
    pub fn missing_id(&self) -> usize {
        self.classes.len() - 1
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The ordered class names
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Return a copy of `records` with every out-of-registry value for `field`
/// rewritten to `"missing"`
pub fn normalize(records: &[ExampleProperties], field: LabelField) -> Vec<ExampleProperties> {
    let registry = ClassRegistry::for_field(field);
    records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if registry.id_of(field.value_of(&record)).is_none() {
                field.set(&mut record, MISSING);
            }
            record
        })
        .collect()
}

/// Answer-type registry plus normalized records
pub fn answer_type_classes(
    records: &[ExampleProperties],
) -> (ClassRegistry, Vec<ExampleProperties>) {
    (
        ClassRegistry::for_field(LabelField::AnswerType),
        normalize(records, LabelField::AnswerType),
    )
}

/// Category registry plus normalized records
pub fn category_classes(records: &[ExampleProperties]) -> (ClassRegistry, Vec<ExampleProperties>) {
    (
        ClassRegistry::for_field(LabelField::Category),
        normalize(records, LabelField::Category),
    )
}

/// Gender registry plus normalized records
pub fn gender_classes(records: &[ExampleProperties]) -> (ClassRegistry, Vec<ExampleProperties>) {
    (
        ClassRegistry::for_field(LabelField::Gender),
        normalize(records, LabelField::Gender),
    )
}

/// Number of distinct labels in a list
pub fn distinct_class_count<S: AsRef<str>>(labels: &[S]) -> usize {
    labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ans_type: &str, category: &str, gender: &str) -> ExampleProperties {
        ExampleProperties {
            ans_type: ans_type.to_string(),
            category: category.to_string(),
            gender: gender.to_string(),
        }
    }

    #[test]
    fn test_registry_sizes() {
        assert_eq!(ClassRegistry::for_field(LabelField::AnswerType).len(), 9);
        assert_eq!(ClassRegistry::for_field(LabelField::Category).len(), 7);
        assert_eq!(ClassRegistry::for_field(LabelField::Gender).len(), 4);
    }

    #[test]
    fn test_missing_is_always_last() {
        for field in [LabelField::AnswerType, LabelField::Category, LabelField::Gender] {
            let registry = ClassRegistry::for_field(field);
            assert_eq!(registry.class_of(registry.missing_id()), Some(MISSING));
            assert_eq!(registry.id_of(MISSING), Some(registry.len() - 1));
        }
    }

    #[test]
    fn test_answer_type_ids() {
        let (registry, normalized) = answer_type_classes(&[
            record("char", "History", "male"),
            record("bogus", "History", "male"),
        ]);

        assert_eq!(registry.id_of("char"), Some(2));
        assert_eq!(registry.id_of(MISSING), Some(8));
        assert_eq!(normalized[0].ans_type, "char");
        assert_eq!(normalized[1].ans_type, MISSING);
    }

    #[test]
    fn test_normalize_leaves_inputs_untouched() {
        let records = vec![record("char", "Basket_Weaving", "robot")];

        let by_category = normalize(&records, LabelField::Category);
        let by_gender = normalize(&records, LabelField::Gender);

        assert_eq!(records[0].category, "Basket_Weaving");
        assert_eq!(records[0].gender, "robot");
        assert_eq!(by_category[0].category, MISSING);
        // each call normalizes only its own field
        assert_eq!(by_category[0].gender, "robot");
        assert_eq!(by_gender[0].gender, MISSING);
        assert_eq!(by_gender[0].category, "Basket_Weaving");
    }

    #[test]
    fn test_ids_cover_range() {
        let registry = ClassRegistry::for_field(LabelField::Gender);
        for (i, class) in registry.classes().iter().enumerate() {
            assert_eq!(registry.id_of(class), Some(i));
            assert!(i < registry.len());
        }
    }

    #[test]
    fn test_distinct_class_count() {
        assert_eq!(distinct_class_count(&["a", "b", "a", "c"]), 3);
        assert_eq!(distinct_class_count::<&str>(&[]), 0);
    }
}
