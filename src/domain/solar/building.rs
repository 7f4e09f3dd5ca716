use crate::domain::errors::ArtifactError;
use std::collections::HashMap;

/// Ordered building-type labels the models were fitted against.
///
/// The integer code of a label is its position in this list. The list is
/// persisted with the artifacts and never rebuilt from request data, so codes
/// always line up with training.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingCategories {
    labels: Vec<String>,
    codes: HashMap<String, u32>,
}

impl BuildingCategories {
    pub fn new(labels: Vec<String>) -> Result<Self, ArtifactError> {
        if labels.is_empty() {
            return Err(ArtifactError::EmptyCategories);
        }

        let mut codes = HashMap::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            if codes.insert(label.clone(), position as u32).is_some() {
                return Err(ArtifactError::DuplicateCategory {
                    label: label.clone(),
                });
            }
        }

        Ok(Self { labels, codes })
    }

    pub fn code_of(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn label_of(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
