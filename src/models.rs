use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Label → probability pairs in class-index order.
///
/// Serialized as a JSON object whose key order follows the model's class
/// indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probabilities(Vec<(String, f32)>);

impl Probabilities {
    pub fn new(entries: Vec<(String, f32)>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(label, p)| (label.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f32> {
        self.iter().find(|(l, _)| *l == label).map(|(_, p)| p)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(label, _)| label)
    }

    pub fn sum(&self) -> f32 {
        self.iter().map(|(_, p)| p).sum()
    }

    /// Label holding the largest probability, first one on ties.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<(&str, f32)> = None;
        for (label, p) in self.iter() {
            match best {
                Some((_, max)) if p <= max => {}
                _ => best = Some((label, p)),
            }
        }
        best.map(|(label, _)| label)
    }
}

impl Serialize for Probabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, p) in &self.0 {
            map.serialize_entry(label, p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Probabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Probabilities;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, p)) = access.next_entry::<String, f32>()? {
                    entries.push((label, p));
                }
                Ok(Probabilities(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Body of a successful `/predict` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub predicted_class: String,
    pub probabilities: Probabilities,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub labels: Vec<String>,
}
