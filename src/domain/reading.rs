use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One sampled snapshot of sensor fields, the unit of transmission.
///
/// A reading is an ordered mapping from field name to a scalar value
/// (number or string). The queue never inspects or transforms it; it is
/// only serialized for persistence and transmission. Field order is the
/// order the fields were set (serde_json's preserve_order map).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(Map<String, Value>);

impl Reading {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Reading {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_fields() {
        let mut reading = Reading::new();
        reading.set("temperature", "21.45").set("humidity", 48.2);

        assert_eq!(reading.len(), 2);
        assert_eq!(reading.get("temperature"), Some(&Value::from("21.45")));
        assert_eq!(reading.get("humidity"), Some(&Value::from(48.2)));
        assert_eq!(reading.get("pressure"), None);
    }

    #[test]
    fn serializes_as_plain_object_in_field_order() {
        let reading: Reading = [
            ("temperature", "21.45"),
            ("pressure", "101325.00"),
            ("humidity", "48.20"),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(
            json,
            r#"{"temperature":"21.45","pressure":"101325.00","humidity":"48.20"}"#
        );
    }

    #[test]
    fn round_trips_through_json() {
        let mut reading = Reading::new();
        reading.set("P1", "12").set("nh3", 0.44);

        let json = serde_json::to_string(&reading).unwrap();
        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }
}
