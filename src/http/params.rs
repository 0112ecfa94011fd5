//! Query parameters and their URL encoding

use url::form_urlencoded;

/// A single query parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// One scalar value
    Single(String),
    /// A sequence of values
    Multi(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl<S: Into<String>> From<Vec<S>> for ParamValue {
    fn from(values: Vec<S>) -> Self {
        ParamValue::Multi(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered set of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, ParamValue)>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((name, value)),
        }
    }

    /// Builder-style `insert`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Encode as an `application/x-www-form-urlencoded` query string
    ///
    /// With `doseq`, sequence values become repeated keys
    /// (`feature=gene&feature=exon`); without it they are comma-joined
    /// under a single key.
    pub fn encode(&self, doseq: bool) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            match value {
                ParamValue::Single(v) => {
                    serializer.append_pair(name, v);
                }
                ParamValue::Multi(values) if doseq => {
                    for v in values {
                        serializer.append_pair(name, v);
                    }
                }
                ParamValue::Multi(values) => {
                    serializer.append_pair(name, &values.join(","));
                }
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_scalars_in_insertion_order() {
        let params = QueryParams::new()
            .with("object_type", "gene")
            .with("expand", 1u32);
        assert_eq!(params.encode(false), "object_type=gene&expand=1");
    }

    #[test]
    fn test_encode_doseq_repeats_key() {
        let params = QueryParams::new().with("feature", vec!["gene", "exon"]);
        assert_eq!(params.encode(true), "feature=gene&feature=exon");
    }

    #[test]
    fn test_encode_without_doseq_joins() {
        let params = QueryParams::new().with("feature", vec!["gene", "exon"]);
        assert_eq!(params.encode(false), "feature=gene%2Cexon");
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let params = QueryParams::new().with("q", "a b&c");
        assert_eq!(params.encode(true), "q=a+b%26c");
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut params = QueryParams::new();
        params.insert("feature", "gene");
        params.insert("feature", "variation");
        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("feature"),
            Some(&ParamValue::Single("variation".to_string()))
        );
    }

    #[test]
    fn test_from_iterator() {
        let params: QueryParams = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.encode(true), "a=1&b=2");
        assert!(QueryParams::new().is_empty());
    }
}
