use std::collections::VecDeque;
use std::fmt;

/// The name of a metric, including the namespaces in which it was defined.
/// A double-ended vec of strings, joined with dots when printed.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default)]
pub struct MetricName {
    /// Nodes are stored in order of their final appearance in the name.
    nodes: VecDeque<String>,
}

impl MetricName {
    /// Prepend a namespace to the existing name.
    pub fn prepend<S: Into<MetricName>>(mut self, namespace: S) -> Self {
        let parts: MetricName = namespace.into();
        parts
            .nodes
            .into_iter()
            .rev()
            .for_each(|node| self.nodes.push_front(node));
        self
    }

    /// Append a leaf or sub-namespace to the existing name.
    pub fn append<S: Into<MetricName>>(mut self, name: S) -> Self {
        let parts: MetricName = name.into();
        self.nodes.extend(parts.nodes);
        self
    }

    /// Combine name parts into a string.
    pub fn join(&self, separator: &str) -> String {
        self.nodes.iter().map(|s| &**s).collect::<Vec<&str>>().join(separator)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of parts in the name.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Dotted strings are split into parts, empty parts are skipped.
impl<'a> From<&'a str> for MetricName {
    fn from(name: &'a str) -> Self {
        MetricName {
            nodes: name
                .split('.')
                .filter(|part| !part.is_empty())
                .map(|part| part.to_owned())
                .collect(),
        }
    }
}

impl From<String> for MetricName {
    fn from(name: String) -> Self {
        MetricName::from(name.as_str())
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn dotted_strings_are_split() {
        let name: MetricName = "http.requests".into();
        assert_eq!(name.len(), 2);
        assert_eq!(name.to_string(), "http.requests");
    }

    #[test]
    fn prepend_namespace() {
        let name = MetricName::from("requests").prepend("app.http");
        assert_eq!(name.join("."), "app.http.requests");
    }

    #[test]
    fn append_leaf() {
        let name = MetricName::from("app").append("db.queries");
        assert_eq!(name.join("/"), "app/db/queries");
    }

    #[test]
    fn empty_parts_are_dropped() {
        let name: MetricName = "..a..b.".into();
        assert_eq!(name.join("."), "a.b");
        assert!(MetricName::from("").is_empty());
    }
}
