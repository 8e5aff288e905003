//! In-memory stream catalog
//!
//! Each registered stream carries the three attributes a query can select
//! on. Comparison is case-insensitive; `*` in an EQUALS value matches any run
//! of characters.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::expr::Operation;
use crate::prefilter::{SearchTermBloomFilter, TokenFilter};

use super::errors::{MetadataError, MetadataResult};
use super::predicate::{Condition, StreamPredicate};
use super::StreamMetadata;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: u64,
    /// Directory the stream is archived under
    pub index: String,
    pub host: String,
    #[serde(alias = "sourcetype")]
    pub source_type: String,
}

impl StreamRecord {
    pub fn new(
        id: u64,
        index: impl Into<String>,
        host: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            index: index.into(),
            host: host.into(),
            source_type: source_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PrefilterParams {
    expected_items: usize,
    false_positive_rate: f64,
}

#[derive(Debug, Default)]
pub struct StreamCatalog {
    records: Vec<StreamRecord>,
    params: Option<PrefilterParams>,
    prefilter: Option<TokenFilter>,
}

impl StreamCatalog {
    pub fn new(records: Vec<StreamRecord>) -> Self {
        Self {
            records,
            params: None,
            prefilter: None,
        }
    }

    /// Load a JSON array of stream records
    pub fn from_json_file(path: &Path) -> MetadataResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MetadataError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let records: Vec<StreamRecord> = serde_json::from_str(&content).map_err(|e| {
            MetadataError::Unavailable(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Ok(Self::new(records))
    }

    /// Enable the bloom prefilter over all registered names
    pub fn with_prefilter(mut self, expected_items: usize, false_positive_rate: f64) -> MetadataResult<Self> {
        self.params = Some(PrefilterParams {
            expected_items,
            false_positive_rate,
        });
        self.rebuild_prefilter()?;
        Ok(self)
    }

    pub fn register(&mut self, record: StreamRecord) -> MetadataResult<()> {
        self.records.push(record);
        self.rebuild_prefilter()
    }

    pub fn records(&self) -> &[StreamRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn prefilter_enabled(&self) -> bool {
        self.prefilter.is_some()
    }

    fn rebuild_prefilter(&mut self) -> MetadataResult<()> {
        let Some(params) = self.params else {
            return Ok(());
        };
        let tokens = self
            .records
            .iter()
            .flat_map(|r| [r.index.as_str(), r.host.as_str(), r.source_type.as_str()]);
        let filter =
            SearchTermBloomFilter::new(params.expected_items, params.false_positive_rate, tokens);
        self.prefilter = Some(filter.build()?);
        Ok(())
    }

    fn compile_all(&self, field: &'static str, conditions: &[Condition]) -> MetadataResult<Vec<Matcher>> {
        conditions
            .iter()
            .map(|c| Matcher::compile(field, c, self.prefilter.as_ref()))
            .collect()
    }
}

impl StreamMetadata for StreamCatalog {
    fn stream_ids(&self, predicate: &StreamPredicate) -> MetadataResult<Vec<u64>> {
        let indexes = self.compile_all("index", predicate.indexes())?;
        let hosts = self.compile_all("host", predicate.hosts())?;
        let source_types = self.compile_all("sourcetype", predicate.source_types())?;

        let mut ids: Vec<u64> = self
            .records
            .iter()
            .filter(|r| indexes.iter().all(|m| m.matches(&r.index)))
            .filter(|r| hosts.is_empty() || hosts.iter().any(|m| m.matches(&r.host)))
            .filter(|r| {
                source_types.is_empty() || source_types.iter().any(|m| m.matches(&r.source_type))
            })
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

#[derive(Debug)]
enum Pattern {
    Exact(String),
    Wildcard(Regex),
    /// Rejected by the prefilter
    Absent,
}

#[derive(Debug)]
struct Matcher {
    pattern: Pattern,
    negate: bool,
}

impl Matcher {
    fn compile(field: &'static str, condition: &Condition, prefilter: Option<&TokenFilter>) -> MetadataResult<Self> {
        let negate = match condition.operation {
            Operation::Equals => false,
            Operation::NotEquals => true,
            operation => return Err(MetadataError::UnsupportedOperation { field, operation }),
        };

        let pattern = if condition.has_wildcard() {
            let body: Vec<String> = condition.value.split('*').map(regex::escape).collect();
            let source = format!("(?i)^{}$", body.join(".*"));
            let regex = Regex::new(&source).map_err(|e| MetadataError::InvalidPattern {
                pattern: condition.value.clone(),
                reason: e.to_string(),
            })?;
            Pattern::Wildcard(regex)
        } else if prefilter.map_or(false, |f| !f.might_contain(&condition.value)) {
            Pattern::Absent
        } else {
            Pattern::Exact(condition.value.to_lowercase())
        };

        Ok(Self { pattern, negate })
    }

    fn matches(&self, candidate: &str) -> bool {
        let hit = match &self.pattern {
            Pattern::Exact(value) => candidate.to_lowercase() == *value,
            Pattern::Wildcard(regex) => regex.is_match(candidate),
            Pattern::Absent => false,
        };
        hit != self.negate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog() -> StreamCatalog {
        StreamCatalog::new(vec![
            StreamRecord::new(7, "f17_v2", "sc-99-99-14-108", "log:f17_v2:0"),
            StreamRecord::new(3, "f17", "sc-99-99-14-40", "log:f17:0"),
            StreamRecord::new(9, "haproxy", "lb-1", "haproxy:access"),
            StreamRecord::new(3, "f17", "sc-99-99-14-40", "log:f17:0"),
        ])
    }

    #[test]
    fn test_exact_index() {
        let p = StreamPredicate::new().with_index(Condition::equals("f17_v2"));
        assert_eq!(catalog().stream_ids(&p).unwrap(), vec![7]);
    }

    #[test]
    fn test_case_insensitive() {
        let p = StreamPredicate::new().with_index(Condition::equals("HAPROXY"));
        assert_eq!(catalog().stream_ids(&p).unwrap(), vec![9]);
    }

    #[test]
    fn test_wildcard_sorted_and_deduplicated() {
        let p = StreamPredicate::wildcard();
        assert_eq!(catalog().stream_ids(&p).unwrap(), vec![3, 7, 9]);

        let p = StreamPredicate::new().with_index(Condition::equals("f17*"));
        assert_eq!(catalog().stream_ids(&p).unwrap(), vec![3, 7]);
    }

    #[test]
    fn test_wildcard_escapes_regex_metacharacters() {
        let p = StreamPredicate::new().with_source_type(Condition::equals("log:f17.*"));
        // '.' is literal, so "log:f17_v2:0" does not match
        assert!(catalog().stream_ids(&p).unwrap().is_empty());
    }

    #[test]
    fn test_hosts_are_ored() {
        let p = StreamPredicate::wildcard()
            .with_host(Condition::equals("lb-1"))
            .with_host(Condition::equals("sc-99-99-14-108"));
        assert_eq!(catalog().stream_ids(&p).unwrap(), vec![7, 9]);
    }

    #[test]
    fn test_groups_are_anded() {
        let p = StreamPredicate::new()
            .with_index(Condition::equals("f17*"))
            .with_source_type(Condition::equals("haproxy:*"));
        assert!(catalog().stream_ids(&p).unwrap().is_empty());
    }

    #[test]
    fn test_not_equals_negates() {
        let p = StreamPredicate::new().with_index(Condition::new("f17", Operation::NotEquals));
        assert_eq!(catalog().stream_ids(&p).unwrap(), vec![7, 9]);
    }

    #[test]
    fn test_unsupported_operation() {
        let p = StreamPredicate::new().with_index(Condition::new("f17", Operation::Gt));
        let err = catalog().stream_ids(&p).unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedOperation { field: "index", .. }));
        assert!(!err.retryable());
    }

    #[test]
    fn test_prefilter_keeps_results_identical() {
        let plain = catalog();
        let filtered = catalog().with_prefilter(100, 0.01).unwrap();
        assert!(filtered.prefilter_enabled());
        for value in ["f17_v2", "F17", "missing", "f1*"] {
            let p = StreamPredicate::new().with_index(Condition::equals(value));
            assert_eq!(
                plain.stream_ids(&p).unwrap(),
                filtered.stream_ids(&p).unwrap(),
                "{}",
                value
            );
        }
    }

    #[test]
    fn test_prefilter_on_empty_catalog_fails() {
        assert!(StreamCatalog::default().with_prefilter(100, 0.01).is_err());
    }

    #[test]
    fn test_register_refreshes_prefilter() {
        let mut catalog = catalog().with_prefilter(100, 0.01).unwrap();
        catalog
            .register(StreamRecord::new(11, "newindex", "h", "st"))
            .unwrap();
        let p = StreamPredicate::new().with_index(Condition::equals("newindex"));
        assert_eq!(catalog.stream_ids(&p).unwrap(), vec![11]);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 7, "index": "f17_v2", "host": "h", "sourcetype": "st"}}]"#
        )
        .unwrap();
        let catalog = StreamCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].source_type, "st");
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = StreamCatalog::from_json_file(Path::new("/nonexistent/streams.json")).unwrap_err();
        assert!(err.retryable());
    }
}
