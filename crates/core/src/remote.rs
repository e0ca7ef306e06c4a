//! Remote (SNMP-style) input boundary
//!
//! The transport itself lives outside this crate. Plugins only see scalar
//! answers keyed by the field names they asked for.

use crate::error::SourceError;
use crate::metric_source::BoxedMetricSource;
use std::collections::HashMap;

/// Family of the remote agent, which decides the query layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteSystem {
    #[default]
    Default,
    Windows,
    Esxi,
    NetApp,
}

/// Scalar query interface of a remote agent
pub trait ScalarSource {
    fn system_kind(&self) -> RemoteSystem;

    /// Fetch one scalar per `(field, oid)` pair.
    ///
    /// Fields the agent did not answer map to an empty string.
    fn get(&mut self, oids: &[(&str, &str)]) -> Result<HashMap<String, String>, SourceError>;

    /// Walk table columns; answers are keyed `"<field>.<row>"`
    fn get_bulk(&mut self, oids: &[(&str, &str)]) -> Result<HashMap<String, String>, SourceError>;
}

/// Parse a scalar answer, `None` when blank or not numeric
pub fn parse_scalar(answers: &HashMap<String, String>, field: &str) -> Option<f64> {
    answers
        .get(field)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

/// Where a plugin reads its metrics from
pub enum InputMethod {
    Local(BoxedMetricSource),
    Remote(Box<dyn ScalarSource>),
}

impl InputMethod {
    pub fn is_remote(&self) -> bool {
        matches!(self, InputMethod::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_rejects_blank() {
        let answers: HashMap<String, String> = [
            ("idle".to_string(), " 87 ".to_string()),
            ("user".to_string(), String::new()),
            ("system".to_string(), "n/a".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(parse_scalar(&answers, "idle"), Some(87.0));
        assert_eq!(parse_scalar(&answers, "user"), None);
        assert_eq!(parse_scalar(&answers, "system"), None);
        assert_eq!(parse_scalar(&answers, "missing"), None);
    }
}
