//! Fakes shared by the plugin tests

use std::collections::HashMap;
use sysglance_core::{DisplayLine, RemoteSystem, ScalarSource, SourceError};

/// Remote answers keyed by field
pub fn answers<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Plain text of display lines, one `\n` per break
pub fn rendered(lines: &[DisplayLine]) -> String {
    lines
        .iter()
        .map(|l| if l.is_break() { "\n" } else { l.as_text() })
        .collect()
}

/// Remote agent replaying canned answers, one per query
pub struct ScriptedAgent {
    pub kind: RemoteSystem,
    pub replies: Vec<HashMap<String, String>>,
}

impl ScalarSource for ScriptedAgent {
    fn system_kind(&self) -> RemoteSystem {
        self.kind
    }

    fn get(&mut self, _oids: &[(&str, &str)]) -> Result<HashMap<String, String>, SourceError> {
        if self.replies.is_empty() {
            return Err(SourceError::Remote("no reply".to_string()));
        }
        Ok(self.replies.remove(0))
    }

    fn get_bulk(&mut self, oids: &[(&str, &str)]) -> Result<HashMap<String, String>, SourceError> {
        self.get(oids)
    }
}
