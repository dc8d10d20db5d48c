use log::debug;

use crate::config::ProcessingResult;

/// The sheets processed so far, keyed by file name, in the order they were
/// first processed.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Session {
    entries: Vec<(String, ProcessingResult)>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Records the result of a file. A file processed again replaces its
    /// previous result, at the same position.
    pub fn upsert(&mut self, file_name: &str, result: ProcessingResult) {
        match self.entries.iter_mut().find(|(name, _)| name == file_name) {
            Some(entry) => {
                debug!("upsert: replacing result of {}", file_name);
                entry.1 = result;
            }
            None => self.entries.push((file_name.to_string(), result)),
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&ProcessingResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, r)| r)
    }

    pub fn entries(&self) -> &[(String, ProcessingResult)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
