// Event index: output symbol to event name mapping.

use hashbrown::HashMap;

use crate::ModelError;

/// Names of the events emitted as output symbols of the search network.
///
/// The index file lists one `name<TAB>id` entry per line. Ids need not be
/// contiguous; id 0 is reserved for "no event".
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    names: HashMap<u32, String>,
}

impl EventIndex {
    /// Parse the text form of the index. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let mut names = HashMap::new();
        for (n, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let Some(name) = fields.next() else {
                continue;
            };
            let id = fields
                .next()
                .and_then(|f| f.parse::<u32>().ok())
                .ok_or(ModelError::InvalidIndexLine { line: n + 1 })?;
            names.insert(id, name.to_string());
        }
        Ok(Self { names })
    }

    /// Name of event `id`, if listed.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Id of the event called `name`.
    pub fn id(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries sorted by id.
    pub fn entries(&self) -> Vec<(u32, &str)> {
        let mut entries: Vec<(u32, &str)> =
            self.names.iter().map(|(&id, n)| (id, n.as_str())).collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        entries
    }

    /// Render in the text form accepted by [`EventIndex::parse`].
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (id, name) in self.entries() {
            text.push_str(name);
            text.push('\t');
            text.push_str(&id.to_string());
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_then_id() {
        let index = EventIndex::parse("<eps>\t0\nbackground\t1\ngunshot\t2\n").unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.name(1), Some("background"));
        assert_eq!(index.name(2), Some("gunshot"));
        assert_eq!(index.name(7), None);
        assert_eq!(index.id("gunshot"), Some(2));
    }

    #[test]
    fn sparse_ids_and_crlf() {
        let index = EventIndex::parse("glass\t100\r\n\r\nscream\t3\r\n").unwrap();
        assert_eq!(index.entries(), vec![(3, "scream"), (100, "glass")]);
    }

    #[test]
    fn reject_missing_id() {
        let err = EventIndex::parse("background\t1\ngunshot\n").unwrap_err();
        assert!(matches!(err, ModelError::InvalidIndexLine { line: 2 }));
    }

    #[test]
    fn reject_non_numeric_id() {
        let err = EventIndex::parse("gunshot\tx\n").unwrap_err();
        assert!(matches!(err, ModelError::InvalidIndexLine { line: 1 }));
    }

    #[test]
    fn text_form_reparses() {
        let index = EventIndex::parse("b\t2\na\t1\n").unwrap();
        assert_eq!(index.to_text(), "a\t1\nb\t2\n");
        let again = EventIndex::parse(&index.to_text()).unwrap();
        assert_eq!(again.entries(), index.entries());
    }
}
