//! Ordered multimap for HTTP header fields.

/// Header collection mapping a field name to an ordered list of values.
///
/// Key lookups are ASCII-case-insensitive, and so are value comparisons in
/// the query helpers. Insertion order of keys is preserved, which keeps
/// serialization deterministic. Backed by a plain vector of pairs; header
/// blocks are small enough that linear scans are the right tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends `value` to the list held under `key`, creating the key at the
    /// end of the map if it is not present yet.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entry_mut(&key) {
            Some(values) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replaces any existing values under `key` with the single `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entry_mut(&key) {
            Some(values) => {
                values.clear();
                values.push(value);
            }
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values(key).is_some()
    }

    /// True when `key` holds a value equal to `value`, ignoring ASCII case.
    pub fn contains_value(&self, key: &str, value: &str) -> bool {
        self.values(key)
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }

    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, values)| values.as_slice())
    }

    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.values(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the first value under `key` that starts with `prefix`,
    /// ignoring ASCII case. Cookie and multipart parameter scans use this.
    pub fn first_value_starting_with(&self, key: &str, prefix: &str) -> Option<&str> {
        self.values(key)?
            .iter()
            .find(|v| starts_with_ignore_case(v, prefix))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends the wire form of every header to `out`: one
    /// `Name:value1,value2\r\n` line per key, values comma-joined with no
    /// trailing comma.
    pub fn write_wire(&self, out: &mut Vec<u8>) {
        for (key, values) in &self.entries {
            out.extend_from_slice(key.as_bytes());
            out.push(b':');
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(value.as_bytes());
            }
            out.extend_from_slice(b"\r\n");
        }
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, values)| values)
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
