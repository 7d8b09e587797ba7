/// Upper bound on distinct values in one column dictionary.
pub(crate) const MAX_DICT_LEN: usize = 8;

/// Upper bound on the summed byte length of all dictionary values.
pub(crate) const MAX_DICT_SIZE_BYTES: usize = 256;

/// Per-column dictionary for low-cardinality columns.
///
/// Rows of a dict-encoded column store a single byte indexing into this
/// table. The dictionary is capped at [`MAX_DICT_LEN`] entries and
/// [`MAX_DICT_SIZE_BYTES`] total bytes; a column that does not fit falls
/// through to the next encoding candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuesDict {
    values: Vec<String>,
}

impl ValuesDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_values(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Returns the index of `v`, inserting it if absent. `None` means the
    /// dictionary caps would be exceeded and dict encoding is off the table.
    pub fn get_or_insert(&mut self, v: &str) -> Option<u8> {
        let mut size_bytes = 0;
        for (i, existing) in self.values.iter().enumerate() {
            if existing == v {
                return Some(i as u8);
            }
            size_bytes += existing.len();
        }
        if self.values.len() >= MAX_DICT_LEN || size_bytes + v.len() > MAX_DICT_SIZE_BYTES {
            return None;
        }
        self.values.push(v.to_string());
        Some((self.values.len() - 1) as u8)
    }

    /// Index of `v` if it is already in the dictionary.
    pub fn index_of(&self, v: &str) -> Option<u8> {
        self.values.iter().position(|x| x == v).map(|i| i as u8)
    }

    pub fn get(&self, idx: u8) -> Option<&str> {
        self.values.get(idx as usize).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
