/// Sort direction of name ordered lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Ascending,
    Descending,
}

impl Ordering {
    /// `true` and `asc` select ascending order, `false` and `desc` descending
    pub fn from_query(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "true" | "asc" => Some(Ordering::Ascending),
            "false" | "desc" => Some(Ordering::Descending),
            _ => None,
        }
    }
}
