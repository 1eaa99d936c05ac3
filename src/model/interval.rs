use crate::error::FactsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSpec {
    pub label: String,
    pub width_ns: i64,
}

/// Named resampling widths in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    specs: Vec<IntervalSpec>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, width_ns: i64) -> Result<(), FactsError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(FactsError::InvalidInterval(
                "interval label must not be empty".to_string(),
            ));
        }
        if width_ns <= 0 {
            return Err(FactsError::InvalidInterval(format!(
                "interval '{}': width must be > 0, got {}ns",
                label, width_ns
            )));
        }
        if self.specs.iter().any(|s| s.label == label) {
            return Err(FactsError::InvalidInterval(format!(
                "duplicate interval label '{}'",
                label
            )));
        }
        self.specs.push(IntervalSpec { label, width_ns });
        Ok(())
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, FactsError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for (label, width_ns) in pairs {
            set.push(label, width_ns)?;
        }
        Ok(set)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntervalSpec> {
        self.specs.iter()
    }

    pub fn get(&self, label: &str) -> Option<&IntervalSpec> {
        self.specs.iter().find(|s| s.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a IntervalSpec;
    type IntoIter = std::slice::Iter<'a, IntervalSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
