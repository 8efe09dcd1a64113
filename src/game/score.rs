/// Receives one call per piece of food eaten.
pub trait ScoreSink {
    fn increment(&mut self);
}

/// Plain counter used by the terminal front end and the tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreCounter {
    value: u32,
}

impl ScoreCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

impl ScoreSink for ScoreCounter {
    fn increment(&mut self) {
        self.value = self.value.saturating_add(1);
    }
}
