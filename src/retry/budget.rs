/// Refresh-and-retry allowance owned by a single call chain.
///
/// Each `ApiClient::request` creates its own budget, so concurrent calls
/// cannot drain or reset one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryBudget {
    limit: u8,
    consumed: u8,
}

impl RetryBudget {
    pub fn new(limit: u8) -> Self {
        Self { limit, consumed: 0 }
    }

    /// Takes one unit, returning false once the limit is reached.
    pub fn try_consume(&mut self) -> bool {
        if self.consumed >= self.limit {
            return false;
        }
        self.consumed += 1;
        true
    }

    pub fn consumed(&self) -> u8 {
        self.consumed
    }

    pub fn remaining(&self) -> u8 {
        self.limit - self.consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.consumed >= self.limit
    }
}
