use super::DomainError;

pub const DEFAULT_MIN_CREDITS: u32 = 20;

/// Credit-load bounds for a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPolicy {
    pub min: u32,
    pub max: Option<u32>,
}

impl CreditPolicy {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn evaluate(&self, total: u32) -> Result<u32, DomainError> {
        if total < self.min {
            return Err(DomainError::CreditsBelowMinimum {
                total,
                minimum: self.min,
            });
        }

        if let Some(maximum) = self.max
            && total > maximum
        {
            return Err(DomainError::CreditsAboveMaximum { total, maximum });
        }

        Ok(total)
    }
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CREDITS, None)
    }
}
