use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::processor::ProcessError;

/// Window lengths, in records, for the three rolling indicators.
///
/// No ordering between them is enforced; `short < long` is only the usual setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub short: NonZeroUsize,
    pub long: NonZeroUsize,
    pub volatility: NonZeroUsize,
}

impl WindowConfig {
    pub fn new(short: usize, long: usize, volatility: usize) -> Result<Self, ProcessError> {
        let positive = |name: &'static str, n: usize| {
            NonZeroUsize::new(n).ok_or(ProcessError::InvalidWindow { name })
        };
        Ok(Self {
            short: positive("short", short)?,
            long: positive("long", long)?,
            volatility: positive("volatility", volatility)?,
        })
    }
}
