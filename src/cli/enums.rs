//! CLI enum types for ramp selection.

use clap::ValueEnum;

use ascii_generator::Ramp;

/// Glyph ramp preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RampChoice {
    Simple,
    #[default]
    Standard,
    Detailed,
    Blocks,
}

impl From<RampChoice> for Ramp {
    fn from(c: RampChoice) -> Self {
        match c {
            RampChoice::Simple => Ramp::Simple,
            RampChoice::Standard => Ramp::Standard,
            RampChoice::Detailed => Ramp::Detailed,
            RampChoice::Blocks => Ramp::Blocks,
        }
    }
}
