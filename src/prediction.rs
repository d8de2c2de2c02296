//! Static branch prediction policy

/// The single fixed taken/not-taken guess applied to every branch
/// for the whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StaticPrediction {
    Taken,
    #[default]
    NotTaken,
}

impl StaticPrediction {
    pub fn predicts_taken(self) -> bool {
        self == StaticPrediction::Taken
    }
}
