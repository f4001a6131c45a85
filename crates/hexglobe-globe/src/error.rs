//! Globe error types.

use hexglobe_math::ColorParseError;
use thiserror::Error;

use crate::{FontError, GlobeState, MarkerId, PinId};

#[derive(Debug, Error)]
pub enum GlobeError {
    /// The label font never loaded; the globe will not run.
    #[error("globe never became ready: {0}")]
    Readiness(#[source] FontError),

    #[error("3D acceleration is not supported in this environment")]
    UnsupportedEnvironment,

    #[error("globe is not running (state: {state:?})")]
    NotRunning { state: GlobeState },

    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),

    #[error("no marker with id {0:?}")]
    UnknownMarker(MarkerId),

    #[error("no pin with id {0:?}")]
    UnknownPin(PinId),
}
