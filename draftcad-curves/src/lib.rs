pub mod bezier;
pub mod layout;
pub mod spiral;
pub mod spline;

pub use bezier::Bezier;
pub use layout::{CurveAttribs, Layout};
pub use spiral::EulerSpiral;
pub use spline::Spline;

pub mod errors {
    use draftcad_core::errors::AlgebraError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CurveError {
        #[error("curve definition requires two or more points, got {0}")]
        NotEnoughPoints(usize),
        #[error(transparent)]
        Algebra(#[from] AlgebraError),
    }
}
