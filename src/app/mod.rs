// Application layer - Use case interactors

pub mod container;
pub mod segment_interactor;
pub mod sweep_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use segment_interactor::{JobLocks, SegmentConfig, SegmentInteractor};
pub use sweep_interactor::{SweepInteractor, SweepReport, SweepRequest};
