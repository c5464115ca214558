use rowscale_engine::ScaleError;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DatasetError {
    #[display("scaling failed: {_0}")]
    #[from]
    Scale(ScaleError),
    #[display("split ratio must lie in [0, 1], got {ratio}")]
    InvalidSplit { ratio: f64 },
    #[display("paired sequences differ in length: {x} X rows, {y} Y rows")]
    LengthMismatch { x: usize, y: usize },
    #[display("{time_steps} time steps do not fit in {rows} training rows")]
    InvalidTimeSteps { time_steps: usize, rows: usize },
}
