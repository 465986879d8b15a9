//! Online forecast blending

pub mod blender;
pub mod clock;
pub mod lookup;
pub mod narrative;
pub mod predictor;
pub mod window;

pub use blender::{blend, clip_and_round, share_percentage, ForecastBlender};
pub use clock::{Clock, FixedClock, SystemClock};
pub use narrative::{DeviationTier, FixedPicker, PhrasePicker, RandomPicker};
pub use predictor::{Predictor, PredictorRegistry, SeasonalTrendModel};
pub use window::select_window;
