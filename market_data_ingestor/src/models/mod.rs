pub mod bar;
pub mod bar_series;
pub mod period;
pub mod request_params;

pub use bar::Bar;
pub use bar_series::BarSeries;
pub use period::{Period, PeriodError};
pub use request_params::BarsRequestParams;
