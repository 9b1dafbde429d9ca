pub mod bins;
pub mod bootstrap;
pub mod compbox;
pub mod cumulative;
pub mod cumulinc;
pub mod dispatch;
pub mod geometry;
pub mod layout;
pub mod normalize;
pub mod payload;
pub mod scale;
pub mod search;
pub mod surface;
pub mod svg;

pub use bins::{CumulincPoint, CumulincSeries, DiscreteBin, IntervalBin, SUPPRESSED};
pub use bootstrap::{Applied, PageState};
pub use cumulative::{accumulate, decumulate, DisplayMode};
pub use dispatch::ActionRegistry;
pub use layout::Layout;
pub use normalize::{normalize_discrete, normalize_intervals, Normalized};
pub use payload::{ChannelMessage, Page};
pub use risteys_plot_common::{Result, RisteysPlotError};
pub use surface::{PanelKind, PlotSettings, Surface, SurfaceGeometry, SurfaceRegistry};
