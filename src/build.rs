mod builder;
mod document;
mod feeder;
mod markdown;
mod page;
mod render;
mod watch;

pub use builder::{BuildError, BuildSummary, Builder};
pub use feeder::{Feeder, FeederError, WorkItem};
pub use render::{RenderError, Renderer};
pub use watch::{DirectoryWatcher, WatchError};
