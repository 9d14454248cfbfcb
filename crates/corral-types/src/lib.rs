pub mod event;
pub mod marker;
pub mod session;
pub mod snapshot;

pub use event::*;
pub use marker::*;
pub use session::*;
pub use snapshot::*;
