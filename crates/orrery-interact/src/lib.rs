//! Orrery Interact: drag, search, blast radius, highlighting and the session

pub mod blast;
pub mod controller;
pub mod drag;
pub mod frame;
pub mod highlight;
pub mod search;
pub mod session;
pub mod view;


pub use blast::blast_radius;
pub use controller::{Controller, ControllerConfig, Interaction, SessionEvent};
pub use drag::{DragState, orbit_position};
pub use frame::{Frame, FrameEdge, FrameNode};
pub use highlight::{Focus, HighlightClass, HighlightState, highlight_class_of};
pub use search::SearchState;
pub use session::{Session, SessionConfig};
pub use view::ViewState;
