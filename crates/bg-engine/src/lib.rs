//! Render engine for bytegraph patches.
//!
//! Lays out a patch of expression nodes in evaluation order and renders it
//! one stereo frame at a time. Compiled programs reach the render thread
//! through lock-free queues, so editing never blocks audio.

mod clock;
mod frame;
mod graph_state;
mod handoff;
mod patch;
mod sequence;

pub use clock::{TransportClock, TransportSnapshot, BYTEBEAT_RATE, PHASE_STEPS};
pub use frame::Frame;
pub use graph_state::{topological_sort, validate_connections, GraphError, MAX_FAN_IN};
pub use handoff::{program_channel, ProgramPublisher, ProgramSlot, DEFAULT_CAPACITY};
pub use patch::{Connection, Node, NodeId, NodeKind, Patch};
pub use sequence::{byte_to_unit, ExpressionHandle, RenderSequence};
