//! State-change notifications for the packing station
//!
//! Every successful station operation publishes a [`StationEvent`] so that a
//! display, a logger or a test can observe progress without polling.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Station    │────▶│  Event Bus   │────▶│  Subscribers │
//! │  (publish)   │     │  (broadcast) │     │   (recv)     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

pub mod bus;
pub mod types;

pub use bus::{
    EventBus, EventFilter, FilteredReceiver, SharedEventBus, DEFAULT_CAPACITY, MAX_CAPACITY,
};
pub use types::StationEvent;
