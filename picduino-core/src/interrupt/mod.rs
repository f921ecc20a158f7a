//! Interrupt sources, callback registry and dispatch

pub mod dispatch;
pub mod registry;
pub mod source;

pub use dispatch::{
    CaptureEdge, Edge, InterruptDispatcher, Prescaler, SourceConfig, TimerCounter, TimerPair,
};
pub use registry::CallbackRegistry;
pub use source::{Channel, ExtInt, InterruptSource, TimerId};
