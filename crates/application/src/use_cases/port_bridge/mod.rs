mod bridge;

pub use bridge::PortBridge;
