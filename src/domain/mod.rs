// Domain layer: records, grading rules, policy and ports. No I/O here.

pub mod grading;
pub mod model;
pub mod policy;
pub mod ports;
