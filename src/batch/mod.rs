//! Batching of calls through the execution module.
//!
//! A batch is compiled into the wire entries of `exec.batchDispatch`, dispatched or dry-run as a
//! single call, and its ordered responses decoded against the interfaces of the original calls.

mod compiler;
pub use compiler::BatchCompiler;

mod decoder;
pub use decoder::{BatchDecoder, decode_response};

mod simulator;
pub use simulator::{BatchSimulation, BatchSimulator, GasEstimateError};
