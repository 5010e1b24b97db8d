//! Workflow engine — sequential multi-agent idea pipeline.
//!
//! An idea is passed through an ordered list of agents; each agent's response
//! becomes the next agent's input, and every hand-off is recorded in the
//! workflow log.
//!
//! # Architecture
//!
//! ```text
//! pipeline.yaml ──► PipelineDefinition ──► PipelineExecutor ──► PipelineResult
//!                                              │                    │
//!                   specialists/*.yaml ─────► SpecialistDef          │ codec::encode
//!                                              │                    ▼
//!                                      dyn AgentCapability     ["[Design] received: ...", ...]
//!                                              │                    │ codec::decode
//!                                      LlmAgentCaller (HTTP)        ▼
//!                                                              DecodedStep (decoder)
//! ```

pub mod agent_caller;
pub mod capability;
pub mod codec;
pub mod decoder;
pub mod executor;
pub mod schema;
pub mod specialist;

pub use agent_caller::{Adapter, CallerConfig, LlmAgentCaller};
pub use capability::{AgentCapability, AgentSpec, CapabilityError, EchoCapability, ScriptedCapability};
pub use codec::{decode, decode_lines, encode, DecodedStep, Direction, EncodeError, WorkflowLogEntry};
pub use decoder::{response_steps, response_steps_from_lines};
pub use executor::{PipelineExecutor, PipelineResult, PipelineStatus, WorkflowLog};
pub use schema::{AgentStep, OnFailure, PipelineDefinition};
pub use specialist::{SpecialistDef, SpecialistLoader};
