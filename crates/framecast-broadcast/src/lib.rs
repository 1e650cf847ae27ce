//! Framecast Broadcast - shared-texture session and transfer pipeline
//!
//! Owns the lifecycle of a named shared-texture broadcast and moves each
//! frame into it under the cross-process frame mutex. The shared-texture
//! subsystem and the compute-interop layer are reached exclusively through
//! the `SenderDevice` and `ComputeInterop` traits; `memory` provides an
//! in-process reference implementation of both.

pub mod memory;
pub mod pipeline;
pub mod sender;
pub mod session;
pub mod staging;

pub use memory::{MemoryDevice, MemoryFactory, MemoryInterop, MemorySender, SharedTexture};
pub use pipeline::TransferPipeline;
pub use sender::{ComputeInterop, InteropId, SenderDevice, StagingUsage, TextureDesc, TextureId};
pub use session::{PublishOutcome, SenderFactory, SessionManager};
pub use staging::{StagingCache, StagingTexture};
