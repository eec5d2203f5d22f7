pub mod engine;
pub mod memory;
pub mod registry;
pub mod request;

mod error;

pub use engine::{
	BoxFuture, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_OFFSET, EngineFactory, SearchEngine,
	SearchParams, SearchResponseItem, SearchResponses,
};
pub use error::{Error, Result};
pub use memory::{MEMORY_ENGINE_NAME, MemoryEngine, MemoryEngineFactory};
pub use registry::{EngineHandle, EngineRegistry, registry};
pub use request::SearchRequest;
