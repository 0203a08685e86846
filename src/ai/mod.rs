// External AI provider integrations.

pub mod providers;

pub use providers::{
    create_provider, AiProvider, GenerationOptions, ProviderError, ProviderResult,
};
