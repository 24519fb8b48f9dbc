//! Compilation: pass pipeline, builder and frozen output

pub mod builder;
pub mod compiled;
pub mod options;
pub mod pipeline;

pub use builder::ContainerBuilder;
pub use compiled::{
    construction_order, CompiledAlias, CompiledArgument, CompiledContainer, CompiledService,
};
pub use options::CompilerOptions;
pub use pipeline::{PassConfig, RegisteredPass};
