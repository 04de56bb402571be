#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod glob;
pub mod integrity;
pub mod manifest;
pub mod policy;
pub mod request;
pub mod resolver;
pub mod tags;
pub mod url;

pub use config::{AssetContext, AssetsConfig};
pub use error::{AssetError, Result};
pub use glob::{CompiledGlob, compile_glob};
pub use manifest::{ManifestEntry, ManifestTable};
pub use policy::PrecompilePolicy;
pub use request::{HeaderSink, RecordedHeaders, RenderContext, RequestInfo};
pub use resolver::{
  AssetResolver, BuildEnvironment, CompiledAsset, EnvironmentResolver, ManifestResolver,
  ResolvedAsset, Resolver, ResolverMode,
};
pub use tags::{TagBuilder, TagOptions, TagOutput, ViewConfig};
pub use url::{AssetKind, Extname};
