// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Frame recording is infallible; errors only surface when GPU resources are
//! created or released, or when configuration is loaded.

use crate::renderer::api::resource::TextureFormat;
use thiserror::Error;

/// An error related to the creation or destruction of a GPU resource.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// The backend refused to create the resource.
    #[error("Failed to create {kind} '{label}': {details}")]
    CreationFailed {
        /// The kind of resource (texture, frame buffer, uniform).
        kind: &'static str,
        /// The debug label of the resource.
        label: String,
        /// Backend-provided details.
        details: String,
    },
    /// A handle did not refer to a live resource.
    #[error("Invalid resource handle: {0}")]
    InvalidHandle(String),
    /// The backend does not support the requested texture format.
    #[error("Unsupported texture format: {0:?}")]
    UnsupportedFormat(TextureFormat),
    /// A backend-specific failure.
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// An error related to loading or validating renderer configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    /// The configuration could not be written out.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
    /// Shadow maps must be a non-zero power of two so cascades tile evenly.
    #[error("Shadow map resolution must be a non-zero power of two, got {0}")]
    InvalidShadowMapResolution(u32),
}

/// A high-level error that can occur within the rendering system.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A GPU resource operation failed.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
    /// The renderer was given an invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
