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

//! Rendering lanes of the forward pipeline.
//!
//! A frame is recorded in this order:
//!
//! 1. [`prepare_forward_lights`] reduces the scene lights to the 8 shader slots.
//! 2. [`generate_linear_shadow_map`] and [`generate_spot_shadow_map`] render the
//!    shadow casters into views that precede the main pass.
//! 3. The `ForwardPipeline::update*` calls record the frame state.
//! 4. [`submit_model_to_forward_pipeline`] draws models into the main view.

mod config;
mod forward_lane;
mod light_packing;
mod pipeline;
mod shadow_pass_lane;

pub use config::*;
pub use forward_lane::*;
pub use light_packing::*;
pub use pipeline::*;
pub use shadow_pass_lane::*;
