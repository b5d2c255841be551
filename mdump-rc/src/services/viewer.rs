//! External visualization collaborator seam
//!
//! The rendering engine is an injected dependency, not an ambient global:
//! the orchestrator hands it a [`RenderScene`] and its contract ends there.

use crate::models::RenderDirective;
use async_trait::async_trait;

/// One scene handed to the viewer: the structural file plus the directive set
#[derive(Debug, Clone)]
pub struct RenderScene {
    /// Session the scene belongs to
    pub session_id: String,
    /// Structural-file bytes (mmCIF) for the whole system
    pub structure: Vec<u8>,
    /// Exactly one directive per concrete catalog segment, in catalog order
    pub directives: Vec<RenderDirective>,
}

/// Handle to the external visualization engine
#[async_trait]
pub trait StructureViewer: Send + Sync {
    /// Replace the currently displayed scene
    async fn load_scene(&self, scene: &RenderScene) -> anyhow::Result<()>;
}
