use std::cell::Cell;

use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::pose::{FrameHandle, Pose};
use crate::scene::SharedBody;
use crate::tether::SharedTether;

/// Anchoring state of one placed object. Written once by the anchor
/// corrector and the delayed activation, read-only afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorState {
    pub anchor_pose: Pose,
    pub height: f32,
    pub was_elevated: bool,
    /// The corrector has run for this object.
    pub activated: bool,
    /// Physics released and tether armed.
    pub released: bool,
}

/// A target instantiated at a resolved placement, with the collaborators its
/// activation needs. Missing collaborators are reported when activation runs,
/// not at construction.
pub struct PlacedObject {
    id: Uuid,
    root: FrameHandle,
    anchor: FrameHandle,
    hook_override: Option<FrameHandle>,
    body: Option<SharedBody>,
    tether: Option<SharedTether>,
    state: Cell<AnchorState>,
}

impl PlacedObject {
    /// `anchor` is normally a child of `root`, so moving the root moves it.
    pub fn new(root: FrameHandle, anchor: FrameHandle) -> Self {
        let anchor_pose = anchor.world_pose();
        Self {
            id: Uuid::new_v4(),
            root,
            anchor,
            hook_override: None,
            body: None,
            tether: None,
            state: Cell::new(AnchorState {
                anchor_pose,
                height: anchor_pose.position.y,
                was_elevated: false,
                activated: false,
                released: false,
            }),
        }
    }

    pub fn with_body(mut self, body: SharedBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_tether(mut self, tether: SharedTether) -> Self {
        self.tether = Some(tether);
        self
    }

    /// Point the tether ends at, instead of the object's root.
    pub fn with_hook(mut self, hook: FrameHandle) -> Self {
        self.hook_override = Some(hook);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> &FrameHandle {
        &self.root
    }

    pub fn anchor(&self) -> &FrameHandle {
        &self.anchor
    }

    pub fn hook(&self) -> FrameHandle {
        self.hook_override
            .clone()
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn body(&self) -> Option<&SharedBody> {
        self.body.as_ref()
    }

    pub fn tether(&self) -> Option<&SharedTether> {
        self.tether.as_ref()
    }

    pub fn state(&self) -> AnchorState {
        self.state.get()
    }

    pub(crate) fn set_state(&self, state: AnchorState) {
        self.state.set(state);
    }

    /// Release the body into free simulation and arm the tether, together or
    /// not at all.
    pub(crate) fn release(&self) -> Result<()> {
        let tether = self
            .tether
            .as_ref()
            .ok_or(CoreError::ConfigurationMissing("tether renderer"))?;
        let body = self
            .body
            .as_ref()
            .ok_or(CoreError::ConfigurationMissing("rigid body"))?;

        body.borrow_mut().set_kinematic(false);
        tether.borrow_mut().bind(self.anchor.clone(), self.hook());

        let mut state = self.state.get();
        state.released = true;
        self.state.set(state);
        tracing::info!(object = %self.id, "physics released, tether armed");
        Ok(())
    }
}

impl std::fmt::Debug for PlacedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacedObject")
            .field("id", &self.id)
            .field("root", &self.root.name())
            .field("has_body", &self.body.is_some())
            .field("has_tether", &self.tether.is_some())
            .field("state", &self.state.get())
            .finish()
    }
}
