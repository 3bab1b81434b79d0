//! Crop session lifecycle: load, gesture input, confirm, cancel and destroy.
//!
//! A [`CropSession`] wires the [`GestureTracker`] to a [`TransformController`]
//! and reports results through a [`CropHost`]. The host is whatever owns the
//! presentation (DOM nodes in the browser, a recorder in tests).

use thiserror::Error;
use tracing::{debug, warn};

use crate::decode::{decode_data_uri, decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_surface, to_data_uri, EncodeError, OutputFormat};
use crate::geometry::CropRect;
use crate::gesture::{Disposition, GestureTracker, TouchPoint};
use crate::options::CropOptions;
use crate::transform::{rasterize, TransformController};
use crate::viewport::{ConfigError, Stage, Viewport};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("no image loaded")]
    NotLoaded,

    #[error("session is hidden")]
    Hidden,

    #[error("session has been destroyed")]
    Destroyed,

    #[error("a crop session is already active")]
    AlreadyActive,
}

/// Result of a confirmed crop.
#[derive(Debug, Clone, PartialEq)]
pub struct CropOutput {
    /// Encoded surface as a `data:` URI.
    pub data_uri: String,
    /// The rasterized output bitmap.
    pub surface: DecodedImage,
    /// Source region that was drawn.
    pub crop_rect: CropRect,
}

/// Callbacks from a [`CropSession`] to its presentation layer.
pub trait CropHost {
    /// Called before rasterization starts.
    fn before_confirm(&mut self) {}

    fn confirm(&mut self, output: CropOutput);

    fn cancel(&mut self);

    /// Called instead of [`CropHost::confirm`] when rendering the output fails
    /// after [`CropHost::before_confirm`].
    fn confirm_failed(&mut self, _error: &SessionError) {}

    /// Called once, when the session is destroyed.
    fn detach(&mut self) {}

    fn visibility_changed(&mut self, _visible: bool) {}
}

/// One cropping interaction over a single viewport.
#[derive(Debug)]
pub struct CropSession<H: CropHost> {
    viewport: Viewport,
    stage: Stage,
    format: OutputFormat,
    tracker: GestureTracker,
    controller: TransformController,
    source: Option<DecodedImage>,
    host: H,
    visible: bool,
    destroyed: bool,
}

impl<H: CropHost> CropSession<H> {
    /// Validate `options` and create a visible, unloaded session.
    ///
    /// Configuration errors are returned before the host is used.
    pub fn new(options: &CropOptions, host: H) -> Result<Self, SessionError> {
        let viewport = options.viewport()?;
        let stage = options.stage(&viewport)?;
        let format = options.output_format()?;
        debug!(
            width = viewport.width(),
            height = viewport.height(),
            circular = viewport.is_circular(),
            "crop session created"
        );

        Ok(Self {
            viewport,
            stage,
            format,
            tracker: GestureTracker::new(),
            controller: TransformController::new(viewport),
            source: None,
            host,
            visible: true,
            destroyed: false,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn controller(&self) -> &TransformController {
        &self.controller
    }

    pub fn source(&self) -> Option<&DecodedImage> {
        self.source.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn scale(&self) -> f64 {
        self.controller.scale()
    }

    pub fn crop_rect(&self) -> CropRect {
        self.controller.crop_rect()
    }

    /// Decode encoded image bytes and make them the session's source.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let decoded = decode_image(bytes);
        self.install(decoded)
    }

    /// Decode a base64 `data:` URI and make it the session's source.
    pub fn load_data_uri(&mut self, uri: &str) -> Result<(), SessionError> {
        let decoded = decode_data_uri(uri);
        self.install(decoded)
    }

    /// Use already decoded pixels as the source.
    ///
    /// The buffer must be non-empty and exactly `width * height * 4` bytes.
    pub fn load_decoded(&mut self, image: DecodedImage) -> Result<(), SessionError> {
        let checked = image.validate().map(|()| image);
        self.install(checked)
    }

    fn install(&mut self, decoded: Result<DecodedImage, DecodeError>) -> Result<(), SessionError> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }

        self.tracker.reset();
        self.controller = TransformController::new(self.viewport);
        self.source = None;

        let image = decoded?;
        self.controller.on_image_loaded(image.width, image.height);
        debug!(width = image.width, height = image.height, "source loaded");
        self.source = Some(image);
        Ok(())
    }

    pub fn touch_start(&mut self, touches: &[TouchPoint]) -> Disposition {
        if self.destroyed {
            return Disposition::Default;
        }
        let local = self.localize(touches);
        self.tracker.touch_start(&local, &mut self.controller)
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> Disposition {
        if self.destroyed {
            return Disposition::Default;
        }
        let local = self.localize(touches);
        self.tracker.touch_move(&local, &mut self.controller)
    }

    pub fn touch_end(&mut self, touches: &[TouchPoint]) -> Disposition {
        if self.destroyed {
            return Disposition::Default;
        }
        let local = self.localize(touches);
        self.tracker.touch_end(&local, &mut self.controller)
    }

    pub fn touch_cancel(&mut self) -> Disposition {
        if self.destroyed {
            return Disposition::Default;
        }
        self.tracker.touch_cancel(&mut self.controller)
    }

    /// Stage coordinates to viewport coordinates.
    fn localize(&self, touches: &[TouchPoint]) -> Vec<TouchPoint> {
        touches
            .iter()
            .map(|t| TouchPoint {
                id: t.id,
                position: self.stage.to_viewport(&self.viewport, t.position),
            })
            .collect()
    }

    /// Show or hide the session.
    pub fn set_visible(&mut self, visible: bool) {
        if self.destroyed || self.visible == visible {
            return;
        }
        self.visible = visible;
        self.host.visibility_changed(visible);
    }

    /// Rasterize the visible region, encode it and hand it to the host.
    ///
    /// The session is hidden before [`CropHost::confirm`] runs. If rendering
    /// fails, the host gets [`CropHost::confirm_failed`] and the session stays
    /// visible.
    pub fn confirm(&mut self) -> Result<(), SessionError> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }
        if !self.visible {
            return Err(SessionError::Hidden);
        }
        if self.source.is_none() {
            return Err(SessionError::NotLoaded);
        }

        self.host.before_confirm();

        match self.render_output() {
            Ok(output) => {
                self.set_visible(false);
                self.host.confirm(output);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "crop confirm failed");
                self.host.confirm_failed(&err);
                Err(err)
            }
        }
    }

    fn render_output(&self) -> Result<CropOutput, SessionError> {
        let source = self.source.as_ref().ok_or(SessionError::NotLoaded)?;
        source.validate()?;

        let crop_rect = self.controller.crop_rect();
        let (out_w, out_h) = self.viewport.output_size();
        let surface = rasterize(source, &crop_rect, out_w, out_h);
        let bytes = encode_surface(&surface, self.format)?;
        let data_uri = to_data_uri(&bytes, self.format);
        debug!(
            ?crop_rect,
            out_w,
            out_h,
            encoded_len = bytes.len(),
            "crop confirmed"
        );

        Ok(CropOutput {
            data_uri,
            surface,
            crop_rect,
        })
    }

    /// Hide the session and notify the host.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }
        debug!("crop cancelled");
        self.set_visible(false);
        self.host.cancel();
        Ok(())
    }

    /// Release gesture state and detach the host.
    ///
    /// Returns `false` if the session was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.tracker.reset();
        self.visible = false;
        self.host.detach();
        debug!("crop session destroyed");
        true
    }
}

/// Holder for the single active crop session of a page.
#[derive(Debug)]
pub struct SessionSlot<H: CropHost> {
    active: Option<CropSession<H>>,
}

impl<H: CropHost> Default for SessionSlot<H> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<H: CropHost> SessionSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a live (not destroyed) session is held.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|s| !s.is_destroyed())
    }

    /// Start a session, failing if one is already active.
    pub fn open(
        &mut self,
        options: &CropOptions,
        host: H,
    ) -> Result<&mut CropSession<H>, SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }
        let session = CropSession::new(options, host)?;
        Ok(self.active.insert(session))
    }

    pub fn get(&self) -> Option<&CropSession<H>> {
        self.active.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut CropSession<H>> {
        self.active.as_mut()
    }

    /// Destroy and drop the held session. Returns `false` if the slot was empty.
    pub fn close(&mut self) -> bool {
        match self.active.take() {
            Some(mut session) => {
                session.destroy();
                true
            }
            None => false,
        }
    }
}
