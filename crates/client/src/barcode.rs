//! Barcode scanning workflow.
//!
//! `Idle -> MethodSelection -> Scanning(method) -> [MappingOffer] ->
//! OperationSelection -> OperationForm(kind) -> Idle`
//!
//! A remembered scan method skips `MethodSelection`. The camera stream is held
//! in a [`CameraGuard`], which stops it on every exit path: successful scan,
//! method switch, `close()`, or the workflow being dropped.

use std::sync::Arc;

use thiserror::Error;

use nooryx_core::{Barcode, DomainError, SkuCode};
use nooryx_inventory::{OperationKind, ScanMethod};

use crate::api::{BarcodeRegistry, SkuMatch};
use crate::error::ApiError;
use crate::preferences::PreferenceStore;

/// An active camera video stream.
pub trait CameraStream: Send {
    fn stop(&mut self);
}

/// Owns a camera stream and stops it exactly once.
pub struct CameraGuard {
    stream: Option<Box<dyn CameraStream>>,
}

impl CameraGuard {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Drop for CameraGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl core::fmt::Debug for CameraGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CameraGuard")
            .field("active", &self.stream.is_some())
            .finish()
    }
}

/// What an operation form is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanContext {
    /// The code resolved to a SKU.
    Matched { code: Barcode, sku: SkuMatch },
    /// Unknown code, carried along as free text.
    Unmatched { code: Barcode },
}

impl ScanContext {
    pub fn code(&self) -> &Barcode {
        match self {
            ScanContext::Matched { code, .. } | ScanContext::Unmatched { code } => code,
        }
    }

    pub fn sku(&self) -> Option<&SkuCode> {
        match self {
            ScanContext::Matched { sku, .. } => Some(&sku.sku_code),
            ScanContext::Unmatched { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    MethodSelection,
    Scanning(ScanMethod),
    /// No SKU matched; offer to map the code to an existing SKU.
    MappingOffer { code: Barcode },
    OperationSelection { context: ScanContext },
    OperationForm { kind: OperationKind, context: ScanContext },
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::MethodSelection => "method_selection",
            WorkflowState::Scanning(_) => "scanning",
            WorkflowState::MappingOffer { .. } => "mapping_offer",
            WorkflowState::OperationSelection { .. } => "operation_selection",
            WorkflowState::OperationForm { .. } => "operation_form",
        }
    }
}

#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("cannot {action} while in {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("invalid barcode: {0}")]
    InvalidCode(#[from] DomainError),
    #[error("barcode registry error: {0}")]
    Registry(#[from] ApiError),
}

pub struct BarcodeWorkflow<R: BarcodeRegistry + ?Sized, P: PreferenceStore + ?Sized> {
    registry: Arc<R>,
    preferences: Arc<P>,
    state: WorkflowState,
    camera: Option<CameraGuard>,
}

impl<R: BarcodeRegistry + ?Sized, P: PreferenceStore + ?Sized> BarcodeWorkflow<R, P> {
    pub fn new(registry: Arc<R>, preferences: Arc<P>) -> Self {
        Self {
            registry,
            preferences,
            state: WorkflowState::Idle,
            camera: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_some()
    }

    /// Open the scan dialog.
    pub fn open(&mut self) -> Result<(), BarcodeError> {
        self.require(matches!(self.state, WorkflowState::Idle), "open")?;

        let remembered = match self.preferences.load() {
            Ok(prefs) => prefs.scan_method,
            Err(e) => {
                tracing::warn!("failed to load scan preferences: {}", e);
                None
            }
        };

        self.state = match remembered {
            Some(method) => WorkflowState::Scanning(method),
            None => WorkflowState::MethodSelection,
        };
        Ok(())
    }

    /// Pick (or switch) the scan method and remember it.
    pub fn choose_method(&mut self, method: ScanMethod) -> Result<(), BarcodeError> {
        self.require(
            matches!(
                self.state,
                WorkflowState::MethodSelection | WorkflowState::Scanning(_)
            ),
            "choose a scan method",
        )?;

        if method != ScanMethod::Camera {
            self.release_camera();
        }
        self.remember(method);
        self.state = WorkflowState::Scanning(method);
        Ok(())
    }

    /// Go back to the method list without forgetting the stored preference.
    pub fn change_method(&mut self) -> Result<(), BarcodeError> {
        self.require(matches!(self.state, WorkflowState::Scanning(_)), "change method")?;
        self.release_camera();
        self.state = WorkflowState::MethodSelection;
        Ok(())
    }

    /// Hand over the stream opened for camera scanning.
    pub fn attach_camera(&mut self, stream: Box<dyn CameraStream>) -> Result<(), BarcodeError> {
        let mut guard = CameraGuard::new(stream);
        if self.state != WorkflowState::Scanning(ScanMethod::Camera) {
            guard.release();
            return Err(self.invalid("attach a camera"));
        }
        // Replacing an older stream drops (and stops) it.
        self.camera = Some(guard);
        Ok(())
    }

    /// A code was read (camera, hardware scanner, or typed) and is looked up.
    pub async fn submit_code(&mut self, raw: &str) -> Result<(), BarcodeError> {
        self.require(matches!(self.state, WorkflowState::Scanning(_)), "submit a code")?;
        let code = Barcode::new(raw)?;
        self.release_camera();

        match self.registry.lookup(&code).await? {
            Some(sku) => {
                tracing::info!(code = %code, sku = %sku.sku_code, "barcode matched");
                self.state = WorkflowState::OperationSelection {
                    context: ScanContext::Matched { code, sku },
                };
            }
            None => {
                tracing::info!(code = %code, "barcode not registered");
                self.state = WorkflowState::MappingOffer { code };
            }
        }
        Ok(())
    }

    /// Map the unknown code to an existing SKU, then continue with it.
    pub async fn map_to_sku(&mut self, sku: &SkuCode) -> Result<(), BarcodeError> {
        let code = match &self.state {
            WorkflowState::MappingOffer { code } => code.clone(),
            _ => return Err(self.invalid("map a barcode")),
        };

        let matched = self.registry.map_barcode(&code, sku).await?;
        self.state = WorkflowState::OperationSelection {
            context: ScanContext::Matched { code, sku: matched },
        };
        Ok(())
    }

    /// Continue without mapping; the code travels as free text.
    pub fn skip_mapping(&mut self) -> Result<(), BarcodeError> {
        let code = match &self.state {
            WorkflowState::MappingOffer { code } => code.clone(),
            _ => return Err(self.invalid("skip mapping")),
        };
        self.state = WorkflowState::OperationSelection {
            context: ScanContext::Unmatched { code },
        };
        Ok(())
    }

    pub fn choose_operation(&mut self, kind: OperationKind) -> Result<(), BarcodeError> {
        let context = match &self.state {
            WorkflowState::OperationSelection { context } => context.clone(),
            _ => return Err(self.invalid("choose an operation")),
        };
        self.state = WorkflowState::OperationForm { kind, context };
        Ok(())
    }

    /// The operation form was submitted.
    pub fn complete_operation(&mut self) -> Result<(), BarcodeError> {
        self.require(
            matches!(self.state, WorkflowState::OperationForm { .. }),
            "complete an operation",
        )?;
        self.reset();
        Ok(())
    }

    /// Dialog closed: valid from any state.
    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.release_camera();
        self.state = WorkflowState::Idle;
    }

    fn release_camera(&mut self) {
        if let Some(mut guard) = self.camera.take() {
            guard.release();
        }
    }

    fn remember(&self, method: ScanMethod) {
        let result = self.preferences.load().and_then(|mut prefs| {
            prefs.scan_method = Some(method);
            self.preferences.save(&prefs)
        });
        if let Err(e) = result {
            tracing::warn!("failed to persist scan method: {}", e);
        }
    }

    fn require(&self, allowed: bool, action: &'static str) -> Result<(), BarcodeError> {
        if allowed { Ok(()) } else { Err(self.invalid(action)) }
    }

    fn invalid(&self, action: &'static str) -> BarcodeError {
        BarcodeError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }
}
