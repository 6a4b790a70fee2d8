// SPDX-License-Identifier: GPL-3.0-only

//! In-memory capabilities for driving the workflow without hardware

#![allow(dead_code)]

use async_trait::async_trait;
use quickshot::backends::{
    Authorizer, BackendError, Capabilities, CaptureCapability, GalleryCapability, ShareCapability,
};
use quickshot::errors::{CaptureError, SaveError, ShareError};
use quickshot::permissions::PermissionStatus;
use quickshot::session::{
    CameraFacing, CaptureOptions, CapturedPhoto, EncodedPreview, SourceHandle,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockAuthorizer {
    result: Result<PermissionStatus, BackendError>,
    pub calls: AtomicUsize,
}

impl MockAuthorizer {
    pub fn new(result: Result<PermissionStatus, BackendError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn granted() -> Arc<Self> {
        Self::new(Ok(PermissionStatus::Granted))
    }

    pub fn denied() -> Arc<Self> {
        Self::new(Ok(PermissionStatus::Denied))
    }
}

#[async_trait]
impl Authorizer for MockAuthorizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn request(&self) -> Result<PermissionStatus, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn photo(name: &str) -> CapturedPhoto {
    CapturedPhoto {
        source: SourceHandle::new(format!("/tmp/quickshot-test/{}.jpg", name)),
        preview: Some(EncodedPreview {
            mime: "image/jpeg".to_string(),
            data: "AAAA".to_string(),
            width: 4,
            height: 3,
        }),
        width: 4000,
        height: 3000,
        metadata: None,
    }
}

#[derive(Default)]
pub struct MockCamera {
    pub fail_capture: bool,
    pub captures: Mutex<Vec<(CameraFacing, CaptureOptions)>>,
    pub previews: Mutex<Vec<CameraFacing>>,
}

impl MockCamera {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_capture: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl CaptureCapability for MockCamera {
    async fn start_preview(&self, facing: CameraFacing) -> Result<(), CaptureError> {
        self.previews.lock().unwrap().push(facing);
        Ok(())
    }

    async fn capture(
        &self,
        facing: CameraFacing,
        options: CaptureOptions,
    ) -> Result<CapturedPhoto, CaptureError> {
        let mut captures = self.captures.lock().unwrap();
        captures.push((facing, options));
        if self.fail_capture {
            return Err(CaptureError::Device("sensor unplugged".to_string()));
        }
        Ok(photo(&format!("shot{}", captures.len())))
    }
}

#[derive(Default)]
pub struct MockShare {
    pub fail: bool,
    pub shared: Mutex<Vec<SourceHandle>>,
}

#[async_trait]
impl ShareCapability for MockShare {
    async fn share(&self, source: &SourceHandle) -> Result<(), ShareError> {
        self.shared.lock().unwrap().push(source.clone());
        if self.fail {
            return Err(ShareError::Failed("no handler".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockGallery {
    pub fail: bool,
    pub saved: Mutex<Vec<SourceHandle>>,
}

#[async_trait]
impl GalleryCapability for MockGallery {
    async fn save(&self, source: &SourceHandle) -> Result<PathBuf, SaveError> {
        self.saved.lock().unwrap().push(source.clone());
        if self.fail {
            return Err(SaveError::Failed("disk full".to_string()));
        }
        Ok(PathBuf::from("/tmp/quickshot-test/gallery/IMG_1.jpg"))
    }
}

pub struct Harness {
    pub camera_permission: Arc<MockAuthorizer>,
    pub gallery_permission: Arc<MockAuthorizer>,
    pub camera: Arc<MockCamera>,
    pub share: Arc<MockShare>,
    pub gallery: Arc<MockGallery>,
}

impl Harness {
    pub fn new(camera_granted: bool, gallery_granted: bool) -> Self {
        let permission = |granted: bool| {
            if granted {
                MockAuthorizer::granted()
            } else {
                MockAuthorizer::denied()
            }
        };
        Self {
            camera_permission: permission(camera_granted),
            gallery_permission: permission(gallery_granted),
            camera: MockCamera::working(),
            share: Arc::new(MockShare::default()),
            gallery: Arc::new(MockGallery::default()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            camera_permission: self.camera_permission.clone(),
            gallery_permission: self.gallery_permission.clone(),
            camera: self.camera.clone(),
            share: self.share.clone(),
            gallery: self.gallery.clone(),
        }
    }
}
