//! Common test utilities and helpers for the photo_scan integration tests
//!
//! Synthetic image fixtures, a sink that records every update, and scripted
//! recognition clients that never touch the network.

#![allow(dead_code)]

/// Synthetic image payloads
pub mod fixtures {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use photo_scan::SelectedImage;

    /// Gradient so resampling has something to work on.
    pub fn gradient(width: u32, height: u32) -> DynamicImage {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        });
        DynamicImage::ImageRgb8(image)
    }

    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("Failed to encode fixture");
        bytes
    }

    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode(&gradient(width, height), ImageFormat::Png)
    }

    pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        encode(&gradient(width, height), ImageFormat::Jpeg)
    }

    /// Splice an APP1/EXIF segment carrying only the orientation tag (0x0112)
    /// right after the SOI marker of `jpeg`.
    pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG stream");

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&0x0112u16.to_be_bytes());
        tiff.extend_from_slice(&3u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_be_bytes());

        let mut payload = b"Exif\x00\x00".to_vec();
        payload.extend_from_slice(&tiff);

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    pub fn png_image(name: &str, width: u32, height: u32) -> SelectedImage {
        SelectedImage::new(name, "image/png", png_bytes(width, height))
    }

    pub fn jpeg_image(name: &str, width: u32, height: u32) -> SelectedImage {
        SelectedImage::new(name, "image/jpeg", jpeg_bytes(width, height))
    }

    pub fn decoded_dimensions(bytes: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory(bytes).expect("Failed to decode payload");
        (image.width(), image.height())
    }
}

/// Sink capturing everything a session publishes
pub mod recording_sink {
    use std::sync::{Arc, Mutex};

    use photo_scan::{DisplayRow, ScanSink, ScanStatus, StatusView};

    #[derive(Debug, Default)]
    struct Log {
        statuses: Vec<StatusView>,
        results: Vec<Vec<DisplayRow>>,
        selections: Vec<Option<String>>,
    }

    /// Cloneable handle; clones share one log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        log: Arc<Mutex<Log>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn statuses(&self) -> Vec<StatusView> {
            self.log.lock().unwrap().statuses.clone()
        }

        /// Status sequence with consecutive duplicates removed.
        pub fn history(&self) -> Vec<ScanStatus> {
            let mut history: Vec<ScanStatus> =
                self.statuses().iter().map(|view| view.status).collect();
            history.dedup();
            history
        }

        pub fn last_status(&self) -> StatusView {
            self.statuses().last().cloned().expect("No status published")
        }

        pub fn last_rows(&self) -> Vec<DisplayRow> {
            self.log
                .lock()
                .unwrap()
                .results
                .last()
                .cloned()
                .expect("No results published")
        }

        pub fn selections(&self) -> Vec<Option<String>> {
            self.log.lock().unwrap().selections.clone()
        }
    }

    impl ScanSink for RecordingSink {
        fn status_changed(&mut self, view: &StatusView) {
            self.log.lock().unwrap().statuses.push(view.clone());
        }

        fn results_changed(&mut self, rows: &[DisplayRow]) {
            self.log.lock().unwrap().results.push(rows.to_vec());
        }

        fn selection_changed(&mut self, selected: Option<&photo_scan::SelectedImage>) {
            self.log
                .lock()
                .unwrap()
                .selections
                .push(selected.map(|image| image.name.clone()));
        }
    }
}

/// Recognition clients with canned behavior
pub mod mock_client {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use photo_scan::{
        EndpointResponse, NormalizedImage, RecognitionClient, ScanError, ScanResult,
    };
    use tokio::sync::Notify;

    pub fn json_response(status: u16, body: &str) -> EndpointResponse {
        EndpointResponse::new(status, body.as_bytes().to_vec())
    }

    /// Replays scripted outcomes in order; an exhausted script is a network error.
    #[derive(Default)]
    pub struct ScriptedClient {
        script: Mutex<VecDeque<ScanResult<EndpointResponse>>>,
        uploads: Mutex<Vec<NormalizedImage>>,
    }

    impl ScriptedClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, response: EndpointResponse) -> Self {
            self.script.lock().unwrap().push_back(Ok(response));
            self
        }

        pub fn fail(self, error: ScanError) -> Self {
            self.script.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn uploads(&self) -> Vec<NormalizedImage> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecognitionClient for ScriptedClient {
        async fn submit(&self, image: &NormalizedImage) -> ScanResult<EndpointResponse> {
            self.uploads.lock().unwrap().push(image.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ScanError::network("recognize")))
        }
    }

    /// Blocks inside `submit` until released, to hold a scan in `Scanning`.
    pub struct GatedClient {
        pub entered: Arc<Notify>,
        pub release: Arc<Notify>,
        response: EndpointResponse,
    }

    impl GatedClient {
        pub fn new(response: EndpointResponse) -> Self {
            Self {
                entered: Arc::new(Notify::new()),
                release: Arc::new(Notify::new()),
                response,
            }
        }
    }

    #[async_trait]
    impl RecognitionClient for GatedClient {
        async fn submit(&self, _image: &NormalizedImage) -> ScanResult<EndpointResponse> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.response.clone())
        }
    }
}
