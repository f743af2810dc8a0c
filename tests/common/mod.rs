//! Shared fixtures: in-memory PDFs and fake pipeline collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use bloodwork::config::Config;
use bloodwork::error::{AnalysisError, DeliveryError, ExtractionError};
use bloodwork::models::{AnalysisResult, EmailDispatch};
use bloodwork::services::{
    OcrEngine, PageImage, PageRasterizer, ReportAnalysis, ReportDelivery, TextExtractor,
};

/// Builds a PDF with one page per entry. `None` pages carry no text layer.
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for page in pages {
        let operations = match page {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn text_pdf(text: &str) -> Vec<u8> {
    build_pdf(&[Some(text)])
}

pub fn scanned_pdf(pages: usize) -> Vec<u8> {
    build_pdf(&vec![None; pages])
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("SENDER_EMAIL", "reports@example.com"),
        ("SENDER_PASSWORD", "app-password"),
        ("MAX_FILE_SIZE_MB", "1"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// Emits one placeholder image per configured page.
#[derive(Default)]
pub struct FakeRasterizer {
    pub pages: usize,
    pub calls: AtomicUsize,
}

impl FakeRasterizer {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf_data: &[u8]) -> Result<Vec<PageImage>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((1..=self.pages)
            .map(|page| PageImage {
                page,
                data: vec![page as u8],
            })
            .collect())
    }
}

/// Returns canned text per page number and remembers the order it was asked in.
#[derive(Default)]
pub struct FakeOcr {
    pub texts: HashMap<usize, String>,
    pub seen: Mutex<Vec<usize>>,
}

impl FakeOcr {
    pub fn with_texts(texts: &[(usize, &str)]) -> Self {
        Self {
            texts: texts.iter().map(|(p, t)| (*p, t.to_string())).collect(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl OcrEngine for FakeOcr {
    fn recognize(&self, image: &PageImage) -> Result<String, ExtractionError> {
        self.seen.lock().unwrap().push(image.page);
        Ok(self.texts.get(&image.page).cloned().unwrap_or_default())
    }
}

pub struct FailingOcr;

impl OcrEngine for FailingOcr {
    fn recognize(&self, image: &PageImage) -> Result<String, ExtractionError> {
        Err(ExtractionError::Ocr {
            page: image.page,
            message: "engine crashed".to_string(),
        })
    }
}

pub fn extractor(rasterizer: Arc<dyn PageRasterizer>, ocr: Arc<dyn OcrEngine>) -> TextExtractor {
    TextExtractor::new(rasterizer, ocr)
}

pub struct FakeAnalyzer {
    pub reply: Result<String, u16>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportAnalysis for FakeAnalyzer {
    async fn analyze(&self, report_text: &str) -> Result<AnalysisResult, AnalysisError> {
        self.prompts.lock().unwrap().push(report_text.to_string());
        match &self.reply {
            Ok(text) => Ok(AnalysisResult::new(text.clone())),
            Err(status) => Err(AnalysisError::Status {
                status: *status,
                body: "model not loaded".to_string(),
            }),
        }
    }
}

pub struct FakeNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<EmailDispatch>>,
}

impl FakeNotifier {
    pub fn accepting() -> Self {
        Self {
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportDelivery for FakeNotifier {
    async fn deliver(&self, dispatch: &EmailDispatch) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(dispatch.clone());
        if self.fail {
            return Err(DeliveryError::Transport(
                "535 5.7.8 Username and Password not accepted".to_string(),
            ));
        }
        Ok(())
    }
}
