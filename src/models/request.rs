use bytes::Bytes;
use lettre::message::Mailbox;

pub const EMAIL_SUBJECT: &str = "Your Blood Test Analysis Results";

/// A PDF upload and the address its analysis goes to.
#[derive(Debug, Clone)]
pub struct UploadedReport {
    pub file_name: String,
    pub content: Bytes,
    pub email: String,
}

impl UploadedReport {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>, email: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            email: email.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Only the filename suffix is checked; the bytes are validated by the extractor.
    pub fn has_pdf_extension(&self) -> bool {
        self.file_name.to_lowercase().ends_with(".pdf")
    }
}

/// A ready-to-send results email.
#[derive(Debug, Clone)]
pub struct EmailDispatch {
    pub recipient: Mailbox,
    pub subject: String,
    pub body: String,
}

impl EmailDispatch {
    pub fn new(recipient: Mailbox, analysis: &str) -> Self {
        Self {
            recipient,
            subject: EMAIL_SUBJECT.to_string(),
            body: render_body(analysis),
        }
    }
}

fn render_body(analysis: &str) -> String {
    format!(
        "Dear User,\n\n\
         Here is your blood test analysis:\n\n\
         {}\n\n\
         Best regards,\n\
         Your Health Analysis Team\n",
        analysis
    )
}
