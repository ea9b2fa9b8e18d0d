// Resume upload parsing: PDF in, plain text out.
// Extraction is CPU-bound and runs on the blocking pool. No OCR: image-only PDFs
// are rejected with an explanatory message.

pub mod handlers;
pub mod pdf;
