use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not authenticate: {0}")]
    Authentication(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("structural decode error: {0}")]
    StructuralDecode(String),

    #[error("receipt {receipt_id} has no PDF, request it again with the PDF export enabled")]
    MissingArtifact { receipt_id: String },

    #[error("listing page {page}: {source}")]
    ListingPage {
        page: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("receipt {receipt_id}: {source}")]
    Receipt {
        receipt_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Error::StructuralDecode(reason.into())
    }

    pub(crate) fn on_page(self, page: u32) -> Self {
        Error::ListingPage {
            page,
            source: Box::new(self),
        }
    }

    pub(crate) fn for_receipt(self, receipt_id: &str) -> Self {
        Error::Receipt {
            receipt_id: receipt_id.to_string(),
            source: Box::new(self),
        }
    }

    /// True when the error (or the error it wraps) comes from a layout mismatch.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::StructuralDecode(_) => true,
            Error::ListingPage { source, .. } | Error::Receipt { source, .. } => {
                source.is_decode_error()
            }
            _ => false,
        }
    }
}
