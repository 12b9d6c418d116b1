#[derive(Debug, Clone)]
pub enum FeedError {
	NotFound(String),
	Unavailable(String),
	Malformed(String),
}

impl std::fmt::Display for FeedError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FeedError::NotFound(symbol) => write!(f, "no data for symbol {}", symbol),
			FeedError::Unavailable(msg) => write!(f, "feed unavailable: {}", msg),
			FeedError::Malformed(msg) => write!(f, "malformed feed data: {}", msg),
		}
	}
}

impl std::error::Error for FeedError {}

impl From<csv::Error> for FeedError {
	fn from(err: csv::Error) -> Self {
		FeedError::Malformed(err.to_string())
	}
}
