pub mod dataset;
pub mod filter;
pub mod metadata;
pub mod metrics;
pub mod query;
pub mod sort;

mod error;

pub use dataset::{Dataset, DatasetStatus, Field, Question, Record, Response, ResponseStatus, User};
pub use error::{Error, Result};
pub use filter::{
	FloatMetadataFilter, IntegerMetadataFilter, MetadataFilter, NumericMetadataFilter,
	TermsMetadataFilter,
};
pub use metadata::{
	MetadataNumber, MetadataProperty, MetadataPropertySettings, MetadataPropertyType,
};
pub use metrics::{
	FloatMetadataMetrics, IntegerMetadataMetrics, MetadataMetrics, NumericMetadataMetrics,
	TermCount, TermsMetadataMetrics,
};
pub use query::{ResponseStatusFilter, StringQuery, UserResponseStatusFilter};
pub use sort::{RecordSortField, SortBy, SortField, SortOrder};
