use serde_json::json;

use rubric_domain::{
	Dataset, Error, MetadataFilter, MetadataPropertySettings, RecordSortField, ResponseStatus,
	SortBy, SortField, SortOrder, TermsMetadataFilter, UserResponseStatusFilter,
};
use rubric_testkit::{DatasetBuilder, RecordBuilder};

fn dataset() -> Dataset {
	DatasetBuilder::new("feedback")
		.field("prompt")
		.field("completion")
		.question("rating")
		.terms("terms_prop", &["a", "b", "c"])
		.integer("integer_prop")
		.float("float_prop")
		.build()
}

#[test]
fn filter_wire_fragments_resolve_by_property_kind() {
	let dataset = dataset();

	match MetadataFilter::parse(&dataset, "terms_prop:a,b").expect("terms filter") {
		MetadataFilter::Terms(filter) => assert_eq!(filter.values, ["a", "b"]),
		other => panic!("unexpected filter: {other:?}"),
	}
	match MetadataFilter::parse(&dataset, r#"integer_prop:{"ge": 10, "le": 20}"#)
		.expect("integer filter")
	{
		MetadataFilter::Integer(filter) => assert_eq!((filter.ge(), filter.le()), (Some(10), Some(20))),
		other => panic!("unexpected filter: {other:?}"),
	}
	match MetadataFilter::parse(&dataset, r#"float_prop:{"le": 0.5}"#).expect("float filter") {
		MetadataFilter::Float(filter) => assert_eq!((filter.ge(), filter.le()), (None, Some(0.5))),
		other => panic!("unexpected filter: {other:?}"),
	}
}

#[test]
fn malformed_filter_fragments_are_rejected() {
	let dataset = dataset();

	for raw in ["terms_prop", "terms_prop:", "integer_prop:{}", r#"integer_prop:{"ge": 20, "le": 10}"#]
	{
		let err = MetadataFilter::parse(&dataset, raw).expect_err("expected parse failure");

		assert!(matches!(err, Error::FilterParse { .. }), "unexpected error for {raw}: {err}");
	}
}

#[test]
fn unknown_filter_property_is_a_schema_error() {
	let dataset = dataset();
	let err = MetadataFilter::parse(&dataset, "wrong-value:a").expect_err("unknown property");

	assert!(matches!(err, Error::SchemaResolution { .. }));
	assert!(err.to_string().contains("wrong-value"));
	assert!(err.to_string().contains(&dataset.id.to_string()));
}

#[test]
fn filter_colon_splits_once() {
	let dataset = dataset();

	match MetadataFilter::parse(&dataset, "terms_prop:a:b").expect("terms filter") {
		MetadataFilter::Terms(filter) => assert_eq!(filter.values, ["a:b"]),
		other => panic!("unexpected filter: {other:?}"),
	}
}

#[test]
fn empty_terms_are_preserved() {
	let dataset = dataset();
	let property = dataset.metadata_property_by_name("terms_prop").expect("terms_prop");

	assert_eq!(TermsMetadataFilter::from_string(property, "a,,b").values, ["a", "", "b"]);
}

#[test]
fn sort_tokens_resolve_against_dataset() {
	let dataset = dataset();
	let sort = SortBy::parse(&dataset, "inserted_at").expect("valid sort");

	assert_eq!(sort, SortBy::new(SortField::Record(RecordSortField::InsertedAt), SortOrder::Asc));

	let err = SortBy::parse(&dataset, "inserted_at:wrong").expect_err("bad order");

	assert!(err.to_string().contains("'wrong'"));
	assert!(err.to_string().contains("'inserted_at'"));

	let err = SortBy::parse(&dataset, "metadata.does-not-exist").expect_err("unknown property");

	assert!(matches!(err, Error::SchemaResolution { .. }));
	assert!(err.to_string().contains("does-not-exist"));
	assert!(err.to_string().contains(&dataset.id.to_string()));

	let err = SortBy::parse(&dataset, "not-a-real-field").expect_err("unknown field");

	for form in ["'inserted_at'", "'updated_at'", "metadata.metadata-property-name"] {
		assert!(err.to_string().contains(form), "missing {form} in {err}");
	}
}

#[test]
fn status_filter_scopes_to_user_responses() {
	let dataset = dataset();
	let annotator = rubric_testkit::user("annotator");
	let other = rubric_testkit::user("other");
	let untouched = RecordBuilder::new(&dataset).response(&other, ResponseStatus::Submitted).build();
	let submitted =
		RecordBuilder::new(&dataset).response(&annotator, ResponseStatus::Submitted).build();
	let filter = UserResponseStatusFilter::parse(&["missing"], Some(annotator.clone()))
		.expect("valid statuses")
		.expect("non-empty");
	let statuses_of = |record: &rubric_domain::Record| {
		record
			.responses
			.iter()
			.filter(|response| response.user_id == annotator.id)
			.map(|response| response.status)
			.collect::<Vec<_>>()
	};

	assert!(filter.matches(statuses_of(&untouched)));
	assert!(!filter.matches(statuses_of(&submitted)));
}

#[test]
fn record_metadata_is_checked_against_schema() {
	let dataset = DatasetBuilder::new("strict")
		.terms("color", &["red", "blue"])
		.property("score", MetadataPropertySettings::Integer { min: Some(0), max: Some(10) })
		.build();
	let valid = RecordBuilder::new(&dataset)
		.metadata("color", json!("red"))
		.metadata("score", json!(3))
		.build();

	assert!(valid.validate_metadata(&dataset).is_ok());

	let out_of_range = RecordBuilder::new(&dataset).metadata("score", json!(11)).build();

	assert!(matches!(
		out_of_range.validate_metadata(&dataset).expect_err("out of range"),
		Error::InvalidValue { .. }
	));

	let extra = RecordBuilder::new(&dataset).metadata("unknown", json!(1)).build();

	assert!(matches!(
		extra.validate_metadata(&dataset).expect_err("extra metadata"),
		Error::SchemaResolution { .. }
	));

	let lenient = DatasetBuilder::new("lenient").allow_extra_metadata().build();
	let extra = RecordBuilder::new(&lenient).metadata("unknown", json!(1)).build();

	assert!(extra.validate_metadata(&lenient).is_ok());
}

#[test]
fn snapshots_round_trip_through_json() {
	let dataset = dataset();
	let record = RecordBuilder::new(&dataset)
		.field("prompt", "hello")
		.metadata("integer_prop", json!(5))
		.inserted_after(30)
		.build();
	let raw = serde_json::to_string(&record).expect("serializable");
	let decoded: rubric_domain::Record = serde_json::from_str(&raw).expect("deserializable");

	assert_eq!(decoded.inserted_at, record.inserted_at);
	assert_eq!(decoded.metadata_value("integer_prop"), Some(&json!(5)));

	let raw = serde_json::to_string(&dataset).expect("serializable");
	let decoded: Dataset = serde_json::from_str(&raw).expect("deserializable");

	assert_eq!(decoded.metadata_properties, dataset.metadata_properties);
}
