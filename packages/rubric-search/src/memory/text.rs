/// Lower-cased alphanumeric runs.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|token| !token.is_empty())
		.map(str::to_lowercase)
		.collect()
}

/// Occurrences of the query tokens in `texts`, or `None` unless every query token occurs.
pub(crate) fn score<'a, I>(query_tokens: &[String], texts: I) -> Option<u32>
where
	I: IntoIterator<Item = &'a str>,
{
	if query_tokens.is_empty() {
		return None;
	}

	let mut counts = vec![0_u32; query_tokens.len()];

	for text in texts {
		for token in tokenize(text) {
			for (idx, query_token) in query_tokens.iter().enumerate() {
				if *query_token == token {
					counts[idx] += 1;
				}
			}
		}
	}

	counts.iter().all(|count| *count > 0).then(|| counts.iter().sum())
}

#[cfg(test)]
mod tests {
	use crate::memory::text::{score, tokenize};

	#[test]
	fn tokens_are_lowercased_alphanumeric_runs() {
		assert_eq!(tokenize("Hello, World! it's 2024"), ["hello", "world", "it", "s", "2024"]);
		assert!(tokenize("  ...  ").is_empty());
	}

	#[test]
	fn every_query_token_must_occur() {
		let query = tokenize("quick fox");

		assert_eq!(score(&query, ["The quick brown fox", "a quick reply"]), Some(3));
		assert_eq!(score(&query, ["The quick brown dog"]), None);
		assert_eq!(score(&tokenize("!!"), ["anything"]), None);
	}
}
