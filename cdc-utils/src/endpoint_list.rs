/// Splits a comma-delimited endpoint list, trimming whitespace and dropping
/// empty entries.
pub fn split_endpoints(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Same as [`split_endpoints`] for a list that is already split, where any
/// item may itself still be comma-delimited.
pub fn flatten_endpoints<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .flat_map(|entry| split_endpoints(entry.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_endpoints() {
        assert_eq!(split_endpoints("http://pd"), vec!["http://pd"]);
        assert_eq!(
            split_endpoints("http://pd1:2379, http://pd2:2379,,"),
            vec!["http://pd1:2379", "http://pd2:2379"]
        );
        assert!(split_endpoints("").is_empty());
        assert!(split_endpoints(" , ").is_empty());
    }

    #[test]
    fn test_flatten_endpoints() {
        let flattened = flatten_endpoints(["http://pd1:2379,http://pd2:2379", " http://pd3:2379 ", ""]);
        assert_eq!(
            flattened,
            vec!["http://pd1:2379", "http://pd2:2379", "http://pd3:2379"]
        );
        assert!(flatten_endpoints(Vec::<String>::new()).is_empty());
    }
}
