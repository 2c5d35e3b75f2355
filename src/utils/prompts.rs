pub const SEARCH_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide a concise summary of the search results.";

pub fn generate_queries_prompt(topic: &str, count: usize) -> String {
    format!(
        "Generate {} search queries to research: {}. Provide only the queries, one per line.",
        count, topic
    )
}

pub fn web_search_prompt(query: &str) -> String {
    format!("Perform a web search for: {}", query)
}

/// Pairs every query with the result at the same index.
pub fn report_prompt(topic: &str, queries: &[String], results: &[String]) -> String {
    let all_results = queries
        .iter()
        .zip(results)
        .map(|(query, result)| format!("Query: {}\nResult: {}", query, result))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Based on the following search results about {}, create a comprehensive report:

{}

Provide a well-structured report with clear sections and concise information. Use markdown formatting for headers and lists."#,
        topic, all_results
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn queries_prompt_names_count_and_topic() {
        let prompt = generate_queries_prompt("solid-state batteries", 3);
        assert_eq!(
            prompt,
            "Generate 3 search queries to research: solid-state batteries. Provide only the queries, one per line."
        );
    }

    #[test]
    fn report_prompt_pairs_by_position() {
        let prompt = report_prompt(
            "tides",
            &strings(&["what causes tides", "spring tides"]),
            &strings(&["the moon", "alignment of sun and moon"]),
        );

        assert!(prompt.starts_with("Based on the following search results about tides"));
        assert!(prompt.contains(
            "Query: what causes tides\nResult: the moon\n\nQuery: spring tides\nResult: alignment of sun and moon"
        ));
        assert!(prompt.ends_with("Use markdown formatting for headers and lists."));
    }

    #[test]
    fn swapping_pairs_changes_prompt() {
        let forward = report_prompt("x", &strings(&["a", "b"]), &strings(&["1", "2"]));
        let swapped = report_prompt("x", &strings(&["b", "a"]), &strings(&["2", "1"]));

        assert_ne!(forward, swapped);
        assert!(swapped.contains("Query: b\nResult: 2\n\nQuery: a\nResult: 1"));
    }
}
