//! Deterministic keyword-gap scan between a document and a job description.
//!
//! The model is asked for suggestions, but it does not always call out every missing
//! technology. This scan guarantees that each known keyword the JD asks for, and the
//! document lacks, is named in at least one suggestion.

/// A technology keyword with the spellings that count as a mention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyword {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub category: &'static str,
}

const fn kw(name: &'static str, aliases: &'static [&'static str], category: &'static str) -> Keyword {
    Keyword { name, aliases, category }
}

pub const VOCABULARY: &[Keyword] = &[
    kw("Rust", &["rust"], "Programming Languages"),
    kw("Python", &["python"], "Programming Languages"),
    kw("Java", &["java"], "Programming Languages"),
    kw("JavaScript", &["javascript"], "Programming Languages"),
    kw("TypeScript", &["typescript"], "Programming Languages"),
    kw("Golang", &["golang"], "Programming Languages"),
    kw("C++", &["c++", "cpp"], "Programming Languages"),
    kw("C#", &["c#", ".net"], "Programming Languages"),
    kw("Kotlin", &["kotlin"], "Programming Languages"),
    kw("Swift", &["swift"], "Programming Languages"),
    kw("SQL", &["sql"], "Data & Databases"),
    kw("PostgreSQL", &["postgresql", "postgres"], "Data & Databases"),
    kw("MySQL", &["mysql"], "Data & Databases"),
    kw("MongoDB", &["mongodb", "mongo"], "Data & Databases"),
    kw("Redis", &["redis"], "Data & Databases"),
    kw("Kafka", &["kafka"], "Data & Databases"),
    kw("Spark", &["apache spark", "pyspark"], "Data & Databases"),
    kw("GraphQL", &["graphql"], "Data & Databases"),
    kw("React", &["react", "react.js", "reactjs"], "Frameworks"),
    kw("Next.js", &["next.js", "nextjs"], "Frameworks"),
    kw("Node.js", &["node.js", "nodejs"], "Frameworks"),
    kw("Angular", &["angular"], "Frameworks"),
    kw("Vue", &["vue", "vue.js"], "Frameworks"),
    kw("Django", &["django"], "Frameworks"),
    kw("Spring Boot", &["spring boot"], "Frameworks"),
    kw("Kubernetes", &["kubernetes", "k8s"], "Cloud & DevOps"),
    kw("Docker", &["docker"], "Cloud & DevOps"),
    kw("Terraform", &["terraform"], "Cloud & DevOps"),
    kw("AWS", &["aws", "amazon web services"], "Cloud & DevOps"),
    kw("Azure", &["azure"], "Cloud & DevOps"),
    kw("GCP", &["gcp", "google cloud"], "Cloud & DevOps"),
    kw("CI/CD", &["ci/cd", "continuous integration"], "Cloud & DevOps"),
    kw("Linux", &["linux"], "Cloud & DevOps"),
    kw("Microservices", &["microservices", "microservice"], "Architecture"),
    kw("REST APIs", &["rest api", "rest apis", "restful"], "Architecture"),
    kw("Distributed Systems", &["distributed systems", "distributed system"], "Architecture"),
    kw("Machine Learning", &["machine learning"], "AI & Data Science"),
    kw("PyTorch", &["pytorch"], "AI & Data Science"),
    kw("TensorFlow", &["tensorflow"], "AI & Data Science"),
    kw("Agile", &["agile", "scrum"], "Practices"),
    kw("Unit Testing", &["unit testing", "unit tests", "tdd"], "Practices"),
];

/// A keyword the JD mentions and the document does not.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordGap {
    pub keyword: &'static str,
    pub category: &'static str,
}

/// Case-insensitive search for `needle` bounded by non-alphanumeric characters,
/// so `java` does not match inside `javascript`.
fn contains_term(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin + needle.chars().next().map_or(1, char::len_utf8);
    }
    false
}

pub fn mentions(text_lower: &str, keyword: &Keyword) -> bool {
    contains_term(text_lower, &keyword.name.to_lowercase())
        || keyword.aliases.iter().any(|a| contains_term(text_lower, a))
}

/// Known keywords mentioned in `text`, in vocabulary order.
pub fn find_keywords(text: &str) -> Vec<&'static Keyword> {
    let lower = text.to_lowercase();
    VOCABULARY.iter().filter(|k| mentions(&lower, k)).collect()
}

/// Keywords the job description mentions that `document` does not.
pub fn keyword_gaps(document: &str, job_description: &str) -> Vec<KeywordGap> {
    let doc_lower = document.to_lowercase();
    find_keywords(job_description)
        .into_iter()
        .filter(|k| !mentions(&doc_lower, k))
        .map(|k| KeywordGap {
            keyword: k.name,
            category: k.category,
        })
        .collect()
}

/// Appends a suggestion for every gap no existing suggestion mentions. Returns how many
/// were added.
pub fn ensure_gap_suggestions(suggestions: &mut Vec<String>, gaps: &[KeywordGap], document_kind: &str) -> usize {
    let mut added = 0;
    for gap in gaps {
        let needle = gap.keyword.to_lowercase();
        let covered = suggestions
            .iter()
            .any(|s| contains_term(&s.to_lowercase(), &needle));
        if !covered {
            suggestions.push(format!(
                "Add {} ({}) to your {}: the job description asks for it, but it does not appear anywhere in your {}.",
                gap.keyword, gap.category, document_kind, document_kind
            ));
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        assert!(contains_term("java and rust", "java"));
        assert!(!contains_term("javascript only", "java"));
        assert!(contains_term("built with node.js.", "node.js"));
        assert!(contains_term("c++ and c#", "c++"));
        assert!(!contains_term("trusty", "rust"));
    }

    #[test]
    fn test_aliases_count_as_mentions() {
        let names: Vec<_> = find_keywords("Ran K8s clusters on Amazon Web Services")
            .iter()
            .map(|k| k.name)
            .collect();
        assert_eq!(names, vec!["Kubernetes", "AWS"]);
    }

    #[test]
    fn test_keyword_gaps_finds_missing_kubernetes() {
        let resume = "Senior engineer. Skills: TypeScript, React, Docker.";
        let jd = "We need TypeScript and Kubernetes experience; Docker a plus.";
        let gaps = keyword_gaps(resume, jd);
        assert_eq!(
            gaps,
            vec![KeywordGap {
                keyword: "Kubernetes",
                category: "Cloud & DevOps"
            }]
        );
    }

    #[test]
    fn test_ensure_gap_suggestions_skips_covered_keywords() {
        let gaps = vec![
            KeywordGap { keyword: "Kubernetes", category: "Cloud & DevOps" },
            KeywordGap { keyword: "Kafka", category: "Data & Databases" },
        ];
        let mut suggestions = vec!["Mention your Kafka streaming work.".to_string()];
        let added = ensure_gap_suggestions(&mut suggestions, &gaps, "resume");
        assert_eq!(added, 1);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[1].contains("Kubernetes"));
        assert!(suggestions[1].contains("Cloud & DevOps"));
    }

    #[test]
    fn test_no_gaps_no_changes() {
        let mut suggestions = vec![];
        assert_eq!(ensure_gap_suggestions(&mut suggestions, &[], "resume"), 0);
        assert!(suggestions.is_empty());
    }
}
