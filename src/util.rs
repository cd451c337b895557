pub fn first_word(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

pub fn display_name(first: &str, last: Option<&str>) -> String {
    let first = first.trim();
    match last.map(str::trim).filter(|last| !last.is_empty()) {
        Some(last) if first.is_empty() => last.to_owned(),
        Some(last) => format!("{first} {last}"),
        None => first.to_owned(),
    }
}

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_word_of_names() {
        assert_eq!(first_word("Ann Marie Smith"), "Ann");
        assert_eq!(first_word("  Bob  "), "Bob");
        assert_eq!(first_word(""), "");
    }

    #[test]
    fn display_names_trim_missing_parts() {
        assert_eq!(display_name("Ann", Some("Smith")), "Ann Smith");
        assert_eq!(display_name("Ann ", Some("  ")), "Ann");
        assert_eq!(display_name("Ann", None), "Ann");
        assert_eq!(display_name("", Some("Smith")), "Smith");
    }

    #[test]
    fn pluralizes_counts() {
        assert_eq!(pluralize(1, "person", "people"), "1 person");
        assert_eq!(pluralize(3, "person", "people"), "3 people");
    }
}
