use std::cmp::Ordering;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::types::Person;

pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

pub fn rank_people(people: Vec<Person>, query: &str, own_family: &str, limit: usize) -> Vec<Person> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = people
        .into_iter()
        .filter_map(|person| {
            fuzzy_match_score(&matcher, &person.name, query).map(|score| (score, person))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        let a_own = a.family_id == own_family;
        let b_own = b.family_id == own_family;
        match (a_own, b_own) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => b_score
                .cmp(a_score)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        }
    });
    scored.truncate(limit);
    scored.into_iter().map(|(_score, person)| person).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, name: &str, family: &str) -> Person {
        Person {
            id: id.to_owned(),
            name: name.to_owned(),
            family_id: family.to_owned(),
            family_name: family.to_uppercase(),
            city: None,
        }
    }

    fn people() -> Vec<Person> {
        vec![
            person("1", "Maria Lopez", "lopez"),
            person("2", "Mario Rossi", "rossi"),
            person("3", "Ana Lopez", "lopez"),
            person("4", "Marta Rossi", "rossi"),
        ]
    }

    #[test]
    fn short_queries_return_nothing() {
        assert!(rank_people(people(), "m", "lopez", 10).is_empty());
        assert!(rank_people(people(), "  ", "lopez", 10).is_empty());
    }

    #[test]
    fn own_family_is_ranked_first() {
        let ranked = rank_people(people(), "mar", "rossi", 10);
        let families = ranked
            .iter()
            .map(|person| person.family_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(families.first(), Some(&"rossi"));
        let first_foreign = families.iter().position(|family| *family != "rossi");
        if let Some(position) = first_foreign {
            assert!(families[position..].iter().all(|family| *family != "rossi"));
        }
    }

    #[test]
    fn matches_ignore_case() {
        let ranked = rank_people(people(), "LOPEZ", "rossi", 10);
        let ids = ranked.iter().map(|person| person.id.as_str()).collect::<Vec<_>>();
        assert!(ids.contains(&"1"));
        assert!(ids.contains(&"3"));
    }

    #[test]
    fn respects_limit() {
        assert_eq!(rank_people(people(), "ma", "lopez", 1).len(), 1);
    }
}
