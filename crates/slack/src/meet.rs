use rand::seq::SliceRandom;
use rand::Rng;

pub const MEET_DOMAIN: &str = "g.co/meet";

const ADVERBS: &[&str] = &[
    "boldly", "briskly", "calmly", "closely", "deeply", "eagerly", "evenly", "fairly", "gently",
    "gladly", "happily", "jointly", "kindly", "lightly", "loudly", "merrily", "neatly", "openly",
    "politely", "quickly", "quietly", "rapidly", "sharply", "slowly", "smoothly", "softly",
    "steadily", "swiftly", "warmly", "wildly",
];

const ADJECTIVES: &[&str] = &[
    "able", "amber", "brave", "bright", "civil", "clever", "cosmic", "crisp", "daring", "fancy",
    "fleet", "fresh", "gentle", "golden", "grand", "humble", "jolly", "keen", "lively", "lucid",
    "mellow", "noble", "polite", "proud", "quiet", "rapid", "sunny", "tidy", "vivid", "witty",
];

const NAMES: &[&str] = &[
    "badger", "beagle", "bison", "condor", "cougar", "coyote", "crane", "dingo", "eagle", "falcon",
    "ferret", "gecko", "heron", "ibex", "jaguar", "koala", "lemur", "lynx", "marmot", "osprey",
    "otter", "panda", "puffin", "quail", "raven", "salmon", "stork", "tapir", "walrus", "zebra",
];

/// Meeting link for the given name, or a random three-word slug when blank.
pub fn meet_link(text: &str) -> String {
    let slug = if text.trim().is_empty() {
        random_slug(&mut rand::thread_rng())
    } else {
        text.replace(' ', "-")
    };
    format!("{MEET_DOMAIN}/{slug}")
}

/// Adverb-adjective-name slug. No collision avoidance.
pub fn random_slug<R: Rng + ?Sized>(rng: &mut R) -> String {
    [ADVERBS, ADJECTIVES, NAMES]
        .iter()
        .map(|words| *words.choose(&mut *rng).unwrap_or(&"meet"))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{meet_link, random_slug, MEET_DOMAIN};

    fn is_three_word_slug(slug: &str) -> bool {
        let words: Vec<&str> = slug.split('-').collect();
        words.len() == 3
            && words.iter().all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase()))
    }

    #[test]
    fn named_meet_replaces_spaces_with_hyphens() {
        assert_eq!(meet_link("Jane Doe"), "g.co/meet/Jane-Doe");
        assert_eq!(meet_link("weekly sync up"), "g.co/meet/weekly-sync-up");
    }

    #[test]
    fn blank_meet_generates_three_words() {
        for text in ["", "   "] {
            let link = meet_link(text);
            let slug = link
                .strip_prefix(&format!("{MEET_DOMAIN}/"))
                .expect("link should use the meet domain");
            assert!(is_three_word_slug(slug), "unexpected slug {slug}");
        }
    }

    #[test]
    fn seeded_rng_gives_repeatable_slugs() {
        let first = random_slug(&mut StdRng::seed_from_u64(7));
        let second = random_slug(&mut StdRng::seed_from_u64(7));

        assert_eq!(first, second);
        assert!(is_three_word_slug(&first));
    }
}
