use rand::Rng;
use rand::seq::SliceRandom;

pub const PLACEHOLDER: &str = "*name";

/// Replaces name placeholders in a prompt with concrete player names.
///
/// Placeholders are `*name`, `*name2`, `*name3`, ... with bare `*name`
/// treated as index 1. Distinct placeholders are assigned, in ascending
/// index order, names drawn round-robin from one shuffled permutation of
/// the player list: with enough players every placeholder gets a distinct
/// name, with more placeholders than players names repeat cyclically.
/// A prompt without placeholders comes back unchanged.
pub fn substitute_names(prompt: &str, players: &[String], rng: &mut impl Rng) -> String {
    if players.is_empty() || !prompt.contains(PLACEHOLDER) {
        return prompt.to_string();
    }

    // Collect distinct placeholder literals with their numeric index.
    let mut found: Vec<(u32, String)> = Vec::new();
    for (position, _) in prompt.match_indices(PLACEHOLDER) {
        let rest = &prompt[position + PLACEHOLDER.len()..];
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        let index = digits.parse::<u32>().unwrap_or(1);
        let literal = format!("{PLACEHOLDER}{digits}");
        if !found.iter().any(|(_, seen)| *seen == literal) {
            found.push((index, literal));
        }
    }
    found.sort_by_key(|(index, _)| *index);

    let mut order: Vec<&String> = players.iter().collect();
    order.shuffle(rng);

    let mut assignments: Vec<(String, &String)> = found
        .iter()
        .enumerate()
        .map(|(slot, (_, literal))| (literal.clone(), order[slot % order.len()]))
        .collect();

    // Replace longer literals first so "*name" does not clobber "*name2".
    assignments.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut result = prompt.to_string();
    for (literal, name) in assignments {
        result = result.replace(&literal, name);
    }
    result
}
